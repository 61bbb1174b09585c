//! # 修图会话
//!
//! ## 设计思路
//!
//! `RetouchSession` 持有一次修图过程的全部状态：源图、同尺寸蒙版、笔刷状态机、
//! 坐标映射、最近一次结果图以及“处理中”标记。所有变更都经由会话方法完成：
//!
//! - 加载新源图：蒙版重置为同尺寸全透明，旧结果作废；加载失败不改变任何状态
//! - 清空蒙版：蒙版全透明，旧结果作废
//! - 提交编辑：成功后替换结果图；失败时源图、蒙版、旧结果全部保持原样
//!
//! ## 实现思路
//!
//! 提交拆成两步：`begin_submit` 复制源图像素与二值蒙版并置位 `processing`，
//! 返回独立的 `PendingEdit`；宿主在会话之外等待网络请求，期间仍可读取会话、
//! 观察处理中标记，重复提交得到 `Busy`。`finish_submit` 交回结果并复位标记。
//! `submit` 把两步串在一起，future 被丢弃时同样复位标记。

use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::canvas::{
    Binarize, BinaryMask, BrushMode, BrushSettings, CanvasConfig, CanvasPoint, CoordinateMapper,
    DisplayRect, ImageInput, MaskSurface, PointerEvent, SourceImage, StrokeRasterizer, StrokeState,
};
use crate::codec;
use crate::comparison;
use crate::edit::{EditError, EditService, EditedImage};
use crate::error::AppError;

/// 下载文件名前缀。
pub const DOWNLOAD_PREFIX: &str = "edited-image-";

pub struct RetouchSession {
    canvas_config: CanvasConfig,
    source: Option<SourceImage>,
    mask: MaskSurface,
    rasterizer: StrokeRasterizer,
    mapper: CoordinateMapper,
    result: Option<EditedImage>,
    processing: bool,
}

/// 已取出、等待发送的编辑请求。
#[derive(Debug, Clone)]
pub struct PendingEdit {
    image: RgbaImage,
    mask: BinaryMask,
}

impl PendingEdit {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn mask(&self) -> &BinaryMask {
        &self.mask
    }

    /// 发送到编辑服务；不修改任何会话状态。
    pub async fn send(
        &self,
        service: &EditService,
        api_key_override: Option<&str>,
    ) -> Result<EditedImage, EditError> {
        service.edit(&self.image, Some(&self.mask), api_key_override).await
    }
}

/// `submit` 的 future 被丢弃时复位处理中标记。
struct ProcessingGuard<'a>(&'a mut bool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl Default for RetouchSession {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl RetouchSession {
    pub fn new(canvas_config: CanvasConfig) -> Self {
        let brush = BrushSettings::new(canvas_config.default_brush_size, BrushMode::Paint);
        Self {
            canvas_config,
            source: None,
            mask: MaskSurface::new(0, 0),
            rasterizer: StrokeRasterizer::new(brush),
            mapper: CoordinateMapper::unscaled(0, 0),
            result: None,
            processing: false,
        }
    }

    /// 加载新源图，返回缩放后的尺寸。
    pub fn load_image(&mut self, input: ImageInput) -> Result<(u32, u32), AppError> {
        let source = SourceImage::load(input, &self.canvas_config)?;
        let (width, height) = source.dimensions();

        self.mask.reset(width, height);
        self.mapper = CoordinateMapper::unscaled(width, height);
        self.rasterizer.end();
        self.result = None;
        self.source = Some(source);

        log::info!("🖼️ 会话载入新源图: {}x{}", width, height);
        Ok((width, height))
    }

    /// 更新蒙版在屏幕上的显示区域。
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        let (width, height) = self.mask.dimensions();
        self.mapper = CoordinateMapper::new(rect, width, height);
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.rasterizer.brush_mut().set_size(size);
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.rasterizer.brush_mut().set_mode(mode);
    }

    pub fn brush(&self) -> BrushSettings {
        self.rasterizer.brush()
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.rasterizer.state()
    }

    /// 处理指针 / 触摸事件；未加载源图时忽略。
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<CanvasPoint> {
        if self.source.is_none() {
            return None;
        }
        self.rasterizer.handle(event, &self.mapper, &mut self.mask)
    }

    /// 清空蒙版并作废已有结果。
    pub fn clear_mask(&mut self) {
        self.mask.clear();
        self.rasterizer.end();
        self.result = None;
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn mask(&self) -> &MaskSurface {
        &self.mask
    }

    pub fn binary_mask(&self) -> BinaryMask {
        self.mask.binarize()
    }

    pub fn result(&self) -> Option<&EditedImage> {
        self.result.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// 取出本次提交的源图与二值蒙版并进入处理中状态。
    ///
    /// 每次成功调用都要以 `finish_submit` 收尾，否则会话一直处于处理中。
    pub fn begin_submit(&mut self) -> Result<PendingEdit, AppError> {
        if self.processing {
            return Err(EditError::Busy.into());
        }
        let source = self.source.as_ref().ok_or(AppError::NoImage)?;
        let pending = PendingEdit {
            image: source.pixels().clone(),
            mask: self.mask.binarize(),
        };

        log::info!(
            "📤 提交编辑 - 尺寸: {}x{} 蒙版覆盖像素: {}",
            pending.image.width(),
            pending.image.height(),
            pending.mask.covered_pixel_count()
        );

        self.processing = true;
        Ok(pending)
    }

    /// 交回编辑结果：成功时替换结果图，失败时保留原有状态。
    pub fn finish_submit(
        &mut self,
        outcome: Result<EditedImage, EditError>,
    ) -> Result<&EditedImage, AppError> {
        self.processing = false;

        match outcome {
            Ok(edited) => Ok(self.result.insert(edited)),
            Err(err) => {
                log::warn!("⚠️ 编辑失败 [{}]: {}", err.code(), err);
                Err(err.into())
            }
        }
    }

    /// 提交源图与二值蒙版，成功后替换结果图。
    pub async fn submit(
        &mut self,
        service: &EditService,
        api_key_override: Option<&str>,
    ) -> Result<&EditedImage, AppError> {
        let pending = self.begin_submit()?;

        let outcome = {
            let _guard = ProcessingGuard(&mut self.processing);
            pending.send(service, api_key_override).await
        };

        self.finish_submit(outcome)
    }

    /// 按滑块位置（0–100）合成前后对比图。
    pub fn comparison(&self, position: f64) -> Result<RgbaImage, AppError> {
        let source = self.source.as_ref().ok_or(AppError::NoImage)?;
        let result = self.result.as_ref().ok_or(AppError::NoResult)?;
        Ok(comparison::compose(source.pixels(), result.image(), position))
    }

    /// 将结果图写入目录，文件名为 `edited-image-<毫秒时间戳>.png`。
    pub fn download(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let result = self.result.as_ref().ok_or(AppError::NoResult)?;
        let file_name = format!(
            "{}{}.png",
            DOWNLOAD_PREFIX,
            chrono::Utc::now().timestamp_millis()
        );
        let path = dir.join(file_name);

        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, codec::encode_png(result.image())?)?;

        log::info!("💾 结果已保存: {}", path.display());
        Ok(path)
    }

    /// 导出当前二值蒙版为 PNG。
    pub fn export_mask(&self, path: &Path) -> Result<(), AppError> {
        if self.source.is_none() {
            return Err(AppError::NoImage);
        }
        std::fs::write(path, codec::encode_png(self.binary_mask().image())?)?;
        Ok(())
    }
}
