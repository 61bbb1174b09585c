//! # 源图加载与缩放
//!
//! ## 设计思路
//!
//! 将“字节 → 校验 → 解码 → 缩放到显示尺寸 → RGBA”集中管理，
//! 在关键节点做资源上限控制，尽可能早地失败。
//!
//! ## 实现思路
//!
//! 1. 按来源（字节 / Base64 / 文件）取得原始字节，文件先看 metadata 体积
//! 2. 通过文件签名确认是图片
//! 3. 读取 header 尺寸，按像素与内存上限快速拒绝
//! 4. 完整解码
//! 5. 按 `min(max_w / w, max_h / h)` 等比缩小（只缩不放）
//!
//! 源图创建后不可变，重新上传时整体替换。

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{CanvasConfig, CanvasError};
use crate::codec;

/// 源图输入来源。
pub enum ImageInput {
    /// 已读入内存的文件字节。
    Bytes(Vec<u8>),
    /// Base64（支持 Data URL 与纯 Base64）。
    Base64(String),
    /// 本地文件路径。
    FilePath(PathBuf),
}

/// 已缩放到显示尺寸的源图。
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
    original_width: u32,
    original_height: u32,
}

/// 计算等比缩小后的尺寸；不超过上限时原样返回，不会放大。
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let fitted_width = ((width as f64 * ratio).floor() as u32).max(1);
    let fitted_height = ((height as f64 * ratio).floor() as u32).max(1);

    (fitted_width, fitted_height)
}

impl SourceImage {
    /// 从任意来源加载并缩放源图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use photo_retouch::canvas::{CanvasConfig, ImageInput, SourceImage};
    ///
    /// let source = SourceImage::load(ImageInput::FilePath("photo.jpg".into()), &CanvasConfig::default())?;
    /// assert!(source.width() <= 800 && source.height() <= 600);
    /// # Ok::<(), photo_retouch::canvas::CanvasError>(())
    /// ```
    pub fn load(input: ImageInput, config: &CanvasConfig) -> Result<Self, CanvasError> {
        let total_start = Instant::now();

        let (bytes, source_hint) = match input {
            ImageInput::Bytes(bytes) => (bytes, "bytes"),
            ImageInput::Base64(data) => (codec::decode_base64(&data, config.max_file_size)?, "base64"),
            ImageInput::FilePath(path) => (Self::read_file(&path, config)?, "file"),
        };

        if bytes.len() as u64 > config.max_file_size {
            return Err(CanvasError::ResourceLimit(format!(
                "图片体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        validate_image_signature(&bytes)?;

        let (header_width, header_height) = inspect_dimensions_from_memory(&bytes)?;
        validate_pixel_limits(config, header_width, header_height)?;
        validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| CanvasError::Decode(format!("图片解码失败：{}", e)))?;
        let (raw_width, raw_height) = decoded.dimensions();
        validate_pixel_limits(config, raw_width, raw_height)?;

        let source = Self::fit(decoded, config);

        log::info!(
            "✅ 源图加载完成 - 来源: {} 原始尺寸: {}x{} 画布尺寸: {}x{} 耗时: {}ms",
            source_hint,
            raw_width,
            raw_height,
            source.width(),
            source.height(),
            total_start.elapsed().as_millis()
        );

        Ok(source)
    }

    /// 将已解码图片缩放到显示尺寸上限内。
    pub fn fit(image: DynamicImage, config: &CanvasConfig) -> Self {
        let (original_width, original_height) = image.dimensions();
        let (width, height) = fit_dimensions(
            original_width,
            original_height,
            config.max_display_width,
            config.max_display_height,
        );

        let pixels = if (width, height) == (original_width, original_height) {
            image.to_rgba8()
        } else {
            log::info!(
                "🧩 缩放源图：{}x{} -> {}x{}（filter={:?}）",
                original_width,
                original_height,
                width,
                height,
                config.resize_filter
            );

            match resize_with_fast_image_resize(&image, width, height, config.resize_filter) {
                Ok(resized) => resized,
                Err(err) => {
                    log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
                    image.resize_exact(width, height, config.resize_filter).to_rgba8()
                }
            }
        };

        Self {
            pixels,
            original_width,
            original_height,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// 解码后、缩放前的尺寸。
    pub fn original_dimensions(&self) -> (u32, u32) {
        (self.original_width, self.original_height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn read_file(path: &Path, config: &CanvasConfig) -> Result<Vec<u8>, CanvasError> {
        if !path.exists() {
            return Err(CanvasError::FileSystem(format!("文件不存在：{}", path.display())));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| CanvasError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_file_size {
            return Err(CanvasError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        std::fs::read(path).map_err(|e| CanvasError::FileSystem(format!("无法读取图片文件：{}", e)))
    }
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), CanvasError> {
    if bytes.is_empty() {
        return Err(CanvasError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| CanvasError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(CanvasError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 仅通过图片头信息读取宽高，用于完整解码前的限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), CanvasError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CanvasError::InvalidFormat(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| CanvasError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &CanvasConfig, width: u32, height: u32) -> Result<(), CanvasError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| CanvasError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(CanvasError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(config: &CanvasConfig, width: u32, height: u32) -> Result<(), CanvasError> {
    let estimated = (width as u64)
        .checked_mul(height as u64)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| CanvasError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(CanvasError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, CanvasError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image = fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| CanvasError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| CanvasError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| CanvasError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
