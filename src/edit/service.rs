//! # 编辑请求编排
//!
//! ## 设计思路
//!
//! `EditService` 把“源图 + 二值蒙版 + 指令文本”打包成一次 `generateContent` 请求，
//! 并把响应解释为结果图片或带原因的错误。
//!
//! - 不重试、不设超时、不校验返回图片尺寸，失败只负责把原因交给调用方；
//! - 是否附带蒙版由 `MaskMode` 决定，没有蒙版时退化为纯文本指令；
//! - 配置在构造时注入，凭据可按请求覆盖。
//!
//! ## 实现思路
//!
//! 1. 解析凭据（缺失直接返回配置错误，不发请求）
//! 2. 编码 PNG → Base64
//! 3. POST JSON，凭据放在 `x-goog-api-key` 头中
//! 4. 非 2xx 按状态码与正文归类；2xx 取第一段图片数据并解码
//!
//! 记录 `encode/request/decode/total` 阶段耗时，便于诊断。

use image::RgbaImage;
use std::time::Instant;

use super::wire::{GenerateContentRequest, GenerateContentResponse, RequestContent, RequestPart};
use super::{EditError, EditServiceConfig, MASK_INSTRUCTION, MaskMode};
use crate::canvas::BinaryMask;
use crate::codec;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// 编辑服务返回的结果图片。
#[derive(Debug, Clone, PartialEq)]
pub struct EditedImage {
    image: RgbaImage,
    base64_png: String,
}

impl EditedImage {
    pub fn new(image: RgbaImage, base64_png: String) -> Self {
        Self { image, base64_png }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// 纯 Base64（不带前缀）。
    pub fn base64_png(&self) -> &str {
        &self.base64_png
    }

    /// 本地展示用 Data URL。
    pub fn data_uri(&self) -> String {
        codec::to_data_uri(&self.base64_png)
    }
}

/// 编辑请求编排器。
pub struct EditService {
    config: EditServiceConfig,
    client: reqwest::Client,
}

impl EditService {
    /// 使用注入的配置创建编排器，同时构建复用型 HTTP 客户端。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use photo_retouch::edit::{EditService, EditServiceConfig};
    ///
    /// let service = EditService::new(EditServiceConfig::default())?;
    /// # Ok::<(), photo_retouch::edit::EditError>(())
    /// ```
    pub fn new(config: EditServiceConfig) -> Result<Self, EditError> {
        config.generate_content_url()?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| EditError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EditServiceConfig {
        &self.config
    }

    /// 提交一次编辑。
    ///
    /// `mask` 为 `None` 或配置为 `MaskMode::TextOnly` 时只发送指令与源图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use photo_retouch::canvas::{Binarize, MaskSurface};
    /// use photo_retouch::edit::{EditService, EditServiceConfig};
    ///
    /// # async fn demo(image: image::RgbaImage) -> Result<(), photo_retouch::edit::EditError> {
    /// let service = EditService::new(EditServiceConfig::default())?;
    /// let mask = MaskSurface::new(image.width(), image.height()).binarize();
    /// let edited = service.edit(&image, Some(&mask), Some("my-key")).await?;
    /// println!("{}x{}", edited.dimensions().0, edited.dimensions().1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn edit(
        &self,
        image: &RgbaImage,
        mask: Option<&BinaryMask>,
        api_key_override: Option<&str>,
    ) -> Result<EditedImage, EditError> {
        let api_key = self.config.resolve_api_key(api_key_override)?;
        let url = self.config.generate_content_url()?;
        let total_start = Instant::now();

        let encode_start = Instant::now();
        let image_base64 = codec::encode_png_base64(image)?;
        let mask_base64 = match (self.config.mask_mode, mask) {
            (MaskMode::Attach, Some(mask)) => Some(mask.to_png_base64()?),
            _ => None,
        };
        let body = self.build_request_body(&image_base64, mask_base64.as_deref())?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "🚀 提交编辑请求 - 地址: {} 模型: {} 蒙版: {} 尺寸: {}x{}",
            redact_url_for_log(&url),
            self.config.model,
            mask_base64.is_some(),
            image.width(),
            image.height()
        );

        let request_start = Instant::now();
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key)
            .body(body)
            .send()
            .await
            .map_err(EditError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(EditError::from_reqwest)?;
        let request_elapsed = request_start.elapsed();

        if !status.is_success() {
            let err = EditError::from_status(status, &text);
            log::error!("❌ 编辑服务返回错误 - HTTP {}：{}", status.as_u16(), err);
            return Err(err);
        }

        let decode_start = Instant::now();
        let edited = Self::parse_response(&text)?;
        let decode_elapsed = decode_start.elapsed();

        log::info!(
            "✅ 编辑完成 - 结果尺寸: {}x{} encode={}ms request={}ms decode={}ms total={}ms",
            edited.dimensions().0,
            edited.dimensions().1,
            encode_elapsed.as_millis(),
            request_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(edited)
    }

    fn build_request_body(&self, image_base64: &str, mask_base64: Option<&str>) -> Result<Vec<u8>, EditError> {
        let mut parts = vec![RequestPart::text(&self.config.instruction), RequestPart::png(image_base64)];

        if let Some(mask_base64) = mask_base64 {
            parts.push(RequestPart::text(MASK_INSTRUCTION));
            parts.push(RequestPart::png(mask_base64));
        }

        let request = GenerateContentRequest {
            contents: vec![RequestContent { parts }],
        };

        serde_json::to_vec(&request).map_err(|e| EditError::InvalidConfig(format!("请求序列化失败：{}", e)))
    }

    fn parse_response(text: &str) -> Result<EditedImage, EditError> {
        let response: GenerateContentResponse = serde_json::from_str(text)
            .map_err(|e| EditError::MalformedResponse(format!("响应不是合法 JSON：{}", e)))?;

        let Some(data) = response.first_image_data() else {
            let reason = response
                .text_summary()
                .map(|summary| format!("响应中没有图片数据（模型回复：{}）", summary))
                .unwrap_or_else(|| "响应中没有图片数据，请尝试其他图片或重新绘制蒙版".to_string());
            log::error!("❌ {}", reason);
            return Err(EditError::MalformedResponse(reason));
        };

        let base64_png = codec::strip_data_uri(data).to_string();
        let image = codec::decode_base64_image(&base64_png, codec::MAX_IMAGE_BYTES)
            .map_err(|e| EditError::MalformedResponse(format!("结果图片无法解码：{}", e)))?;

        Ok(EditedImage::new(image, base64_png))
    }
}

/// 日志中只保留协议、主机、端口与路径。
fn redact_url_for_log(url: &reqwest::Url) -> String {
    let host = url.host_str().unwrap_or("<unknown-host>");
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}
