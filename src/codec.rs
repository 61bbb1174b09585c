//! # 编解码边界模块
//!
//! ## 设计思路
//!
//! 所有位图跨越边界（上传 / 远程编辑服务 / 本地展示）时统一使用 Base64 编码的 PNG。
//! Data URL 前缀（`data:image/<fmt>;base64,`）在发送前剥离，展示前重新补上。
//!
//! ## 实现思路
//!
//! - 前缀识别使用预编译正则，避免每次调用重复编译。
//! - Base64 解码前先按长度估算解码体积上限，超限直接拒绝。
//! - PNG 编码/解码统一走 `image` crate，输出 RGBA8。

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, RgbaImage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Cursor;

use crate::canvas::CanvasError;

/// 单张图片字节体积上限（上传与编辑结果共用）。
pub const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// 展示用 Data URL 前缀（结果统一为 PNG）。
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

static DATA_URI_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/\w+;base64,").expect("data uri pattern is valid"));

/// 剥离 Data URL 前缀；不带前缀的输入原样返回。
pub fn strip_data_uri(data: &str) -> &str {
    let trimmed = data.trim();
    match DATA_URI_PREFIX.find(trimmed) {
        Some(prefix) => &trimmed[prefix.end()..],
        None => trimmed,
    }
}

/// 为纯 Base64 PNG 补上展示用前缀。
pub fn to_data_uri(base64_png: &str) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, strip_data_uri(base64_png))
}

fn estimate_decoded_upper_bound_len(base64_data: &str) -> Result<u64, CanvasError> {
    let len = base64_data.len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| CanvasError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| CanvasError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 解码 Base64（支持 Data URL 与纯 Base64），并限制解码后体积。
pub fn decode_base64(data: &str, max_len: u64) -> Result<Vec<u8>, CanvasError> {
    let payload = strip_data_uri(data);
    if payload.is_empty() {
        return Err(CanvasError::InvalidFormat("Base64 内容为空".to_string()));
    }

    let estimated_len = estimate_decoded_upper_bound_len(payload)?;
    if estimated_len > max_len {
        return Err(CanvasError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_len as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CanvasError::Decode(format!("Base64 解码失败：{}", e)))
}

/// 将 RGBA 位图编码为 PNG 字节。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CanvasError> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| CanvasError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

/// 将 RGBA 位图编码为纯 Base64 PNG（不带前缀）。
pub fn encode_png_base64(image: &RgbaImage) -> Result<String, CanvasError> {
    let png = encode_png(image)?;
    Ok(general_purpose::STANDARD.encode(png))
}

/// 解码 Base64 PNG（或其他 `image` 支持的格式）为 RGBA 位图，解码体积不超过 `max_len`。
pub fn decode_base64_image(data: &str, max_len: u64) -> Result<RgbaImage, CanvasError> {
    let bytes = decode_base64(data, max_len)?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| CanvasError::Decode(format!("图片解码失败：{}", e)))?;
    Ok(decoded.to_rgba8())
}
