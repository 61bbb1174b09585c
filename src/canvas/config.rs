//! # 画布配置
//!
//! ## 设计思路
//!
//! 将“可调策略”集中到 `CanvasConfig`：显示尺寸上限、输入体积与解码资源上限、
//! 缩放滤镜以及默认笔刷大小。`Default` 即生产可用配置。

use image::imageops::FilterType;

use super::stroke::DEFAULT_BRUSH_SIZE;
use crate::codec;

/// 画布配置。
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// 源图缩放后的最大宽度（像素）。
    pub max_display_width: u32,
    /// 源图缩放后的最大高度（像素）。
    pub max_display_height: u32,
    /// 读取原始字节时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
    /// 新会话的默认笔刷半径。
    pub default_brush_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_display_width: 800,
            max_display_height: 600,
            max_file_size: codec::MAX_IMAGE_BYTES,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Triangle,
            default_brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}
