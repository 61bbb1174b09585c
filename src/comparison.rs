//! # 前后对比视图
//!
//! 滑块位置 `p`（0–100）左侧显示原图，右侧显示结果图：
//! 分割列为 `round(width * p / 100)`，`x < split` 的像素取原图。
//!
//! 编辑服务不保证返回尺寸与原图一致，结果图尺寸不同时先缩放到原图尺寸再合成。

use image::RgbaImage;
use image::imageops::{self, FilterType};

/// 默认滑块位置（百分比）。
pub const DEFAULT_SLIDER_POSITION: f64 = 50.0;

/// 滑块位置限制在 `[0, 100]`，非有限值按默认位置处理。
pub fn clamp_slider(position: f64) -> f64 {
    if position.is_finite() {
        position.clamp(0.0, 100.0)
    } else {
        DEFAULT_SLIDER_POSITION
    }
}

/// 分割列（原图占据 `[0, split)`）。
pub fn split_column(width: u32, position: f64) -> u32 {
    let split = (width as f64 * clamp_slider(position) / 100.0).round();
    (split as u32).min(width)
}

/// 按滑块位置合成对比图，输出尺寸与原图一致。
pub fn compose(before: &RgbaImage, after: &RgbaImage, position: f64) -> RgbaImage {
    let (width, height) = before.dimensions();

    let resized;
    let after = if after.dimensions() == (width, height) {
        after
    } else {
        log::warn!(
            "⚠️ 结果图尺寸 {}x{} 与原图 {}x{} 不一致，对比前缩放",
            after.width(),
            after.height(),
            width,
            height
        );
        resized = imageops::resize(after, width, height, FilterType::Triangle);
        &resized
    };

    let split = split_column(width, position);
    RgbaImage::from_fn(width, height, |x, y| {
        if x < split {
            *before.get_pixel(x, y)
        } else {
            *after.get_pixel(x, y)
        }
    })
}
