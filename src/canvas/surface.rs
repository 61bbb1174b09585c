//! # 蒙版画布
//!
//! ## 设计思路
//!
//! 蒙版是一张与源图同尺寸的 RGBA 位图，笔刷以“圆形盖章”的方式在上面累积 alpha。
//! 颜色只用于界面提示（60% 不透明红色），后续二值化只看 alpha。
//!
//! ## 实现思路
//!
//! - `Paint`：source-over 混合，多次叠加 alpha 逐步趋近 255。
//! - `Erase`：destination-out（源不透明），覆盖区域 alpha 直接归零，
//!   与之前叠加了多少笔无关。
//! - 像素中心 `(x + 0.5, y + 0.5)` 落在圆内即视为被覆盖；
//!   圆超出画布的部分按画布边界裁剪。

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::mapper::CanvasPoint;

/// 绘制模式下的提示色：`rgba(255, 0, 0, 0.6)`。
pub const PAINT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 153]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 笔刷模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    /// 叠加蒙版。
    #[default]
    Paint,
    /// 擦除蒙版。
    Erase,
}

/// 可变蒙版画布。
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSurface {
    pixels: RgbaImage,
}

impl MaskSurface {
    /// 创建全透明蒙版。
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
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

    /// 原始 RGBA 像素（只读）。
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 全部清空为透明。
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// 按新尺寸重建并清空（加载新源图时调用）。
    pub fn reset(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
    }

    /// 是否没有任何被涂抹的像素。
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|pixel| pixel[3] == 0)
    }

    /// alpha 非零的像素数。
    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.pixels().filter(|pixel| pixel[3] > 0).count()
    }

    /// 在 `center` 处盖一个半径为 `radius` 的实心圆。
    ///
    /// 中心或半径非法（非有限值、半径 <= 0）时不做任何事。
    pub fn stamp(&mut self, center: CanvasPoint, radius: f64, mode: BrushMode) {
        if !center.x.is_finite() || !center.y.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return;
        }

        let (width, height) = self.pixels.dimensions();
        let min_x = (center.x - radius).floor().max(0.0);
        let min_y = (center.y - radius).floor().max(0.0);
        let max_x = (center.x + radius).ceil().min(width as f64);
        let max_y = (center.y + radius).ceil().min(height as f64);

        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let radius_sq = radius * radius;
        for y in min_y as u32..max_y as u32 {
            let dy = y as f64 + 0.5 - center.y;
            for x in min_x as u32..max_x as u32 {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }

                let pixel = self.pixels.get_pixel_mut(x, y);
                *pixel = match mode {
                    BrushMode::Paint => source_over(*pixel, PAINT_COLOR),
                    BrushMode::Erase => TRANSPARENT,
                };
            }
        }
    }
}

/// 非预乘 RGBA 的 source-over 混合。
fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |s: u8, d: u8| {
        let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
