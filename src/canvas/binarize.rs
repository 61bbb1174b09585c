//! # 蒙版二值化
//!
//! ## 设计思路
//!
//! 提交前把蒙版画布的 alpha 通道转换成严格的黑白蒙版：
//! alpha > 0 → 不透明白，否则 → 不透明黑。不保留抗锯齿、不抖动，
//! 部分透明的叠加笔触同样变为纯白。
//!
//! 结果是一张新位图，不与蒙版画布共享缓冲，也不会写回画布。
//!
//! `Binarize` 同时为 `MaskSurface` 和 `BinaryMask` 实现：
//! 画布按 alpha 判定，二值蒙版按“是否为白”判定，再次二值化得到相同结果。

use image::{Rgba, RgbaImage};

use super::CanvasError;
use super::surface::MaskSurface;
use crate::codec;

/// 被覆盖（允许修改）的像素。
pub const MASK_ON: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// 未覆盖的像素。
pub const MASK_OFF: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// 按 alpha 阈值二值化蒙版画布的 RGBA 缓冲。
///
/// 只适用于画布像素：已二值化的蒙版全部不透明，会被整张判为白色。
pub(crate) fn binarize_alpha(pixels: &RgbaImage) -> RgbaImage {
    let (width, height) = pixels.dimensions();
    let mut out = RgbaImage::new(width, height);

    for (dst, src) in out.pixels_mut().zip(pixels.pixels()) {
        *dst = if src[3] > 0 { MASK_ON } else { MASK_OFF };
    }

    out
}

/// 严格二值的蒙版：每个像素只可能是 `MASK_ON` 或 `MASK_OFF`。
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: RgbaImage,
}

impl BinaryMask {
    /// 全黑（无覆盖）蒙版。
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, MASK_OFF),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y) == &MASK_ON
    }

    pub fn covered_pixel_count(&self) -> usize {
        self.image.pixels().filter(|pixel| **pixel == MASK_ON).count()
    }

    pub fn is_all_black(&self) -> bool {
        self.image.pixels().all(|pixel| *pixel == MASK_OFF)
    }

    /// 编码为纯 Base64 PNG（发送给编辑服务）。
    pub fn to_png_base64(&self) -> Result<String, CanvasError> {
        codec::encode_png_base64(&self.image)
    }
}

/// 产出二值蒙版。
pub trait Binarize {
    fn binarize(&self) -> BinaryMask;
}

impl Binarize for MaskSurface {
    fn binarize(&self) -> BinaryMask {
        BinaryMask {
            image: binarize_alpha(self.pixels()),
        }
    }
}

impl Binarize for BinaryMask {
    fn binarize(&self) -> BinaryMask {
        let (width, height) = self.dimensions();
        BinaryMask {
            image: RgbaImage::from_fn(width, height, |x, y| {
                if self.is_covered(x, y) { MASK_ON } else { MASK_OFF }
            }),
        }
    }
}
