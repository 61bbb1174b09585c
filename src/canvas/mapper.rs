//! # 坐标映射
//!
//! 将指针事件的视口坐标换算为蒙版画布的像素坐标。
//! 画布的像素尺寸 `(W, H)` 固定，但屏幕上的显示尺寸可以不同（CSS 尺寸 vs 后备存储），
//! 因此每个轴各有一个缩放系数：
//!
//! ```text
//! px = (client_x - left) * (W / display_width)
//! py = (client_y - top)  * (H / display_height)
//! ```
//!
//! 不做边界裁剪：指针在画布边缘时可能得到 `[0,W)×[0,H)` 之外的坐标，
//! 由笔刷盖章按画布自身边界裁剪。

use serde::{Deserialize, Serialize};

/// 视口坐标（`clientX` / `clientY`）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientPoint {
    pub x: f64,
    pub y: f64,
}

impl ClientPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 画布像素坐标。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

/// 蒙版画布在屏幕上的包围矩形。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    /// 以原点为左上角、按像素 1:1 显示的矩形。
    pub fn unscaled(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    fn is_mappable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// 一次指针输入携带的位置信息。
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// 鼠标 / 触控笔：单一位置。
    Pointer(ClientPoint),
    /// 触摸：当前所有接触点，仅使用第一个。
    Touch(Vec<ClientPoint>),
}

impl PointerInput {
    /// 参与绘制的位置；没有接触点的触摸事件返回 `None`。
    pub fn primary(&self) -> Option<ClientPoint> {
        match self {
            Self::Pointer(point) => Some(*point),
            Self::Touch(touches) => touches.first().copied(),
        }
    }
}

/// 坐标映射器：显示矩形 + 后备像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    rect: DisplayRect,
    backing_width: u32,
    backing_height: u32,
}

impl CoordinateMapper {
    pub fn new(rect: DisplayRect, backing_width: u32, backing_height: u32) -> Self {
        Self {
            rect,
            backing_width,
            backing_height,
        }
    }

    /// 画布按 1:1 显示在原点时的映射（视口坐标即像素坐标）。
    pub fn unscaled(backing_width: u32, backing_height: u32) -> Self {
        Self::new(
            DisplayRect::unscaled(backing_width, backing_height),
            backing_width,
            backing_height,
        )
    }

    pub fn rect(&self) -> DisplayRect {
        self.rect
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (self.backing_width, self.backing_height)
    }

    /// 视口坐标 → 画布像素坐标。
    ///
    /// 显示矩形宽或高为 0（或非有限值）时无法换算，返回 `None`。
    pub fn map(&self, client: ClientPoint) -> Option<CanvasPoint> {
        if !self.rect.is_mappable() {
            return None;
        }

        let scale_x = self.backing_width as f64 / self.rect.width;
        let scale_y = self.backing_height as f64 / self.rect.height;

        Some(CanvasPoint {
            x: (client.x - self.rect.left) * scale_x,
            y: (client.y - self.rect.top) * scale_y,
        })
    }

    /// 从指针输入中取出主位置并换算。
    pub fn map_input(&self, input: &PointerInput) -> Option<CanvasPoint> {
        self.map(input.primary()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn maps_through_css_scale() {
        // 800x600 画布显示为 400x300，偏移 (16, 16)
        let mapper = CoordinateMapper::new(
            DisplayRect {
                left: 16.0,
                top: 16.0,
                width: 400.0,
                height: 300.0,
            },
            800,
            600,
        );

        let point = mapper.map(ClientPoint::new(66.0, 116.0)).expect("mappable rect");
        assert_eq!(point, CanvasPoint { x: 100.0, y: 200.0 });
    }

    #[test]
    fn does_not_clamp_outside_surface() {
        let mapper = CoordinateMapper::unscaled(100, 100);

        let point = mapper.map(ClientPoint::new(-5.0, 130.0)).expect("mappable rect");
        assert_eq!(point, CanvasPoint { x: -5.0, y: 130.0 });
    }

    #[test]
    fn touch_uses_first_contact_only() {
        let mapper = CoordinateMapper::unscaled(100, 100);
        let input = PointerInput::Touch(vec![ClientPoint::new(10.0, 20.0), ClientPoint::new(90.0, 90.0)]);

        assert_eq!(mapper.map_input(&input), Some(CanvasPoint { x: 10.0, y: 20.0 }));
    }

    #[test]
    fn touch_without_contacts_is_noop() {
        let mapper = CoordinateMapper::unscaled(100, 100);

        assert_eq!(mapper.map_input(&PointerInput::Touch(Vec::new())), None);
    }

    #[test]
    fn degenerate_display_rect_is_not_mappable() {
        let mapper = CoordinateMapper::new(
            DisplayRect {
                left: 0.0,
                top: 0.0,
                width: 0.0,
                height: 300.0,
            },
            800,
            600,
        );

        assert_eq!(mapper.map(ClientPoint::new(1.0, 1.0)), None);
    }

    proptest! {
        #[test]
        fn scaling_display_rect_scales_output_inversely(
            x in 0.0f64..400.0,
            y in 0.0f64..300.0,
            k in 0.25f64..4.0,
        ) {
            let base = CoordinateMapper::new(
                DisplayRect { left: 0.0, top: 0.0, width: 400.0, height: 300.0 },
                800,
                600,
            );
            let scaled = CoordinateMapper::new(
                DisplayRect { left: 0.0, top: 0.0, width: 400.0 * k, height: 300.0 * k },
                800,
                600,
            );

            let a = base.map(ClientPoint::new(x, y)).expect("mappable rect");
            let b = scaled.map(ClientPoint::new(x, y)).expect("mappable rect");

            prop_assert!((b.x - a.x / k).abs() < 1e-6);
            prop_assert!((b.y - a.y / k).abs() < 1e-6);
        }
    }
}
