//! # 笔刷状态机
//!
//! ## 设计思路
//!
//! 只维护两个状态：`Idle` 与 `Stroking`。
//!
//! ```text
//!   Idle ──Down──▶ Stroking ──Move──▶ Stroking
//!    ▲                │
//!    └──Up / Leave────┘
//! ```
//!
//! - 按下时立即在起点盖一次章；
//! - 每个移动事件盖一次章，不在两次采样之间插值（快速移动可能留下间隙）；
//! - `Idle` 状态下的移动事件被忽略。

use super::mapper::{CanvasPoint, CoordinateMapper, PointerInput};
use super::surface::{BrushMode, MaskSurface};

pub const MIN_BRUSH_SIZE: u32 = 10;
pub const MAX_BRUSH_SIZE: u32 = 100;
pub const DEFAULT_BRUSH_SIZE: u32 = 30;

/// 描边状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking,
}

/// 指针 / 触摸事件（已归一化）。
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// mousedown / touchstart
    Down(PointerInput),
    /// mousemove / touchmove
    Move(PointerInput),
    /// mouseup / touchend
    Up,
    /// 指针离开画布
    Leave,
}

/// 笔刷设置：半径（像素）与模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushSettings {
    size: u32,
    mode: BrushMode,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE, BrushMode::Paint)
    }
}

impl BrushSettings {
    /// 半径会被限制在 `[MIN_BRUSH_SIZE, MAX_BRUSH_SIZE]`。
    pub fn new(size: u32, mode: BrushMode) -> Self {
        Self {
            size: size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            mode,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }
}

/// 描边光栅化器。
#[derive(Debug, Clone, Default)]
pub struct StrokeRasterizer {
    state: StrokeState,
    brush: BrushSettings,
}

impl StrokeRasterizer {
    pub fn new(brush: BrushSettings) -> Self {
        Self {
            state: StrokeState::Idle,
            brush,
        }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushSettings {
        &mut self.brush
    }

    /// 处理一个事件，返回本次盖章的画布坐标（没有盖章时为 `None`）。
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        mapper: &CoordinateMapper,
        surface: &mut MaskSurface,
    ) -> Option<CanvasPoint> {
        match event {
            PointerEvent::Down(input) => {
                self.state = StrokeState::Stroking;
                self.stamp(input, mapper, surface)
            }
            PointerEvent::Move(input) => {
                if self.state != StrokeState::Stroking {
                    return None;
                }
                self.stamp(input, mapper, surface)
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end();
                None
            }
        }
    }

    /// 结束当前描边（输入流终止时也应调用）。
    pub fn end(&mut self) {
        self.state = StrokeState::Idle;
    }

    fn stamp(
        &self,
        input: &PointerInput,
        mapper: &CoordinateMapper,
        surface: &mut MaskSurface,
    ) -> Option<CanvasPoint> {
        let point = mapper.map_input(input)?;
        surface.stamp(point, self.brush.size as f64, self.brush.mode);
        Some(point)
    }
}
