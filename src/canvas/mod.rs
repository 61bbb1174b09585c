//! # 画布模块（canvas）
//!
//! ## 设计思路
//!
//! 画布对由两张同尺寸位图组成：只读的源图（缩放后的上传图片）与叠加在其上的蒙版。
//! 该模块把“指针输入 → 坐标换算 → 盖章光栅化 → 二值化”按职责拆分：
//!
//! - `source`：源图加载、校验与等比缩放
//! - `mapper`：视口坐标 → 画布像素坐标
//! - `surface`：蒙版画布与圆形盖章（绘制 / 擦除）
//! - `stroke`：笔刷设置与 `Idle / Stroking` 状态机
//! - `binarize`：蒙版 alpha → 严格黑白蒙版
//! - `config/error`：配置与错误
//!
//! ```text
//! PointerEvent
//!    ↓
//! stroke.rs（状态机）── mapper.rs（坐标换算）
//!    ↓
//! surface.rs（盖章累积 alpha）
//!    ↓ 提交时
//! binarize.rs（黑白蒙版）→ edit 模块
//! ```
//!
//! 所有光栅化都在事件线程上同步完成，无需加锁。

mod binarize;
mod config;
mod error;
mod mapper;
mod source;
mod stroke;
mod surface;

pub use binarize::{Binarize, BinaryMask, MASK_OFF, MASK_ON};
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use mapper::{CanvasPoint, ClientPoint, CoordinateMapper, DisplayRect, PointerInput};
pub use source::{ImageInput, SourceImage, fit_dimensions};
pub use stroke::{
    BrushSettings, DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, PointerEvent, StrokeRasterizer,
    StrokeState,
};
pub use surface::{BrushMode, MaskSurface, PAINT_COLOR};
