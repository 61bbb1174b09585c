//! # 蒙版修图工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 命令行 (clap) / 宿主界面                  │
//! │        指针·触摸事件 ── 显示区域 ── 笔刷设置              │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            session (RetouchSession)              │
//! │                                                          │
//! │  ┌─ canvas ────── 源图 + 同尺寸蒙版                       │
//! │  │   ├─ mapper        屏幕坐标 → 画布像素                 │
//! │  │   ├─ stroke        Idle / Stroking 状态机              │
//! │  │   ├─ surface       圆形盖章（涂抹 / 擦除）             │
//! │  │   └─ binarize      alpha → 纯黑白蒙版                  │
//! │  │                                                       │
//! │  ├─ edit ──────── generateContent 请求与错误归类          │
//! │  ├─ comparison     前后对比滑块                           │
//! │  ├─ codec          PNG ⇄ Base64 / Data URL                │
//! │  ├─ settings       settings.json + GEMINI_API_KEY         │
//! │  └─ error          AppError (统一错误类型)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，会话与命令行的返回类型 |
//! | [`canvas`] | 源图加载缩放、坐标映射、笔刷光栅化、蒙版二值化 |
//! | [`edit`] | 远程编辑服务配置、报文、请求编排与错误提示 |
//! | [`session`] | 一次修图的全部状态与状态转换 |
//! | [`comparison`] | 按滑块位置合成前后对比图 |
//! | [`codec`] | PNG 编解码与 Base64 / Data URL 转换 |
//! | [`settings`] | 设置文件读写与凭据优先级 |
//! | [`cli`] | 命令行参数与笔刷脚本回放 |

pub mod error;
pub mod canvas;
pub mod cli;
pub mod codec;
pub mod comparison;
pub mod edit;
pub mod session;
pub mod settings;
