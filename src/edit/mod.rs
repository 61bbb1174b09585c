//! # 远程编辑模块（edit）
//!
//! ## 设计思路
//!
//! 远程生成式图片服务被视为不透明函数 `edit(image, mask) -> image | error`。
//! 本模块只负责打包请求、解释响应与错误归类：
//!
//! - `config`：端点、模型、凭据与蒙版能力（构造时显式注入）
//! - `wire`：`generateContent` 报文结构
//! - `service`：请求编排（`EditService`）
//! - `error`：配置 / 远程 / 网络错误与用户提示
//!
//! ```text
//! session.rs（提交）
//!    ↓
//! service.rs ── config.rs（凭据解析）
//!    ├─ codec（PNG ⇄ Base64）
//!    └─ wire.rs（JSON 报文）
//!    ↓
//! EditedImage / EditError
//! ```

mod config;
mod error;
#[cfg(test)]
pub(crate) mod fake_service;
mod service;
mod wire;

pub use config::{DEFAULT_ENDPOINT, DEFAULT_INSTRUCTION, DEFAULT_MODEL, EditServiceConfig, MASK_INSTRUCTION, MaskMode};
pub use error::EditError;
pub use service::{EditService, EditedImage};
