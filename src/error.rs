//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，会话层与命令行入口都返回它，
//! 各子模块的错误通过 `From` 自动上转，无需手动 map。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CanvasError` / `EditError` 提供 `From` 转换。
//! - 实现 `Serialize` 将错误序列化为字符串，便于前端或脚本直接展示。
//! - `guidance()` 给出面向用户的处理建议（配额 / 凭据 / 通用）。

use serde::Serialize;

use crate::canvas::CanvasError;
use crate::edit::EditError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片读取、解码、编码等本地处理错误
    #[error("{0}")]
    Canvas(#[from] CanvasError),

    /// 远程编辑链路错误（配置 / 远程 / 网络）
    #[error("{0}")]
    Edit(#[from] EditError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件读取或解析失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 尚未加载源图
    #[error("尚未加载图片，请先上传图片")]
    NoImage,

    /// 尚无编辑结果
    #[error("尚无处理结果，请先提交编辑")]
    NoResult,

    /// 输入参数或脚本不合法
    #[error("输入错误: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Canvas(err) => err.code(),
            Self::Edit(err) => err.code(),
            Self::Io(_) => "E_IO",
            Self::Settings(_) => "E_SETTINGS",
            Self::NoImage => "E_NO_IMAGE",
            Self::NoResult => "E_NO_RESULT",
            Self::InvalidInput(_) => "E_INPUT",
        }
    }

    /// 面向用户的处理建议。
    pub fn guidance(&self) -> String {
        match self {
            Self::Edit(err) => err.guidance(),
            Self::Canvas(err) => format!("❌ 图片加载失败，请尝试其他文件。\n\n{}", err),
            other => other.to_string(),
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
