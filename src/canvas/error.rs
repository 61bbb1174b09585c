//! # 画布错误模型
//!
//! 使用单一错误枚举承载“读取 → 校验 → 解码 → 缩放 → 编码”链路中的本地错误，
//! 调用侧可按分支匹配，命令层再上转为 `AppError`。

/// 画布（源图 / 蒙版）本地处理错误。
///
/// 本地错误发生时会话状态保持不变。
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl CanvasError {
    /// 稳定错误码，供前端 / 脚本按码分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileSystem(_) => "E_FILE",
            Self::InvalidFormat(_) => "E_FORMAT",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::ResourceLimit(_) => "E_LIMIT",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) => "load",
            Self::InvalidFormat(_) | Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
        }
    }
}
