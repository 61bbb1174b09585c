//! # 编辑服务错误模型
//!
//! ## 设计思路
//!
//! 远程编辑链路的错误分为三类，并各自给出可操作的提示：
//! - 配置错误（缺少凭据 / 端点非法）：请求不会发出；
//! - 远程服务错误：配额耗尽、凭据无效、响应缺少图片、其他状态码失败；
//! - 网络 / 意外错误：统一泛化提示。
//!
//! 所有错误都不自动重试，由用户修正后重新提交。

use reqwest::StatusCode;

use crate::canvas::CanvasError;

const QUOTA_GUIDANCE: &str = "⚠️ API 配额已用尽\n\n\
    当前密钥已达到免费额度上限。\n\n\
    可选方案：\n\
    1. 等待额度重置（按天重置）\n\
    2. 在 https://ai.google.dev/pricing 升级到付费档\n\
    3. 更换其他 API 密钥";

const CREDENTIAL_GUIDANCE: &str = "🔑 API 密钥错误\n\n\
    请检查设置文件中的 api_key、GEMINI_API_KEY 环境变量或 --api-key 参数。\n\
    获取密钥：https://aistudio.google.com/apikey";

const MISSING_CREDENTIAL_GUIDANCE: &str = "🔑 未配置 API 密钥\n\n\
    请通过 --api-key 参数、GEMINI_API_KEY 环境变量或设置文件中的 api_key 提供密钥。\n\
    获取密钥：https://aistudio.google.com/apikey";

const GENERIC_GUIDANCE: &str = "❌ 图片处理失败，请稍后重试。";

/// 编辑服务错误。
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("未配置 API 密钥")]
    MissingCredential,

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("API 配额已用尽（HTTP {status}）：{message}")]
    QuotaExceeded { status: u16, message: String },

    #[error("API 密钥无效（HTTP {status}）：{message}")]
    InvalidCredential { status: u16, message: String },

    #[error("编辑服务请求失败（HTTP {status}）：{message}")]
    Service { status: u16, message: String },

    #[error("编辑服务响应异常：{0}")]
    MalformedResponse(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("请求图片编码失败：{0}")]
    Encode(#[from] CanvasError),

    #[error("编辑请求处理中，请等待当前请求完成")]
    Busy,
}

impl EditError {
    /// 根据非 2xx 响应的状态码与正文归类错误。
    ///
    /// 429 或正文提到 quota → 配额；正文提到 API key 或 401/403 → 凭据；其他 → 通用失败。
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let code = status.as_u16();
        let lowered = body.to_ascii_lowercase();
        let message = summarize_body(body);

        if status == StatusCode::TOO_MANY_REQUESTS || lowered.contains("quota") {
            return Self::QuotaExceeded { status: code, message };
        }

        if lowered.contains("api key")
            || lowered.contains("api_key_invalid")
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return Self::InvalidCredential { status: code, message };
        }

        Self::Service { status: code, message }
    }

    /// 统一映射 reqwest 错误。
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Network(format!("请求超时：{}", error))
        } else if error.is_connect() {
            Self::Network(format!("无法连接：{}", error))
        } else if error.is_decode() {
            Self::MalformedResponse(format!("读取响应失败：{}", error))
        } else {
            Self::Network(format!("请求失败：{}", error))
        }
    }

    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential { .. })
    }

    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "E_NO_CREDENTIAL",
            Self::InvalidConfig(_) => "E_CONFIG",
            Self::QuotaExceeded { .. } => "E_QUOTA",
            Self::InvalidCredential { .. } => "E_CREDENTIAL",
            Self::Service { .. } => "E_SERVICE",
            Self::MalformedResponse(_) => "E_RESPONSE",
            Self::Network(_) => "E_NETWORK",
            Self::Encode(_) => "E_ENCODE",
            Self::Busy => "E_BUSY",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingCredential | Self::InvalidConfig(_) | Self::Busy => "config",
            Self::Encode(_) => "encode",
            Self::Network(_) => "request",
            Self::QuotaExceeded { .. } | Self::InvalidCredential { .. } | Self::Service { .. } => "remote",
            Self::MalformedResponse(_) => "response",
        }
    }

    /// 面向用户的处理建议，区分配额耗尽 / 凭据问题 / 通用失败。
    pub fn guidance(&self) -> String {
        match self {
            Self::QuotaExceeded { .. } => QUOTA_GUIDANCE.to_string(),
            Self::InvalidCredential { .. } => CREDENTIAL_GUIDANCE.to_string(),
            Self::MissingCredential => MISSING_CREDENTIAL_GUIDANCE.to_string(),
            Self::InvalidConfig(_) | Self::Busy | Self::MalformedResponse(_) => self.to_string(),
            Self::Service { .. } | Self::Network(_) | Self::Encode(_) => {
                format!("{}\n\n{}", GENERIC_GUIDANCE, self)
            }
        }
    }
}

/// 截取响应正文用于错误信息，避免把整页 HTML 塞进提示。
fn summarize_body(body: &str) -> String {
    const MAX_CHARS: usize = 300;

    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }

    let mut summary: String = trimmed.chars().take(MAX_CHARS).collect();
    summary.push('…');
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_quota() {
        let err = EditError::from_status(StatusCode::TOO_MANY_REQUESTS, "Resource has been exhausted");

        assert!(err.is_quota_exhausted());
        assert_eq!(err.code(), "E_QUOTA");
        assert!(err.guidance().contains("配额"));
    }

    #[test]
    fn quota_text_wins_over_status() {
        let err = EditError::from_status(StatusCode::BAD_REQUEST, "You exceeded your current quota");

        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn api_key_text_is_credential_problem() {
        let err = EditError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#,
        );

        assert!(matches!(err, EditError::InvalidCredential { status: 400, .. }));
        assert!(err.guidance().contains("aistudio.google.com/apikey"));
    }

    #[test]
    fn forbidden_is_credential_problem() {
        let err = EditError::from_status(StatusCode::FORBIDDEN, "denied");

        assert!(err.is_credential_problem());
    }

    #[test]
    fn other_status_is_generic_failure() {
        let err = EditError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");

        assert!(matches!(err, EditError::Service { status: 500, .. }));
        assert!(!err.is_quota_exhausted());
        assert!(!err.is_credential_problem());
        assert!(err.guidance().starts_with(GENERIC_GUIDANCE));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let err = EditError::from_status(StatusCode::BAD_GATEWAY, &"x".repeat(5_000));

        match err {
            EditError::Service { message, .. } => assert_eq!(message.chars().count(), 301),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
