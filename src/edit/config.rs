//! # 编辑服务配置
//!
//! ## 设计思路
//!
//! 凭据、端点、模型与指令文本全部通过 `EditServiceConfig` 显式注入编排器，
//! 不存在模块级默认密钥。每次请求还可以传入覆盖凭据（会话级）。
//!
//! 凭据优先级：请求级覆盖 > 配置中的密钥（由设置层合并环境变量与设置文件得到）。

use serde::{Deserialize, Serialize};

use super::EditError;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// 纯文本（语义蒙版）模式下的编辑指令。
pub const DEFAULT_INSTRUCTION: &str = "Edit this image to remove any visual imperfections, scratches, \
    blemishes, or unwanted elements. Keep everything else the same.";

/// 附带蒙版时追加的说明。
pub const MASK_INSTRUCTION: &str = "The second image is a black and white mask with the same size as \
    the first image. Modify only the regions that are white in the mask and preserve every black region \
    exactly as it is.";

/// 蒙版提交能力：远程服务是否接收像素蒙版。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// 蒙版作为第二张图片随请求发送。
    #[default]
    Attach,
    /// 仅发送指令文本与源图。
    TextOnly,
}

impl MaskMode {
    pub fn parse(value: &str) -> Result<Self, EditError> {
        match value.trim().to_lowercase().as_str() {
            "attach" => Ok(Self::Attach),
            "text_only" | "text-only" => Ok(Self::TextOnly),
            other => Err(EditError::InvalidConfig(format!(
                "未知蒙版模式：{}（可选：attach / text_only）",
                other
            ))),
        }
    }
}

/// 编辑服务配置。
#[derive(Debug, Clone)]
pub struct EditServiceConfig {
    /// API 根地址（不含 `/models/...`）。
    pub endpoint: String,
    /// 模型名。
    pub model: String,
    /// 已存储的凭据；请求级覆盖优先。
    pub api_key: Option<String>,
    /// 蒙版提交能力。
    pub mask_mode: MaskMode,
    /// 编辑意图描述。
    pub instruction: String,
}

impl Default for EditServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            mask_mode: MaskMode::Attach,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl EditServiceConfig {
    /// 解析本次请求使用的凭据；空白字符串视为未提供。
    pub fn resolve_api_key<'a>(&'a self, override_key: Option<&'a str>) -> Result<&'a str, EditError> {
        override_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty()))
            .ok_or(EditError::MissingCredential)
    }

    /// `generateContent` 完整地址。
    pub fn generate_content_url(&self) -> Result<reqwest::Url, EditError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model.trim()
        );

        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| EditError::InvalidConfig(format!("编辑服务地址格式错误：{}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EditError::InvalidConfig("编辑服务仅支持 HTTP/HTTPS".to_string()));
        }

        Ok(parsed)
    }
}
