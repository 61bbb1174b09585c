//! # 持久化设置
//!
//! `settings.json` 保存编辑服务的凭据、端点、模型与蒙版模式，字段均可缺省。
//! 凭据优先级：请求级覆盖 > `GEMINI_API_KEY` 环境变量 > 设置文件。
//! 环境变量由调用方读取后显式传入，本模块不读取进程全局状态。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::edit::{EditServiceConfig, MaskMode};
use crate::error::AppError;

/// 凭据环境变量名。
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub mask_mode: Option<MaskMode>,
    pub instruction: Option<String>,
}

impl AppSettings {
    /// 合并出编辑服务配置；`env_key` 非空时覆盖文件中的凭据。
    pub fn into_service_config(self, env_key: Option<String>) -> EditServiceConfig {
        let defaults = EditServiceConfig::default();
        let api_key = non_blank(env_key).or_else(|| non_blank(self.api_key));

        EditServiceConfig {
            endpoint: non_blank(self.endpoint).unwrap_or(defaults.endpoint),
            model: non_blank(self.model).unwrap_or(defaults.model),
            api_key,
            mask_mode: self.mask_mode.unwrap_or(defaults.mask_mode),
            instruction: non_blank(self.instruction).unwrap_or(defaults.instruction),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 读取设置文件；文件不存在时返回默认设置。
pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::debug!("设置文件不存在，使用默认设置: {}", path.display());
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
