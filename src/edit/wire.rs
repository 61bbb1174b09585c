//! # 请求 / 响应报文
//!
//! `generateContent` 的 JSON 结构。请求中图片以 `inline_data` 携带纯 Base64 PNG；
//! 响应里的图片字段可能是 `inline_data`（snake_case）或 `inlineData`（camelCase），两者都接受。

use serde::{Deserialize, Serialize};

pub(crate) const PNG_MIME: &str = "image/png";

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest<'a> {
    pub(crate) contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent<'a> {
    pub(crate) parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: RequestInlineData<'a> },
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestInlineData<'a> {
    pub(crate) mime_type: &'a str,
    pub(crate) data: &'a str,
}

impl<'a> RequestPart<'a> {
    pub(crate) fn text(text: &'a str) -> Self {
        Self::Text { text }
    }

    pub(crate) fn png(data: &'a str) -> Self {
        Self::InlineData {
            inline_data: RequestInlineData {
                mime_type: PNG_MIME,
                data,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default, alias = "inlineData")]
    pub(crate) inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseInlineData {
    #[serde(default)]
    pub(crate) data: Option<String>,
}

impl GenerateContentResponse {
    /// 第一个候选中第一段非空图片数据。
    pub(crate) fn first_image_data(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref()?.data.as_deref().filter(|data| !data.is_empty()))
    }

    /// 模型返回的文字说明（通常是拒绝原因），用于错误提示。
    pub(crate) fn text_summary(&self) -> Option<String> {
        let text: Vec<&str> = self
            .candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect();

        if text.is_empty() { None } else { Some(text.join(" ")) }
    }
}
