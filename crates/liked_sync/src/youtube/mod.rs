use anyhow::{Result, bail};
pub use client::{Client, YouTubeClient};
pub use credential::{Credential, obtain_credentials};
pub use error::YouTubeError;
pub use liked_list::{LikedPage, LikedVideoSource, fetch_liked_items};
pub use oauth::{Authorizer, InstalledAppFlow};
use serde::Deserialize;

mod client;
mod credential;
mod error;
mod liked_list;
#[cfg(test)]
pub(crate) mod mock;
mod oauth;

pub(crate) trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output>;
}

impl Validate for serde_json::Value {
    type Output = serde_json::Value;

    /// Data API 的错误形如 {"error": {"code": 403, "message": "..."}}，
    /// OAuth 端点的错误形如 {"error": "invalid_grant", "error_description": "..."}
    fn validate(self) -> Result<Self::Output> {
        if self["error"].is_null() {
            return Ok(self);
        }
        match &self["error"] {
            serde_json::Value::Object(error) => {
                let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or_default();
                let message = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_owned();
                bail!(YouTubeError::ErrorResponse(code, message))
            }
            serde_json::Value::String(error) => bail!(YouTubeError::OAuthError(
                error.clone(),
                self["error_description"].as_str().unwrap_or_default().to_owned(),
            )),
            _ => bail!(YouTubeError::InvalidResponse(self.to_string())),
        }
    }
}

/// videos.list 接口返回的单个视频
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub category_id: String,
}

/// 接口中的计数均以字符串形式返回，视频关闭点赞数展示时不存在 likeCount
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
}
