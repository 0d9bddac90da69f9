use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::youtube::oauth::TokenResponse;
use crate::youtube::{Authorizer, Client, Validate};

/// 缓存在本地的 OAuth 凭据，未知字段在反序列化时会被忽略
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// 预留一分钟，避免请求发出时 token 恰好过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry - Duration::seconds(60) <= now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && !self.token_uri.is_empty()
    }

    /// 使用 refresh_token 换取新的 access token，结果只保存在内存中
    pub async fn refresh(&self, client: &Client) -> Result<Self> {
        let refresh_token = self.refresh_token.as_deref().context("no refresh_token in credential")?;
        let res = client
            .request(Method::POST, &self.token_uri, None)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?
            .validate()?;
        let token: TokenResponse = serde_json::from_value(res)?;
        Ok(self.refreshed_with(token, Utc::now()))
    }

    pub(super) fn refreshed_with(&self, token: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: token.access_token,
            // 刷新接口通常不会返回新的 refresh_token，此时沿用旧值
            refresh_token: token.refresh_token.or_else(|| self.refresh_token.clone()),
            scopes: token.scope.map(|s| split_scopes(&s)).unwrap_or_else(|| self.scopes.clone()),
            expiry: token.expires_in.map(|secs| now + Duration::seconds(secs)),
            ..self.clone()
        }
    }

    /// 读取缓存的凭据，文件不存在时返回 Ok(None)
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(self)?)
            .await
            .with_context(|| format!("failed to write credential to {}", path.display()))?;
        Ok(())
    }
}

pub(super) fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(ToOwned::to_owned).collect()
}

/// 优先使用缓存的凭据，缓存不可用时才走交互式授权，并将新凭据写入缓存
pub async fn obtain_credentials(cache_path: &Path, authorizer: &impl Authorizer) -> Result<Credential> {
    match Credential::load(cache_path).await {
        Ok(Some(credential)) => {
            info!("使用缓存的凭据 {}", cache_path.display());
            return Ok(credential);
        }
        Ok(None) => info!("未找到缓存的凭据，开始授权.."),
        Err(e) => warn!("读取缓存的凭据 {} 失败：{:#}，重新进行授权..", cache_path.display(), e),
    }
    let credential = authorizer.obtain_token().await.context("authorization failed")?;
    credential.save(cache_path).await?;
    info!("授权成功，凭据已缓存至 {}", cache_path.display());
    Ok(credential)
}
