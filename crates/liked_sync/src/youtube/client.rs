use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::Once;
use reqwest::{Method, header};

use crate::config::Config;
use crate::youtube::{Credential, LikedPage, LikedVideoSource, Validate};

const LIKED_VIDEO_PARTS: &str = "id,snippet,statistics,contentDetails";

// 一个对 reqwest::Client 的简单封装，用于 Google API 请求
#[derive(Clone)]
pub struct Client(reqwest::Client);

impl Client {
    pub fn new() -> Self {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");
        });
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("liked-sync/", env!("CARGO_PKG_VERSION"))),
        );
        Self(
            reqwest::Client::builder()
                .default_headers(headers)
                .gzip(true)
                .connect_timeout(std::time::Duration::from_secs(10))
                .read_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build reqwest client"),
        )
    }

    // a wrapper of reqwest::Client::request to add credential to the request
    pub fn request(&self, method: Method, url: &str, credential: Option<&Credential>) -> reqwest::RequestBuilder {
        let req = self.0.request(method, url);
        match credential {
            Some(credential) => req.bearer_auth(&credential.token),
            None => req,
        }
    }
}

// clippy 建议实现 Default trait
impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

pub struct YouTubeClient {
    pub client: Client,
    credential: ArcSwap<Credential>,
    api_base: String,
    page_size: u32,
}

impl YouTubeClient {
    pub fn new(credential: Credential, config: &Config) -> Self {
        Self {
            client: Client::new(),
            credential: ArcSwap::from_pointee(credential),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            page_size: config.page_size,
        }
    }

    /// 返回当前可用的凭据，access token 过期时先在内存中刷新
    async fn fresh_credential(&self) -> Result<Arc<Credential>> {
        let credential = self.credential.load_full();
        if !credential.is_expired(Utc::now()) {
            return Ok(credential);
        }
        if !credential.can_refresh() {
            warn!("access token 已过期且无法刷新，继续使用旧 token 发起请求");
            return Ok(credential);
        }
        info!("access token 已过期，开始刷新..");
        let refreshed = Arc::new(credential.refresh(&self.client).await?);
        self.credential.store(refreshed.clone());
        Ok(refreshed)
    }

    /// 获取一个携带 access token 的预构建请求
    pub async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let credential = self.fresh_credential().await?;
        Ok(self
            .client
            .request(method, &format!("{}{}", self.api_base, path), Some(&credential)))
    }
}

impl LikedVideoSource for YouTubeClient {
    async fn liked_page(&self, page_token: Option<&str>) -> Result<LikedPage> {
        let mut req = self.request(Method::GET, "/videos").await?.query(&[
            ("part", LIKED_VIDEO_PARTS),
            ("myRating", "like"),
            ("maxResults", self.page_size.to_string().as_str()),
        ]);
        if let Some(page_token) = page_token {
            req = req.query(&[("pageToken", page_token)]);
        }
        let res = req
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?
            .validate()?;
        Ok(serde_json::from_value(res)?)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::utils::init_logger;
    use crate::youtube::liked_list::LikedList;

    #[ignore = "only for manual test"]
    #[tokio::test]
    async fn test_fetch_first_page() {
        init_logger("None,liked_sync=debug");
        let config = Config::new(&dirs::config_dir().unwrap().join("liked-sync"));
        let credential = Credential::load(&config.credential_path).await.unwrap().unwrap();
        let client = YouTubeClient::new(credential, &config);
        let items = LikedList::new(&client).into_item_stream().take(5).collect::<Vec<_>>().await;
        assert!(items.iter().all(|item| item.is_ok()));
    }
}
