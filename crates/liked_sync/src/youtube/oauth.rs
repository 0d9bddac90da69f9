use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::{Method, Url};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::youtube::credential::split_scopes;
use crate::youtube::{Client, Credential, Validate, YouTubeError};

/// 获取一份全新凭据的能力，真实实现需要用户在浏览器中完成授权
pub trait Authorizer {
    async fn obtain_token(&self) -> Result<Credential>;
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_owned()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

/// Google Cloud Console 导出的客户端密钥文件，桌面应用为 installed，网页应用为 web
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientSecretsFile {
    Installed(ClientSecret),
    Web(ClientSecret),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ClientSecret {
    pub fn from_json(content: &str) -> Result<Self> {
        let (ClientSecretsFile::Installed(secret) | ClientSecretsFile::Web(secret)) = serde_json::from_str(content)?;
        Ok(secret)
    }

    pub fn authorization_url(&self, scopes: &[String], redirect_uri: &str, state: &str) -> Result<Url> {
        Ok(Url::parse_with_params(
            &self.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scopes.join(" ").as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl CallbackParams {
    fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            bail!(YouTubeError::AuthorizationDenied(error));
        }
        ensure!(
            self.state.as_deref() == Some(expected_state),
            YouTubeError::StateMismatch
        );
        self.code
            .context("authorization callback carries no code")
    }
}

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

/// 桌面应用的授权流程：在本地回环地址监听回调，打开浏览器让用户授权，再用授权码换取 token
pub struct InstalledAppFlow {
    client_secrets_path: PathBuf,
    scopes: Vec<String>,
    client: Client,
}

impl InstalledAppFlow {
    pub fn new(client_secrets_path: PathBuf, scopes: Vec<String>) -> Self {
        Self {
            client_secrets_path,
            scopes,
            client: Client::new(),
        }
    }

    fn client_secret(&self) -> Result<ClientSecret> {
        let content = std::fs::read_to_string(&self.client_secrets_path).with_context(|| {
            format!(
                "failed to read client secrets file {}",
                self.client_secrets_path.display()
            )
        })?;
        ClientSecret::from_json(&content).with_context(|| {
            format!(
                "invalid client secrets file {}",
                self.client_secrets_path.display()
            )
        })
    }

    async fn exchange_code(&self, secret: &ClientSecret, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let res = self
            .client
            .request(Method::POST, &secret.token_uri, None)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?
            .validate()?;
        Ok(serde_json::from_value(res)?)
    }

    fn into_credential(&self, secret: ClientSecret, token: TokenResponse) -> Credential {
        Credential {
            token: token.access_token,
            refresh_token: token.refresh_token,
            token_uri: secret.token_uri,
            client_id: secret.client_id,
            client_secret: secret.client_secret,
            scopes: token
                .scope
                .map(|s| split_scopes(&s))
                .unwrap_or_else(|| self.scopes.clone()),
            expiry: token
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        }
    }
}

impl Authorizer for InstalledAppFlow {
    async fn obtain_token(&self) -> Result<Credential> {
        // 客户端密钥缺失属于配置错误，在打开监听之前就应该失败
        let secret = self.client_secret()?;
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind local callback address failed")?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
        let state = random_state();
        let auth_url = secret.authorization_url(&self.scopes, &redirect_uri, &state)?;
        info!("请在浏览器中完成授权，如果浏览器没有自动打开，请手动访问：{}", auth_url);
        if let Err(e) = open::that(auth_url.as_str()) {
            warn!("打开浏览器失败：{}", e);
        }
        let code = wait_for_callback(listener).await?.into_code(&state)?;
        info!("收到授权码，开始换取 token..");
        let token = self.exchange_code(&secret, &code, &redirect_uri).await?;
        Ok(self.into_credential(secret, token))
    }
}

fn random_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(30)
        .map(char::from)
        .collect()
}

async fn callback(State(sender): State<CallbackSender>, Query(params): Query<CallbackParams>) -> &'static str {
    if let Some(tx) = sender.lock().take() {
        let _ = tx.send(params);
    }
    "授权流程已结束，可以关闭此页面。"
}

/// 阻塞等待浏览器重定向回来的第一个请求，拿到参数后关闭监听
async fn wait_for_callback(listener: TcpListener) -> Result<CallbackParams> {
    let (tx, rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let sender: CallbackSender = Arc::new(Mutex::new(Some(tx)));
    let app = Router::new().route("/", get(callback)).with_state(sender);
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });
    let params = rx.await.context("callback server stopped before authorization completed")?;
    let _ = shutdown_tx.send(());
    // 浏览器可能保持着长连接，不无限等待服务器退出
    match tokio::time::timeout(Duration::from_secs(5), server).await {
        Ok(res) => res??,
        Err(_) => debug!("等待回调服务器退出超时"),
    }
    Ok(params)
}
