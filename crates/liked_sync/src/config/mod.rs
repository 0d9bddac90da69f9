use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

mod args;
mod default;
mod handlebar;

pub use crate::config::args::Args;
use crate::config::default::{
    default_api_base, default_excluded_category_id, default_page_size, default_scopes, default_video_url_template,
};
pub use crate::config::handlebar::{VIDEO_URL_TEMPLATE, create_template};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Cloud Console 中下载的 OAuth 客户端密钥文件
    pub client_secrets_path: PathBuf,
    /// 授权完成后缓存凭据的位置
    pub credential_path: PathBuf,
    pub database_path: PathBuf,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// 该分类下的视频不会写入数据库
    #[serde(default = "default_excluded_category_id")]
    pub excluded_category_id: String,
    #[serde(default = "default_video_url_template")]
    pub video_url_template: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Config {
    /// 以 config_dir 为根目录的默认配置
    pub fn new(config_dir: &Path) -> Self {
        Self {
            client_secrets_path: config_dir.join("client_secrets.json"),
            credential_path: config_dir.join("credentials.json"),
            database_path: config_dir.join("liked_videos.db"),
            scopes: default_scopes(),
            excluded_category_id: default_excluded_category_id(),
            video_url_template: default_video_url_template(),
            page_size: default_page_size(),
            api_base: default_api_base(),
        }
    }

    /// 读取 config_dir 下的配置文件，文件不存在时写入并使用默认配置
    pub fn load_or_init(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        info!("开始加载配置文件 {}..", config_path.display());
        match Self::load(&config_path) {
            Ok(config) => {
                info!("配置文件加载完毕");
                Ok(config)
            }
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .is_none_or(|e| e.kind() != std::io::ErrorKind::NotFound)
                {
                    return Err(e.context(format!("failed to load config file {}", config_path.display())));
                }
                warn!("配置文件不存在，使用默认配置..");
                let config = Self::new(config_dir);
                config.save(&config_path)?;
                Ok(config)
            }
        }
    }

    fn load(config_path: &Path) -> Result<Self> {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml::from_str(&config_content)?)
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, toml::to_string_pretty(self)?)
            .with_context(|| format!("failed to write config file {}", config_path.display()))?;
        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        let mut errors = Vec::new();
        for (name, path) in [
            ("client_secrets_path", &self.client_secrets_path),
            ("credential_path", &self.credential_path),
            ("database_path", &self.database_path),
        ] {
            if !path.is_absolute() {
                errors.push(format!("{} 应为绝对路径，检测到：{}", name, path.display()));
            }
        }
        if self.scopes.is_empty() {
            errors.push("未设置授权 scopes".to_owned());
        }
        if self.video_url_template.is_empty() {
            errors.push("未设置 video_url_template 模板".to_owned());
        }
        if !(1..=50).contains(&self.page_size) {
            errors.push(format!("page_size 必须位于 1 到 50 之间，检测到：{}", self.page_size));
        }
        if !errors.is_empty() {
            bail!(
                errors
                    .into_iter()
                    .map(|e| format!("- {}", e))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        Ok(())
    }
}
