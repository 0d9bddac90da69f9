use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "Liked-Sync", version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "None,liked_sync=info", env = "RUST_LOG")]
    pub log_level: String,

    #[arg(short, long, env = "LIKED_SYNC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// 同步完成后打印数据库中的所有视频
    #[arg(short, long)]
    pub print_all: bool,
}

impl Args {
    /// 配置文件夹的绝对路径，未指定时使用系统配置目录下的 liked-sync
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.config_dir {
            Some(dir) => std::path::absolute(dir).with_context(|| format!("invalid config dir: {}", dir.display())),
            None => Ok(dirs::config_dir().context("No config path found")?.join("liked-sync")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["liked-sync", "--config-dir", "/tmp/liked", "--print-all"]);
        assert!(args.print_all);
        assert_eq!(args.config_dir().unwrap(), PathBuf::from("/tmp/liked"));
    }

    #[test]
    fn test_relative_config_dir_is_absolutized() {
        let args = Args::parse_from(["liked-sync", "-c", "relative/dir"]);
        let dir = args.config_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("relative/dir"));
    }
}
