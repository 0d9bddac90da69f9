#[macro_use]
extern crate tracing;

mod config;
mod database;
mod filter;
mod utils;
mod workflow;
mod youtube;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::config::{Args, Config};
use crate::filter::CategoryFilter;
use crate::utils::init_logger;
use crate::youtube::{InstalledAppFlow, YouTubeClient, obtain_credentials};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(&args.log_level);
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("同步喜欢的视频时遇到错误：{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let config_dir = args.config_dir()?;
    let config = Config::load_or_init(&config_dir)?;
    config.check()?;
    let flow = InstalledAppFlow::new(config.client_secrets_path.clone(), config.scopes.clone());
    let credential = obtain_credentials(&config.credential_path, &flow).await?;
    let youtube_client = YouTubeClient::new(credential, &config);
    let category_filter = CategoryFilter::new(&config)?;
    let (report, connection) =
        workflow::sync_liked_videos(&youtube_client, &category_filter, &config.database_path).await?;
    if args.print_all {
        workflow::print_all_videos(&connection).await?;
    }
    connection.close().await?;
    info!(
        "共找到 {} 个喜欢的视频（接口返回 {} 个，排除 {} 个音乐视频，{} 条记录发生变化），数据已保存至 {}",
        report.stored,
        report.fetched,
        report.excluded,
        report.updates.len(),
        config.database_path.display()
    );
    Ok(())
}
