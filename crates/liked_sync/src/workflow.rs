use std::path::Path;

use anyhow::Result;
use liked_sync_entity::video;
use sea_orm::DatabaseConnection;

use crate::database;
use crate::filter::CategoryFilter;
use crate::utils::model::{RecordUpdate, clear_videos, list_videos, upsert_videos};
use crate::youtube::{LikedVideoSource, fetch_liked_items};

#[derive(Debug)]
pub struct SyncReport {
    /// 接口返回的视频总数
    pub fetched: usize,
    /// 被分类过滤掉的视频数
    pub excluded: usize,
    /// 最终写入数据库的视频数
    pub stored: usize,
    pub updates: Vec<RecordUpdate>,
}

/// 拉取全部喜欢的视频并完成分类过滤，这一步不会触碰数据库
pub async fn collect_liked_videos<S: LikedVideoSource>(
    source: &S,
    category_filter: &CategoryFilter,
) -> Result<(usize, Vec<video::Model>, usize)> {
    info!("开始获取喜欢的视频列表..");
    let items = fetch_liked_items(source).await?;
    let fetched = items.len();
    info!("获取喜欢的视频列表完成，共 {} 个视频", fetched);
    let (records, excluded) = category_filter.filter_items(items)?;
    Ok((fetched, records, excluded))
}

/// 清空数据库后重新写入，保证表中只剩下本次获取到的视频
pub async fn replace_videos(records: Vec<video::Model>, connection: &DatabaseConnection) -> Result<Vec<RecordUpdate>> {
    let removed = clear_videos(connection).await?;
    debug!("清空了 {} 条旧记录", removed);
    upsert_videos(records, connection).await
}

/// 获取、过滤成功之后才打开并改写数据库，任何前置步骤失败都会保留上一次同步的数据
pub async fn sync_liked_videos<S: LikedVideoSource>(
    source: &S,
    category_filter: &CategoryFilter,
    database_path: &Path,
) -> Result<(SyncReport, DatabaseConnection)> {
    let (fetched, records, excluded) = collect_liked_videos(source, category_filter).await?;
    let connection = database::open(database_path).await?;
    let stored = records.len();
    let updates = replace_videos(records, &connection).await?;
    Ok((
        SyncReport {
            fetched,
            excluded,
            stored,
            updates,
        },
        connection,
    ))
}

pub async fn print_all_videos(connection: &DatabaseConnection) -> Result<()> {
    let videos = list_videos(connection).await?;
    info!("数据库中保存的所有喜欢的视频：");
    for video in videos {
        info!("Title: {}", video.title);
        info!("URL: {}", video.url);
        info!("Views: {}", video.views);
        info!("Likes: {}", video.likes);
    }
    Ok(())
}
