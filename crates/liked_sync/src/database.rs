use std::path::Path;

use anyhow::{Context, Result};
use liked_sync_entity::video;
use sea_orm::sea_query::{ColumnDef, Table};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

fn database_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.to_string_lossy())
}

/// 整个进程只使用一个连接，内存数据库也依赖这一点保证所有操作落在同一个库上
pub async fn database_connection(url: &str) -> Result<DatabaseConnection> {
    let mut option = ConnectOptions::new(url);
    option
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(90))
        .sqlx_logging(false);
    Ok(Database::connect(option).await?)
}

/// 打开数据库文件并确保 videos 表存在
pub async fn open(path: &Path) -> Result<DatabaseConnection> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let connection = database_connection(&database_url(path))
        .await
        .with_context(|| format!("failed to open database {}", path.display()))?;
    create_video_table(&connection).await?;
    Ok(connection)
}

/// 不存在时创建 videos 表，已存在时什么都不做
pub async fn create_video_table(connection: &DatabaseConnection) -> Result<()> {
    let statement = Table::create()
        .table(video::Entity)
        .if_not_exists()
        .col(ColumnDef::new(video::Column::Title).text())
        .col(ColumnDef::new(video::Column::Url).text().unique_key())
        .col(ColumnDef::new(video::Column::Views).integer())
        .col(ColumnDef::new(video::Column::Likes).integer())
        .to_owned();
    let backend = connection.get_database_backend();
    connection
        .execute(backend.build(&statement))
        .await
        .context("create videos table failed")?;
    Ok(())
}

#[cfg(test)]
pub async fn memory_connection() -> DatabaseConnection {
    let connection = database_connection("sqlite::memory:").await.unwrap();
    create_video_table(&connection).await.unwrap();
    connection
}
