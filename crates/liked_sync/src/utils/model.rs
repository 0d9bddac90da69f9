use std::fmt;

use anyhow::{Context, Result};
use liked_sync_entity::video;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// 同一个 url 前后两次记录之间的单个字段变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title { old: String, new: String },
    Views { old: i64, new: i64 },
    Likes { old: i64, new: i64 },
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::Title { old, new } => write!(f, "Title: '{}' -> '{}'", old, new),
            FieldChange::Views { old, new } => write!(f, "Views: {} -> {}", old, new),
            FieldChange::Likes { old, new } => write!(f, "Likes: {} -> {}", old, new),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub title: String,
    pub url: String,
    pub changes: Vec<FieldChange>,
}

/// 比较已有记录与新记录，只返回发生变化的字段
pub fn diff_video(existing: &video::Model, record: &video::Model) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if existing.title != record.title {
        changes.push(FieldChange::Title {
            old: existing.title.clone(),
            new: record.title.clone(),
        });
    }
    if existing.views != record.views {
        changes.push(FieldChange::Views {
            old: existing.views,
            new: record.views,
        });
    }
    if existing.likes != record.likes {
        changes.push(FieldChange::Likes {
            old: existing.likes,
            new: record.likes,
        });
    }
    changes
}

/// 删除表中的所有视频
pub async fn clear_videos(connection: &DatabaseConnection) -> Result<u64> {
    Ok(video::Entity::delete_many()
        .exec(connection)
        .await
        .context("clear videos failed")?
        .rows_affected)
}

/// 逐条写入视频，url 冲突时更新其余字段，每写入一条提交一次
pub async fn upsert_videos(records: Vec<video::Model>, connection: &DatabaseConnection) -> Result<Vec<RecordUpdate>> {
    let mut updates = Vec::new();
    for record in records {
        let txn = connection.begin().await?;
        if let Some(existing) = video::Entity::find_by_id(record.url.clone()).one(&txn).await? {
            let changes = diff_video(&existing, &record);
            if !changes.is_empty() {
                info!("更新视频「{}」({}) 的记录：", record.title, record.url);
                for change in &changes {
                    info!("  {}", change);
                }
                updates.push(RecordUpdate {
                    title: record.title.clone(),
                    url: record.url.clone(),
                    changes,
                });
            }
        }
        video::Entity::insert(video::ActiveModel {
            title: Set(record.title),
            url: Set(record.url),
            views: Set(record.views),
            likes: Set(record.likes),
        })
        .on_conflict(
            OnConflict::column(video::Column::Url)
                .update_columns([video::Column::Title, video::Column::Views, video::Column::Likes])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .context("upsert video failed")?;
        txn.commit().await?;
    }
    Ok(updates)
}

/// 读取表中的所有视频
pub async fn list_videos(connection: &DatabaseConnection) -> Result<Vec<video::Model>> {
    video::Entity::find()
        .all(connection)
        .await
        .context("list videos failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_connection;

    fn record(id: &str, title: &str, views: i64, likes: i64) -> video::Model {
        video::Model {
            title: title.to_owned(),
            url: format!("https://www.youtube.com/watch?v={id}"),
            views,
            likes,
        }
    }

    async fn sorted_videos(connection: &DatabaseConnection) -> Vec<video::Model> {
        let mut videos = list_videos(connection).await.unwrap();
        videos.sort_by(|a, b| a.url.cmp(&b.url));
        videos
    }

    #[test]
    fn test_field_change_display() {
        let change = FieldChange::Title {
            old: "old".to_owned(),
            new: "new".to_owned(),
        };
        assert_eq!(change.to_string(), "Title: 'old' -> 'new'");
        assert_eq!(FieldChange::Views { old: 1, new: 2 }.to_string(), "Views: 1 -> 2");
        assert_eq!(FieldChange::Likes { old: 3, new: 0 }.to_string(), "Likes: 3 -> 0");
    }

    #[test]
    fn test_diff_video() {
        let existing = record("a", "T1", 10, 1);
        assert!(diff_video(&existing, &existing.clone()).is_empty());
        assert_eq!(
            diff_video(&existing, &record("a", "T1", 11, 1)),
            vec![FieldChange::Views { old: 10, new: 11 }]
        );
        assert_eq!(
            diff_video(&existing, &record("a", "T2", 10, 5)),
            vec![
                FieldChange::Title {
                    old: "T1".to_owned(),
                    new: "T2".to_owned()
                },
                FieldChange::Likes { old: 1, new: 5 },
            ]
        );
        assert_eq!(diff_video(&existing, &record("a", "T2", 20, 2)).len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_insert_and_update() {
        let connection = memory_connection().await;
        let updates = upsert_videos(vec![record("a", "A", 1, 1), record("b", "B", 2, 2)], &connection)
            .await
            .unwrap();
        assert!(updates.is_empty());

        let updates = upsert_videos(vec![record("a", "A renamed", 5, 1)], &connection)
            .await
            .unwrap();
        assert_eq!(
            updates,
            vec![RecordUpdate {
                title: "A renamed".to_owned(),
                url: "https://www.youtube.com/watch?v=a".to_owned(),
                changes: vec![
                    FieldChange::Title {
                        old: "A".to_owned(),
                        new: "A renamed".to_owned()
                    },
                    FieldChange::Views { old: 1, new: 5 },
                ],
            }]
        );
        assert_eq!(
            sorted_videos(&connection).await,
            vec![record("a", "A renamed", 5, 1), record("b", "B", 2, 2)]
        );
    }

    #[tokio::test]
    async fn test_field_changes_are_logged() {
        let connection = memory_connection().await;
        let logs = crate::utils::LogCapture::default();
        let _guard = logs.set_default();
        let update_lines = || {
            logs.lines()
                .into_iter()
                .filter(|line| line.contains("更新视频") || line.contains(" -> "))
                .collect::<Vec<_>>()
        };
        upsert_videos(vec![record("a", "A", 1, 1)], &connection).await.unwrap();
        upsert_videos(vec![record("a", "A", 1, 1)], &connection).await.unwrap();
        assert!(update_lines().is_empty());

        upsert_videos(vec![record("a", "A2", 5, 1)], &connection).await.unwrap();
        let lines = update_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("更新视频「A2」(https://www.youtube.com/watch?v=a) 的记录："));
        assert!(lines[1].contains("Title: 'A' -> 'A2'"));
        assert!(lines[2].contains("Views: 1 -> 5"));
    }

    #[tokio::test]
    async fn test_upsert_same_data_reports_nothing() {
        let connection = memory_connection().await;
        let records = vec![record("a", "A", 1, 1), record("b", "B", 2, 2)];
        upsert_videos(records.clone(), &connection).await.unwrap();
        let updates = upsert_videos(records.clone(), &connection).await.unwrap();
        assert!(updates.is_empty());
        assert_eq!(sorted_videos(&connection).await, records);
    }

    #[tokio::test]
    async fn test_duplicate_url_in_one_batch() {
        let connection = memory_connection().await;
        let updates = upsert_videos(vec![record("a", "A", 1, 1), record("a", "A", 1, 9)], &connection)
            .await
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].changes, vec![FieldChange::Likes { old: 1, new: 9 }]);
        assert_eq!(sorted_videos(&connection).await, vec![record("a", "A", 1, 9)]);
    }

    #[tokio::test]
    async fn test_clear_videos() {
        let connection = memory_connection().await;
        assert_eq!(clear_videos(&connection).await.unwrap(), 0);
        upsert_videos(vec![record("a", "A", 1, 1), record("b", "B", 2, 2)], &connection)
            .await
            .unwrap();
        assert_eq!(clear_videos(&connection).await.unwrap(), 2);
        assert!(list_videos(&connection).await.unwrap().is_empty());
    }
}
