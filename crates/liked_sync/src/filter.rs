use anyhow::Result;
use handlebars::Handlebars;
use liked_sync_entity::video;
use serde_json::json;

use crate::config::{Config, VIDEO_URL_TEMPLATE, create_template};
use crate::youtube::{VideoItem, YouTubeError};

#[derive(Debug, PartialEq, Eq)]
pub enum Classified {
    Include(video::Model),
    Exclude { title: String, url: String },
}

/// 将接口返回的视频转换为数据库记录，同时剔除指定分类（默认为音乐）的视频
pub struct CategoryFilter {
    excluded_category_id: String,
    template: Handlebars<'static>,
}

impl CategoryFilter {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            excluded_category_id: config.excluded_category_id.clone(),
            template: create_template(config)?,
        })
    }

    pub fn classify(&self, item: VideoItem) -> Result<Classified> {
        let url = self.template.render(VIDEO_URL_TEMPLATE, &json!({ "id": item.id }))?;
        let views = parse_count("viewCount", item.statistics.view_count.as_deref())?
            .ok_or_else(|| YouTubeError::MissingField("statistics.viewCount", item.id.clone()))?;
        let likes = parse_count("likeCount", item.statistics.like_count.as_deref())?.unwrap_or(0);
        let title = item.snippet.title;
        if item.snippet.category_id == self.excluded_category_id {
            info!("排除音乐视频：{} ({})", title, url);
            return Ok(Classified::Exclude { title, url });
        }
        Ok(Classified::Include(video::Model {
            title,
            url,
            views,
            likes,
        }))
    }

    /// 依次分类所有视频，返回保留下来的记录与被排除的数量
    pub fn filter_items(&self, items: Vec<VideoItem>) -> Result<(Vec<video::Model>, usize)> {
        let mut records = Vec::with_capacity(items.len());
        let mut excluded = 0;
        for item in items {
            match self.classify(item)? {
                Classified::Include(record) => records.push(record),
                Classified::Exclude { .. } => excluded += 1,
            }
        }
        Ok((records, excluded))
    }
}

fn parse_count(field: &'static str, value: Option<&str>) -> Result<Option<i64>, YouTubeError> {
    value
        .map(|v| {
            v.parse::<u64>()
                .ok()
                .and_then(|v| i64::try_from(v).ok())
                .ok_or_else(|| YouTubeError::InvalidCount(field, v.to_owned()))
        })
        .transpose()
}
