//! 测试用的视频数据与分页数据源

use anyhow::{Result, bail};
use parking_lot::Mutex;
use serde_json::json;

use crate::youtube::{LikedPage, LikedVideoSource, VideoItem};

pub fn video_item(id: &str, title: &str, category_id: &str, views: Option<u64>, likes: Option<u64>) -> VideoItem {
    let mut statistics = json!({});
    if let Some(views) = views {
        statistics["viewCount"] = json!(views.to_string());
    }
    if let Some(likes) = likes {
        statistics["likeCount"] = json!(likes.to_string());
    }
    serde_json::from_value(json!({
        "id": id,
        "snippet": {"title": title, "categoryId": category_id},
        "statistics": statistics,
    }))
    .expect("invalid video item")
}

/// 第 n 页的 nextPageToken 为 page-{n+1}，最后一页不带 token
pub struct PagedSource {
    pages: Vec<Vec<VideoItem>>,
    fail_at: Option<usize>,
    requested: Mutex<Vec<Option<String>>>,
}

impl PagedSource {
    pub fn new(pages: Vec<Vec<VideoItem>>) -> Self {
        Self {
            pages,
            fail_at: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_at(mut self, page: usize) -> Self {
        self.fail_at = Some(page);
        self
    }

    pub fn requested_tokens(&self) -> Vec<Option<String>> {
        self.requested.lock().clone()
    }
}

impl LikedVideoSource for PagedSource {
    async fn liked_page(&self, page_token: Option<&str>) -> Result<LikedPage> {
        self.requested.lock().push(page_token.map(ToOwned::to_owned));
        let index = match page_token {
            None => 0,
            Some(token) => token.trim_start_matches("page-").parse::<usize>()?,
        };
        if self.fail_at == Some(index) {
            bail!("connection reset by peer");
        }
        let Some(items) = self.pages.get(index) else {
            bail!("unknown page token {:?}", page_token);
        };
        Ok(LikedPage {
            items: items.clone(),
            next_page_token: (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1)),
        })
    }
}
