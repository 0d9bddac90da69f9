use anyhow::{Context, Result};
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use serde::Deserialize;

use crate::youtube::VideoItem;

/// videos.list?myRating=like 的一页结果
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedPage {
    #[serde(default)]
    pub items: Vec<VideoItem>,
    pub next_page_token: Option<String>,
}

/// 按页提供喜欢的视频，page_token 为 None 时请求第一页
pub trait LikedVideoSource {
    async fn liked_page(&self, page_token: Option<&str>) -> Result<LikedPage>;
}

pub struct LikedList<'a, S> {
    source: &'a S,
}

impl<'a, S: LikedVideoSource> LikedList<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    // 拿到列表的所有权，返回喜欢的视频流，任意一页失败都会让流以错误结束
    pub fn into_item_stream(self) -> impl Stream<Item = Result<VideoItem>> + 'a {
        try_stream! {
            let mut page_token: Option<String> = None;
            let mut page = 1;
            loop {
                let liked_page = self
                    .source
                    .liked_page(page_token.as_deref())
                    .await
                    .with_context(|| format!("failed to get page {} of liked videos", page))?;
                debug!("获取到第 {} 页喜欢的视频，共 {} 个", page, liked_page.items.len());
                for item in liked_page.items {
                    yield item;
                }
                match liked_page.next_page_token {
                    Some(token) if !token.is_empty() => {
                        page_token = Some(token);
                        page += 1;
                    }
                    _ => break,
                }
            }
        }
    }
}

/// 拉取全部分页后才返回，保持接口返回的顺序
pub async fn fetch_liked_items<S: LikedVideoSource>(source: &S) -> Result<Vec<VideoItem>> {
    LikedList::new(source).into_item_stream().try_collect().await
}
