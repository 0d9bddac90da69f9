pub(super) fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/youtube.force-ssl".to_owned()]
}

/// YouTube 中音乐分类的 categoryId
pub(super) fn default_excluded_category_id() -> String {
    "10".to_owned()
}

pub(super) fn default_video_url_template() -> String {
    "https://www.youtube.com/watch?v={{id}}".to_owned()
}

pub(super) fn default_page_size() -> u32 {
    50
}

pub(super) fn default_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_owned()
}
