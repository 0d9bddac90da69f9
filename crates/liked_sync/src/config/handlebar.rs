use anyhow::Result;
use handlebars::Handlebars;

use crate::config::Config;

pub const VIDEO_URL_TEMPLATE: &str = "video_url";

pub fn create_template(config: &Config) -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    // 渲染的是 url 而不是 html，不需要转义
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(VIDEO_URL_TEMPLATE, &config.video_url_template)?;
    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_template_usage() {
        let mut config = Config::new(Path::new("/tmp/liked-sync"));
        let template = create_template(&config).unwrap();
        assert_eq!(
            template.render(VIDEO_URL_TEMPLATE, &json!({"id": "dQw4w9WgXcQ"})).unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        config.video_url_template = "https://youtu.be/{{id}}?a=1&b=2".to_owned();
        let template = create_template(&config).unwrap();
        assert_eq!(
            template.render(VIDEO_URL_TEMPLATE, &json!({"id": "abc-_123"})).unwrap(),
            "https://youtu.be/abc-_123?a=1&b=2"
        );
        assert!(template.render(VIDEO_URL_TEMPLATE, &json!({})).is_err());
    }
}
