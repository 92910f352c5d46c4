//! CSS selector profiles for each supported platform

use crate::config::{SelectorOverride, SelectorOverrides};
use crate::url::Platform;

/// Where to find each piece of a feed and its posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSelectors {
    /// Present once the feed entry page has rendered
    pub feed_ready: String,

    /// Clicked to open the first post
    pub entry: String,

    /// Tried in order; the first one yielding text wins
    pub author: Vec<String>,

    pub text: String,

    pub published: String,

    /// Attribute holding the timestamp; element text is used when `None`
    pub published_attr: Option<String>,

    /// Advances to the next post
    pub next: String,
}

impl FeedSelectors {
    pub fn instagram() -> Self {
        Self {
            feed_ready: "div._aagv".to_string(),
            entry: "div._aagv".to_string(),
            author: vec![
                "a[role='link'][tabindex='0']".to_string(),
                "header a[role='link']".to_string(),
                "div._a9zr a[role='link']".to_string(),
                "div._a9zr h2._a9zc".to_string(),
            ],
            text: "h1._ap3a._aaco._aacu._aacx._aad7._aade".to_string(),
            published: "time._a9ze._a9zf".to_string(),
            published_attr: Some("datetime".to_string()),
            // The chevron icon; its click bubbles to the surrounding button
            next: "span[style*='rotate(90deg)']".to_string(),
        }
    }

    pub fn naver_blog() -> Self {
        Self {
            feed_ready: "table.blog2_list".to_string(),
            entry: "table.blog2_list td.title a".to_string(),
            author: vec!["span.nick".to_string(), "strong.ell".to_string()],
            text: "div.se-main-container".to_string(),
            published: "span.se_publishDate".to_string(),
            published_attr: None,
            next: "a.btn_next".to_string(),
        }
    }

    /// Returns the built-in profile for `platform` with overrides applied
    pub fn for_platform(platform: Platform, overrides: &SelectorOverrides) -> Self {
        match platform {
            Platform::Instagram => Self::instagram().with_override(&overrides.instagram),
            Platform::NaverBlog => Self::naver_blog().with_override(&overrides.naver_blog),
        }
    }

    pub fn with_override(mut self, o: &SelectorOverride) -> Self {
        if let Some(v) = &o.feed_ready {
            self.feed_ready = v.clone();
        }
        if let Some(v) = &o.entry {
            self.entry = v.clone();
        }
        if let Some(v) = &o.author {
            self.author = v.clone();
        }
        if let Some(v) = &o.text {
            self.text = v.clone();
        }
        if let Some(v) = &o.published {
            self.published = v.clone();
        }
        if let Some(v) = &o.published_attr {
            // An empty attribute name means "read the element text"
            self.published_attr = Some(v.clone()).filter(|v| !v.is_empty());
        }
        if let Some(v) = &o.next {
            self.next = v.clone();
        }
        self
    }
}
