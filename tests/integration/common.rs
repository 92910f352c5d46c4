//! Shared fixtures: a scripted browser, its session factory and configs

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use upload_tracker::browser::{
    Browser, BrowserError, BrowserResult, ElementHandle, FeedSelectors, SessionFactory,
};
use upload_tracker::config::{parse_config, Config};
use upload_tracker::queue::Target;

pub const FEED_READY: &str = "#feed";
pub const ENTRY: &str = "#feed a.entry";
pub const AUTHOR: &str = ".author";
pub const TEXT: &str = ".caption";
pub const TIME: &str = "time";
pub const NEXT: &str = "a.next";

/// Selectors understood by [`ScriptedBrowser`]
pub fn fixture_selectors() -> FeedSelectors {
    FeedSelectors {
        feed_ready: FEED_READY.to_string(),
        entry: ENTRY.to_string(),
        author: vec![AUTHOR.to_string()],
        text: TEXT.to_string(),
        published: TIME.to_string(),
        published_attr: Some("datetime".to_string()),
        next: NEXT.to_string(),
    }
}

/// One post of a scripted feed
#[derive(Debug, Clone)]
pub struct FixturePost {
    pub url: String,
    pub author: Option<String>,
    pub text: Option<String>,
    pub published: Option<String>,
}

impl FixturePost {
    pub fn new(url: &str, text: &str, days_old: i64) -> Self {
        Self {
            url: url.to_string(),
            author: Some("creator".to_string()),
            text: Some(text.to_string()),
            published: Some((Utc::now() - ChronoDuration::days(days_old)).to_rfc3339()),
        }
    }
}

/// A feed as seen through the browser
#[derive(Debug, Clone, Default)]
pub struct FixtureFeed {
    pub posts: Vec<FixturePost>,
    /// The feed page never renders
    pub never_renders: bool,
    /// Clicking "next" on this post index leaves the page unchanged
    pub stuck_at: Option<usize>,
    /// Clicking "next" on this post index fails with a navigation error
    pub broken_at: Option<usize>,
}

impl FixtureFeed {
    pub fn with_posts(posts: Vec<FixturePost>) -> Self {
        Self {
            posts,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Feed,
    Post(usize),
}

/// A browser that serves a [`FixtureFeed`] and logs every post it opens
#[derive(Debug)]
pub struct ScriptedBrowser {
    feed: FixtureFeed,
    page: Page,
    entry_url: String,
    opened: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBrowser {
    pub fn new(feed: FixtureFeed) -> Self {
        Self {
            feed,
            page: Page::Blank,
            entry_url: String::new(),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs of every post shown, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn post(&self) -> Option<&FixturePost> {
        match self.page {
            Page::Post(i) => self.feed.posts.get(i),
            _ => None,
        }
    }

    fn show(&mut self, index: usize) {
        self.page = Page::Post(index);
        self.opened
            .lock()
            .unwrap()
            .push(self.feed.posts[index].url.clone());
    }

    fn present(&self, selector: &str) -> bool {
        match (self.page, selector) {
            (Page::Feed, FEED_READY) => !self.feed.never_renders,
            (Page::Feed, ENTRY) => !self.feed.never_renders && !self.feed.posts.is_empty(),
            (Page::Post(i), NEXT) => i + 1 < self.feed.posts.len(),
            (Page::Post(_), AUTHOR) => self.post().is_some_and(|p| p.author.is_some()),
            (Page::Post(_), TEXT) => self.post().is_some_and(|p| p.text.is_some()),
            (Page::Post(_), TIME) => self.post().is_some_and(|p| p.published.is_some()),
            _ => false,
        }
    }

    fn read(&self, selector: &str) -> Option<String> {
        let post = self.post()?;
        match selector {
            AUTHOR => post.author.clone(),
            TEXT => post.text.clone(),
            TIME => post.published.clone(),
            _ => None,
        }
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn navigate_to(&mut self, url: &str) -> BrowserResult<()> {
        self.entry_url = url.to_string();
        self.page = Page::Feed;
        Ok(())
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> BrowserResult<ElementHandle> {
        if self.present(selector) {
            Ok(ElementHandle::new(selector))
        } else {
            Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn find_element(&mut self, selector: &str) -> BrowserResult<Option<ElementHandle>> {
        Ok(self.present(selector).then(|| ElementHandle::new(selector)))
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        Ok(match self.page {
            Page::Blank => "about:blank".to_string(),
            Page::Feed => self.entry_url.clone(),
            Page::Post(i) => self.feed.posts[i].url.clone(),
        })
    }

    async fn click(&mut self, element: &ElementHandle) -> BrowserResult<()> {
        if !self.present(element.selector()) {
            return Err(BrowserError::ElementNotFound(element.selector().to_string()));
        }
        match (self.page, element.selector()) {
            (Page::Feed, ENTRY) => self.show(0),
            (Page::Post(i), NEXT) if self.feed.broken_at == Some(i) => {
                return Err(BrowserError::Navigation(
                    "net::ERR_CONNECTION_RESET".to_string(),
                ));
            }
            (Page::Post(i), NEXT) if self.feed.stuck_at == Some(i) => {}
            (Page::Post(i), NEXT) => self.show(i + 1),
            _ => {}
        }
        Ok(())
    }

    async fn extract_text(&mut self, element: &ElementHandle) -> BrowserResult<String> {
        self.read(element.selector())
            .ok_or_else(|| BrowserError::ElementNotFound(element.selector().to_string()))
    }

    async fn extract_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> BrowserResult<Option<String>> {
        match (element.selector(), name) {
            (TIME, "datetime") => Ok(self.read(TIME)),
            _ => Ok(None),
        }
    }
}

/// Serves one scripted feed per target key
#[derive(Debug, Clone, Default)]
pub struct ScriptedSessions {
    feeds: HashMap<String, FixtureFeed>,
    failing: HashSet<String>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(mut self, key: &str, feed: FixtureFeed) -> Self {
        self.feeds.insert(key.to_string(), feed);
        self
    }

    /// Session setup fails for this target
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Target keys sessions were opened for, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for ScriptedSessions {
    type Session = ScriptedBrowser;

    async fn open_session(&mut self, target: &Target) -> BrowserResult<ScriptedBrowser> {
        let key = target.key();
        self.opened.lock().unwrap().push(key.clone());
        if self.failing.contains(&key) {
            return Err(BrowserError::Driver("chrome executable not found".to_string()));
        }
        let feed = self.feeds.get(&key).cloned().unwrap_or_default();
        Ok(ScriptedBrowser::new(feed))
    }
}

/// A config pointing both platforms at the fixture selectors
pub fn test_config(keyword: &str) -> Config {
    let selectors = format!(
        r##"feed-ready = "{FEED_READY}"
entry = "{ENTRY}"
author = ["{AUTHOR}"]
text = "{TEXT}"
published = "{TIME}"
published-attr = "datetime"
next = "{NEXT}""##
    );

    let content = format!(
        r##"
[queue]
spreadsheet = "1testSheet"
sheet = "Campaign"
columns = "A:M"

[search]
keyword = "{keyword}"
window-days = 7

[pacing]
enabled = false

[sync]
base-delay-ms = 1000

[browser.selectors.instagram]
{selectors}

[browser.selectors.naver-blog]
{selectors}
"##
    );

    parse_config(&content).unwrap()
}

/// Builds a 13-column queue row (A..M) from name, URL, result and status
pub fn queue_row(name: &str, url: &str, result: &str, status: &str) -> Vec<String> {
    let mut row = vec![String::new(); 13];
    row[0] = name.to_string();
    row[1] = url.to_string();
    row[2] = result.to_string();
    row[12] = status.to_string();
    row
}

pub fn header_row() -> Vec<String> {
    queue_row("Name", "URL", "Upload link", "Status")
}
