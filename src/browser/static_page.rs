//! HTML-only driver
//!
//! Fetches pages with `reqwest` and queries them with `scraper`. There is no
//! script execution: `click` follows the `href` of the element or its nearest
//! linked ancestor. Useful for server-rendered feeds and for testing walks
//! against a mock HTTP server.

use crate::browser::traits::{Browser, BrowserError, BrowserResult, ElementHandle, SessionFactory};
use crate::queue::Target;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Hands out sessions sharing one HTTP client
#[derive(Debug, Clone)]
pub struct StaticSessionFactory {
    client: Client,
}

impl StaticSessionFactory {
    pub fn new() -> BrowserResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("upload-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| BrowserError::Driver(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SessionFactory for StaticSessionFactory {
    type Session = StaticSession;

    async fn open_session(&mut self, _target: &Target) -> BrowserResult<StaticSession> {
        Ok(StaticSession::new(self.client.clone()))
    }
}

/// One page at a time, held as raw HTML
#[derive(Debug)]
pub struct StaticSession {
    client: Client,
    current: Option<Url>,
    // Raw text; `Html` is not `Send` and is re-parsed per query
    body: String,
}

impl StaticSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
            body: String::new(),
        }
    }

    async fn load(&mut self, url: Url) -> BrowserResult<()> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Navigation(format!(
                "{} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;

        self.current = Some(final_url);
        self.body = body;
        Ok(())
    }

    /// Applies `f` to the first element matching `selector`, if any
    fn with_element<T>(
        &self,
        selector: &str,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> BrowserResult<Option<T>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| BrowserError::Driver(format!("invalid selector {}: {:?}", selector, e)))?;
        let html = Html::parse_document(&self.body);
        let result = html.select(&parsed).next().map(f);
        Ok(result)
    }

    fn require<T>(&self, element: &ElementHandle, f: impl FnOnce(ElementRef<'_>) -> T) -> BrowserResult<T> {
        self.with_element(element.selector(), f)?
            .ok_or_else(|| BrowserError::ElementNotFound(element.selector().to_string()))
    }
}

/// Returns the `href` of the element or of its nearest ancestor carrying one
fn link_target(element: ElementRef<'_>) -> Option<String> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find_map(|e| e.value().attr("href").map(str::to_string))
}

#[async_trait]
impl Browser for StaticSession {
    async fn navigate_to(&mut self, url: &str) -> BrowserResult<()> {
        let url = Url::parse(url).map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;
        self.load(url).await
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> BrowserResult<ElementHandle> {
        // Nothing renders later on a static page
        match self.with_element(selector, |_| ())? {
            Some(()) => Ok(ElementHandle::new(selector)),
            None => Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    async fn find_element(&mut self, selector: &str) -> BrowserResult<Option<ElementHandle>> {
        Ok(self
            .with_element(selector, |_| ())?
            .map(|()| ElementHandle::new(selector)))
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        self.current
            .as_ref()
            .map(|u| u.to_string())
            .ok_or_else(|| BrowserError::Navigation("no page loaded".to_string()))
    }

    async fn click(&mut self, element: &ElementHandle) -> BrowserResult<()> {
        let href = self.require(element, link_target)?.ok_or_else(|| {
            BrowserError::Unsupported(format!("{} is not a link", element.selector()))
        })?;

        let base = self
            .current
            .clone()
            .ok_or_else(|| BrowserError::Navigation("no page loaded".to_string()))?;
        let next = base
            .join(&href)
            .map_err(|e| BrowserError::Navigation(format!("{}: {}", href, e)))?;
        self.load(next).await
    }

    async fn extract_text(&mut self, element: &ElementHandle) -> BrowserResult<String> {
        self.require(element, |e| e.text().collect::<String>().trim().to_string())
    }

    async fn extract_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> BrowserResult<Option<String>> {
        self.require(element, |e| e.value().attr(name).map(str::to_string))
    }
}
