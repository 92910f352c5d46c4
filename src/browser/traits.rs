use crate::queue::Target;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser driver
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Timed out after {}s waiting for {selector}", timeout.as_secs())]
    Timeout { selector: String, timeout: Duration },

    #[error("No element matches {0}")]
    ElementNotFound(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Unsupported by this driver: {0}")]
    Unsupported(String),
}

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// A located element
///
/// Drivers re-resolve the selector when the handle is used, so a handle
/// never outlives the page it was found on in a harmful way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    selector: String,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// The page-level operations a feed walk needs
#[async_trait]
pub trait Browser: Send {
    /// Loads `url` and waits until the navigation settles
    async fn navigate_to(&mut self, url: &str) -> BrowserResult<()>;

    /// Waits up to `timeout` for `selector` to appear
    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> BrowserResult<ElementHandle>;

    /// Looks for `selector` once, without waiting
    async fn find_element(&mut self, selector: &str) -> BrowserResult<Option<ElementHandle>>;

    async fn current_url(&mut self) -> BrowserResult<String>;

    async fn click(&mut self, element: &ElementHandle) -> BrowserResult<()>;

    async fn extract_text(&mut self, element: &ElementHandle) -> BrowserResult<String>;

    async fn extract_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> BrowserResult<Option<String>>;

    /// Releases the session
    async fn close(&mut self) -> BrowserResult<()> {
        Ok(())
    }
}

/// Opens one fresh browser session per target
#[async_trait]
pub trait SessionFactory: Send {
    type Session: Browser;

    async fn open_session(&mut self, target: &Target) -> BrowserResult<Self::Session>;
}
