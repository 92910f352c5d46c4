//! Chrome driver over the DevTools protocol
//!
//! `headless_chrome` is synchronous, so every call runs on the blocking pool.

use crate::browser::profile::clear_profile_cache;
use crate::browser::traits::{Browser, BrowserError, BrowserResult, ElementHandle, SessionFactory};
use crate::config::BrowserConfig;
use crate::queue::Target;
use async_trait::async_trait;
use headless_chrome::{Browser as HeadlessBrowser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Launches one Chrome instance per target
#[derive(Debug, Clone)]
pub struct ChromeSessionFactory {
    config: BrowserConfig,
}

impl ChromeSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    async fn open_session(&mut self, target: &Target) -> BrowserResult<ChromeSession> {
        tracing::debug!("Launching Chrome for {}", target.key());
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || ChromeSession::launch(&config))
            .await
            .map_err(|e| BrowserError::Driver(e.to_string()))?
    }
}

/// One Chrome instance with a single tab
pub struct ChromeSession {
    // Kept alive for the tab; dropping it kills the process
    _browser: HeadlessBrowser,
    tab: Arc<Tab>,
}

impl std::fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeSession").finish()
    }
}

impl ChromeSession {
    fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        if let Some(dir) = &config.user_data_dir {
            let removed = clear_profile_cache(dir, config.keep_login).map_err(|e| {
                BrowserError::Driver(format!(
                    "failed to clear profile {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            tracing::debug!("Cleared {} cache entries from {}", removed, dir.display());
        }

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .user_data_dir(config.user_data_dir.clone())
            .args(vec![OsStr::new("--disable-blink-features=AutomationControlled")])
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| BrowserError::Driver(e.to_string()))?;

        let browser =
            HeadlessBrowser::new(options).map_err(|e| BrowserError::Driver(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Driver(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Runs `f` against the tab on the blocking pool
    async fn with_tab<T, F>(&self, f: F) -> BrowserResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> BrowserResult<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| BrowserError::Driver(e.to_string()))?
    }
}

#[async_trait]
impl Browser for ChromeSession {
    async fn navigate_to(&mut self, url: &str) -> BrowserResult<()> {
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&url)
                .and_then(|tab| tab.wait_until_navigated())
                .map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;
            Ok(())
        })
        .await
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> BrowserResult<ElementHandle> {
        let selector = selector.to_string();
        self.with_tab(move |tab| match tab.wait_for_element_with_custom_timeout(&selector, timeout) {
            Ok(_) => Ok(ElementHandle::new(selector)),
            Err(_) => Err(BrowserError::Timeout { selector, timeout }),
        })
        .await
    }

    async fn find_element(&mut self, selector: &str) -> BrowserResult<Option<ElementHandle>> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            Ok(tab
                .find_element(&selector)
                .ok()
                .map(|_| ElementHandle::new(selector.clone())))
        })
        .await
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        self.with_tab(|tab| Ok(tab.get_url())).await
    }

    async fn click(&mut self, element: &ElementHandle) -> BrowserResult<()> {
        let selector = element.selector().to_string();
        self.with_tab(move |tab| {
            let node = tab
                .find_element(&selector)
                .map_err(|_| BrowserError::ElementNotFound(selector.clone()))?;
            node.click()
                .map_err(|e| BrowserError::Driver(format!("click on {}: {}", selector, e)))?;
            Ok(())
        })
        .await
    }

    async fn extract_text(&mut self, element: &ElementHandle) -> BrowserResult<String> {
        let selector = element.selector().to_string();
        self.with_tab(move |tab| {
            let node = tab
                .find_element(&selector)
                .map_err(|_| BrowserError::ElementNotFound(selector.clone()))?;
            node.get_inner_text()
                .map_err(|e| BrowserError::Driver(e.to_string()))
        })
        .await
    }

    async fn extract_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> BrowserResult<Option<String>> {
        let selector = element.selector().to_string();
        let name = name.to_string();
        self.with_tab(move |tab| {
            let node = tab
                .find_element(&selector)
                .map_err(|_| BrowserError::ElementNotFound(selector.clone()))?;
            node.get_attribute_value(&name)
                .map_err(|e| BrowserError::Driver(e.to_string()))
        })
        .await
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.with_tab(|tab| {
            tab.close(true)
                .map_err(|e| BrowserError::Driver(e.to_string()))?;
            Ok(())
        })
        .await
    }
}
