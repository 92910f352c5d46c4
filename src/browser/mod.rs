//! Browser automation module
//!
//! The crawler is written against the `Browser` and `SessionFactory` traits
//! and never against a concrete driver. This module provides:
//! - The traits and the element handle passed between calls
//! - Per-platform selector profiles with config overrides
//! - Chrome profile cache clearing between targets
//! - A Chrome driver (DevTools protocol) and a static HTML driver

mod chrome;
mod profile;
mod selectors;
mod static_page;
mod traits;

pub use chrome::{ChromeSession, ChromeSessionFactory};
pub use profile::clear_profile_cache;
pub use selectors::FeedSelectors;
pub use static_page::{StaticSession, StaticSessionFactory};
pub use traits::{Browser, BrowserError, BrowserResult, ElementHandle, SessionFactory};
