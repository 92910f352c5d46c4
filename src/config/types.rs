use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Upload-Tracker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub queue: QueueConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default, rename = "sheets-api")]
    pub sheets_api: SheetsApiConfig,
}

/// Location and column layout of the work queue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueConfig {
    /// Spreadsheet id, or a full spreadsheet link
    pub spreadsheet: String,

    /// Sheet (tab) name
    pub sheet: String,

    /// Column span read on every queue load
    #[serde(default = "default_columns")]
    pub columns: String,

    /// Number of header rows to skip
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,

    /// Column holding the profile or blog link
    #[serde(default = "default_url_column")]
    pub url_column: String,

    /// Column receiving the first matching post link
    #[serde(default = "default_result_column")]
    pub result_column: String,

    /// Column receiving the date stamp, no-match marker or error annotation
    #[serde(default = "default_status_column")]
    pub status_column: String,

    /// Column holding a human-readable name for log lines
    #[serde(default = "default_name_column")]
    pub name_column: String,
}

/// What to look for and how far back
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Comma-separated terms; every term must appear in a post
    pub keyword: String,

    /// Recency window in days
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Maximum posts visited per target
    #[serde(default = "default_post_cap")]
    pub post_cap: u32,

    /// Leading posts inspected regardless of age (pinned posts)
    #[serde(default = "default_pinned_posts")]
    pub pinned_posts: u32,
}

/// Randomized delays between navigations and rest breaks between targets
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PacingConfig {
    pub enabled: bool,
    pub delay_mean_ms: u64,
    pub delay_stdev_ms: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub break_every_min: u32,
    pub break_every_max: u32,
    pub break_min_secs: u64,
    pub break_max_secs: u64,
    pub countdown_interval_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_mean_ms: 2_500,
            delay_stdev_ms: 2_000,
            delay_min_ms: 500,
            delay_max_ms: 20_000,
            break_every_min: 15,
            break_every_max: 25,
            break_min_secs: 60,
            break_max_secs: 720,
            countdown_interval_secs: 30,
        }
    }
}

/// Write-back retry policy and annotation format
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SyncConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: f64,

    /// UTC offset used for date stamps and error annotations
    pub annotation_utc_offset_hours: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            multiplier: 2.0,
            annotation_utc_offset_hours: 9,
        }
    }
}

impl SyncConfig {
    /// Returns the annotation zone, falling back to UTC when out of range
    pub fn annotation_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.annotation_utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

/// Which browser automation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// A real Chrome instance driven over the DevTools protocol
    #[default]
    Chrome,
    /// Plain HTTP fetches with server-rendered HTML only
    Static,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BrowserConfig {
    pub driver: DriverKind,
    pub headless: bool,

    /// Chrome profile directory holding the logged-in session
    pub user_data_dir: Option<PathBuf>,

    /// Keep cookies and saved logins when clearing the profile between targets
    pub keep_login: bool,

    /// Wait bound for element queries on a loaded post
    pub element_timeout_secs: u64,

    /// Wait bound for the feed entry point to render
    pub entry_timeout_secs: u64,

    /// Per-platform selector overrides
    pub selectors: SelectorOverrides,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Chrome,
            headless: false,
            user_data_dir: None,
            keep_login: true,
            element_timeout_secs: 10,
            entry_timeout_secs: 30,
            selectors: SelectorOverrides::default(),
        }
    }
}

impl BrowserConfig {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }
}

/// Selector overrides keyed by platform
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorOverrides {
    pub instagram: SelectorOverride,
    pub naver_blog: SelectorOverride,
}

/// Replaces individual selectors of a platform's built-in profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorOverride {
    pub feed_ready: Option<String>,
    pub entry: Option<String>,
    pub author: Option<Vec<String>>,
    pub text: Option<String>,
    pub published: Option<String>,
    pub published_attr: Option<String>,
    pub next: Option<String>,
}

/// Sheets REST API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SheetsApiConfig {
    pub base_url: String,

    /// Environment variable holding the OAuth access token
    pub access_token_env: String,
}

impl Default for SheetsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com/v4".to_string(),
            access_token_env: "SHEETS_ACCESS_TOKEN".to_string(),
        }
    }
}

fn default_columns() -> String {
    "A:M".to_string()
}

fn default_header_rows() -> u32 {
    1
}

fn default_url_column() -> String {
    "B".to_string()
}

fn default_result_column() -> String {
    "C".to_string()
}

fn default_status_column() -> String {
    "M".to_string()
}

fn default_name_column() -> String {
    "A".to_string()
}

fn default_window_days() -> u32 {
    63
}

fn default_post_cap() -> u32 {
    120
}

fn default_pinned_posts() -> u32 {
    3
}
