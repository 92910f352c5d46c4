//! URL handling module for Upload-Tracker
//!
//! This module turns the loosely formatted profile and blog links found in
//! campaign sheets into canonical content-source references, and extracts
//! spreadsheet ids from pasted spreadsheet links.

mod domain;
mod normalize;
mod spreadsheet;

use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_host, platform_for_host};
pub use normalize::parse_loose;
pub use spreadsheet::spreadsheet_id_from_input;

/// Instagram path prefixes that never name a profile
const INSTAGRAM_RESERVED: &[&str] = &[
    "p", "reel", "reels", "explore", "stories", "accounts", "tv", "direct",
];

/// Naver blog pages that carry the blog id in the query string
const NAVER_LIST_PAGES: &[&str] = &["postlist.naver", "postview.naver", "postview.nhn"];

/// Content sources the crawler knows how to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// An Instagram profile feed
    Instagram,
    /// A Naver blog post list
    NaverBlog,
}

impl Platform {
    /// Returns the short name used in target keys and config tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::NaverBlog => "naver-blog",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical reference to one profile or blog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub platform: Platform,

    /// Lowercased profile handle or blog id
    pub id: String,

    /// The single canonical form of every URL shape naming this source
    pub canonical_url: Url,
}

impl SourceRef {
    /// Returns the page the pagination walk starts from
    pub fn feed_entry_url(&self) -> UrlResult<Url> {
        let raw = match self.platform {
            Platform::Instagram => format!("https://www.instagram.com/{}/", self.id),
            Platform::NaverBlog => format!(
                "https://blog.naver.com/PostList.naver?blogId={}&skinType=&skinId=&from=menu",
                self.id
            ),
        };
        Url::parse(&raw).map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Returns the deduplication key (`platform:id`)
    pub fn key(&self) -> String {
        format!("{}:{}", self.platform, self.id)
    }
}

/// Canonicalizes a raw profile or blog link from a queue row
///
/// Accepted shapes include links with or without a scheme, `http` or
/// `https`, `www.` or `m.` host prefixes, trailing query strings and
/// fragments, and Naver `PostList.naver?blogId=` style links.
///
/// # Examples
///
/// ```
/// use upload_tracker::url::{canonicalize_source, Platform};
///
/// let source = canonicalize_source("m.blog.naver.com/Some_Blog?tab=1").unwrap();
/// assert_eq!(source.platform, Platform::NaverBlog);
/// assert_eq!(source.canonical_url.as_str(), "https://blog.naver.com/some_blog");
///
/// let source = canonicalize_source("http://instagram.com/Brand.Lover/?hl=ko").unwrap();
/// assert_eq!(source.id, "brand.lover");
/// ```
pub fn canonicalize_source(raw: &str) -> UrlResult<SourceRef> {
    let url = parse_loose(raw)?;
    let host = extract_host(&url).ok_or_else(|| UrlError::Parse(raw.to_string()))?;
    let platform =
        platform_for_host(&host).ok_or_else(|| UrlError::UnsupportedSource(raw.to_string()))?;

    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .map(|s| s.to_string());

    let id = match platform {
        Platform::Instagram => first_segment
            .filter(|s| !INSTAGRAM_RESERVED.contains(&s.to_lowercase().as_str()))
            .filter(|s| is_valid_id(s, &['.', '_'])),
        Platform::NaverBlog => match first_segment {
            Some(segment) if NAVER_LIST_PAGES.contains(&segment.to_lowercase().as_str()) => url
                .query_pairs()
                .find(|(key, _)| key.eq_ignore_ascii_case("blogId"))
                .map(|(_, value)| value.into_owned()),
            other => other,
        }
        .filter(|s| is_valid_id(s, &['_', '-'])),
    }
    .map(|id| id.to_lowercase())
    .ok_or_else(|| UrlError::MissingIdentifier(raw.to_string()))?;

    let canonical = match platform {
        Platform::Instagram => format!("https://www.instagram.com/{}/", id),
        Platform::NaverBlog => format!("https://blog.naver.com/{}", id),
    };
    let canonical_url = Url::parse(&canonical).map_err(|e| UrlError::Parse(e.to_string()))?;

    Ok(SourceRef {
        platform,
        id,
        canonical_url,
    })
}

fn is_valid_id(candidate: &str, extra: &[char]) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(&c))
}
