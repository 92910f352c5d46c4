//! Per-post field extraction and publish-time parsing

use crate::browser::{Browser, FeedSelectors};
use crate::crawler::browser_failure;
use crate::{Result, TrackerError};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// One visited post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub url: String,
    pub author: String,
    /// Empty when the post has no caption or body
    pub text: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Reads the post currently shown by `browser`
///
/// Missing text is tolerated and read as empty, and a missing author falls
/// back to `fallback_author`. The publish time is required: a post without a
/// recognizable timestamp is an extraction failure.
pub async fn extract_post<B>(
    browser: &mut B,
    selectors: &FeedSelectors,
    fallback_author: &str,
    element_timeout: std::time::Duration,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<PostRecord>
where
    B: Browser + ?Sized,
{
    let url = browser.current_url().await.map_err(browser_failure)?;

    let published = browser
        .wait_for_element(&selectors.published, element_timeout)
        .await
        .map_err(browser_failure)?;
    let raw_published = match &selectors.published_attr {
        Some(attr) => browser
            .extract_attribute(&published, attr)
            .await
            .map_err(browser_failure)?
            .unwrap_or_default(),
        None => browser
            .extract_text(&published)
            .await
            .map_err(browser_failure)?,
    };
    let published_at = parse_published_at(&raw_published, now, offset).ok_or_else(|| {
        TrackerError::ExtractionFailed {
            target: url.clone(),
            message: format!("unrecognized publish time '{}'", raw_published.trim()),
        }
    })?;

    let text = match browser.find_element(&selectors.text).await {
        Ok(Some(element)) => browser.extract_text(&element).await.unwrap_or_else(|e| {
            tracing::debug!("No text on {}: {}", url, e);
            String::new()
        }),
        Ok(None) => String::new(),
        Err(e) => {
            tracing::debug!("No text on {}: {}", url, e);
            String::new()
        }
    };

    let mut author = None;
    for selector in &selectors.author {
        if let Ok(Some(element)) = browser.find_element(selector).await {
            if let Ok(name) = browser.extract_text(&element).await {
                let name = name.trim();
                if !name.is_empty() {
                    author = Some(name.to_string());
                    break;
                }
            }
        }
    }

    Ok(PostRecord {
        url,
        author: author.unwrap_or_else(|| fallback_author.to_string()),
        text,
        published_at,
    })
}

/// Parses a publish time as shown by the supported platforms
///
/// Accepted forms:
/// - RFC 3339 (`2025-05-19T10:00:00.000Z`), as in `datetime` attributes
/// - `YYYY. M. D.` with an optional `HH:MM`, read in `offset`
/// - `N분 전`, `N시간 전`, `N일 전` and `방금 전`, relative to `now`
///
/// The result is expressed in `offset`.
pub fn parse_published_at(
    raw: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&offset));
    }

    parse_dotted_date(raw, offset)
        .or_else(|| parse_relative(raw, now).map(|t| t.with_timezone(&offset)))
}

fn parse_dotted_date(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let mut parts = raw.splitn(4, '.').map(str::trim);
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = match parts.next().filter(|rest| !rest.is_empty()) {
        Some(rest) => NaiveTime::parse_from_str(rest, "%H:%M").ok()?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
}

fn parse_relative(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact == "방금전" {
        return Some(now);
    }

    let amount_end = compact
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(compact.len());
    let amount: i64 = compact[..amount_end].parse().ok()?;
    let elapsed = match &compact[amount_end..] {
        "분전" => Duration::minutes(amount),
        "시간전" => Duration::hours(amount),
        "일전" => Duration::days(amount),
        _ => return None,
    };
    Some(now - elapsed)
}
