use crate::{UrlError, UrlResult};
use url::Url;

/// Host prefixes that do not change which source a link names
const HOST_PREFIXES: &[&str] = &["www.", "m."];

/// Parses a loosely formatted link as typed into a spreadsheet cell
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Prepend `https://` when no scheme is present
/// 3. Parse the URL; reject if malformed or not HTTP(S)
/// 4. Enforce HTTPS
/// 5. Lowercase the host and strip `www.` / `m.` prefixes
/// 6. Drop the fragment
///
/// Query strings are kept because some sources carry their id there.
///
/// # Examples
///
/// ```
/// use upload_tracker::url::parse_loose;
///
/// let url = parse_loose("M.Blog.Naver.com/writer#comments").unwrap();
/// assert_eq!(url.as_str(), "https://blog.naver.com/writer");
/// ```
pub fn parse_loose(raw: &str) -> UrlResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::Parse(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }
    if url.scheme() == "http" {
        url.set_scheme("https")
            .map_err(|_| UrlError::Parse(format!("Cannot upgrade scheme of {}", trimmed)))?;
    }

    let host = url
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::Parse(format!("Missing host in {}", trimmed)))?;
    let mut host = host.as_str();
    for prefix in HOST_PREFIXES {
        if let Some(stripped) = host.strip_prefix(prefix) {
            host = stripped;
        }
    }
    let host = host.to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    url.set_fragment(None);

    Ok(url)
}
