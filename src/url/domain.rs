use crate::url::Platform;
use url::Url;

/// Host suffixes of every supported content source
///
/// A host matches an entry when it equals the suffix or is a subdomain of it.
const SOURCE_HOSTS: &[(&str, Platform)] = &[
    ("instagram.com", Platform::Instagram),
    ("blog.naver.com", Platform::NaverBlog),
];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use upload_tracker::url::extract_host;
///
/// let url = Url::parse("https://Blog.Naver.com/writer").unwrap();
/// assert_eq!(extract_host(&url), Some("blog.naver.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Classifies a host as one of the supported content sources
///
/// Returns `None` for every other host, including look-alikes such as
/// `notinstagram.com`.
pub fn platform_for_host(host: &str) -> Option<Platform> {
    SOURCE_HOSTS
        .iter()
        .find(|(suffix, _)| host == *suffix || host.ends_with(&format!(".{}", suffix)))
        .map(|(_, platform)| *platform)
}
