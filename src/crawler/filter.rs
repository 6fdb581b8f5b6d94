//! URL filtering: skip rules and same-domain scoping
//!
//! Everything here is a pure predicate over URL strings so the crawler's
//! scoping decisions can be tested without a network.

use std::borrow::Cow;

use url::Url;
use url::form_urlencoded;

/// Substrings that mark a URL as not worth fetching: documents, images and
/// the boilerplate sections of a corporate site.
const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    "pdf",
    ".jpg",
    ".png",
    "/news/",
    "/careers/",
    "/career/",
    "/jobs/",
    "/job/",
    "contact",
    "search",
    "privacy",
    "terms",
    "cookie",
    "location",
    "locations",
];

/// The default skip patterns as owned strings
pub fn default_skip_patterns() -> Vec<String> {
    DEFAULT_SKIP_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Filter settings for one crawl. Built once from the seed and never mutated.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Lower-cased skip patterns
    skip_patterns: Vec<String>,

    /// Links must contain this substring to be followed
    pub match_pattern: Option<String>,

    /// Links containing this substring are never followed
    pub exclude_pattern: Option<String>,

    /// The seed URL, source of the base domain
    pub base_url: Url,
}

impl FilterConfig {
    /// Create a filter scoped to `base_url`
    pub fn new(
        base_url: Url,
        skip_patterns: &[String],
        match_pattern: Option<String>,
        exclude_pattern: Option<String>,
    ) -> Self {
        Self {
            skip_patterns: skip_patterns.iter().map(|p| p.to_lowercase()).collect(),
            match_pattern,
            exclude_pattern,
            base_url,
        }
    }

    /// The host (and explicit port) every crawled URL must share
    pub fn base_domain(&self) -> String {
        netloc(&self.base_url)
    }

    /// Whether the URL should never be fetched
    pub fn should_skip(&self, url: &str) -> bool {
        should_skip(url, &self.skip_patterns)
    }

    /// Whether a discovered link belongs to this crawl
    pub fn in_scope(&self, link: &str) -> bool {
        let Ok(parsed) = Url::parse(link) else {
            return false;
        };
        if !is_same_host(&parsed, &self.base_url) {
            return false;
        }
        if self.match_pattern.is_none() && self.exclude_pattern.is_none() {
            return true;
        }
        should_crawl(
            link,
            &self.base_url,
            self.match_pattern.as_deref(),
            self.exclude_pattern.as_deref(),
        )
    }
}

/// Decide whether a URL should be skipped. Rules apply in order:
///
/// 1. a skip pattern occurs in the URL (case-insensitive)
/// 2. the text after the last `#` is non-empty and has no `/` (in-page anchor)
/// 3. the query string has a non-empty `page` parameter (pagination)
pub fn should_skip(url: &str, skip_patterns: &[String]) -> bool {
    let lowered = url.to_lowercase();
    if skip_patterns
        .iter()
        .any(|pattern| lowered.contains(&pattern.to_lowercase()))
    {
        return true;
    }

    if let Some((_, fragment)) = url.rsplit_once('#') {
        if !fragment.is_empty() && !fragment.contains('/') {
            return true;
        }
    }

    has_page_param(url)
}

/// A `page` query parameter with a non-empty value. Text after `#` is
/// fragment, never query.
fn has_page_param(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.query_pairs().any(is_page_pair),
        Err(_) => {
            let without_fragment = url.split('#').next().unwrap_or_default();
            without_fragment
                .split_once('?')
                .is_some_and(|(_, query)| form_urlencoded::parse(query.as_bytes()).any(is_page_pair))
        }
    }
}

fn is_page_pair((key, value): (Cow<'_, str>, Cow<'_, str>)) -> bool {
    key == "page" && !value.is_empty()
}

/// Decide whether a link may be crawled under include/exclude patterns.
///
/// Rejects URLs whose scheme and host differ from `base_url`, URLs
/// containing `exclude_pattern`, and URLs missing `match_pattern`.
pub fn should_crawl(
    url: &str,
    base_url: &Url,
    match_pattern: Option<&str>,
    exclude_pattern: Option<&str>,
) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if parsed.scheme() != base_url.scheme() || !is_same_host(&parsed, base_url) {
        return false;
    }

    if let Some(exclude) = exclude_pattern {
        if url.contains(exclude) {
            return false;
        }
    }

    match match_pattern {
        Some(pattern) => url.contains(pattern),
        None => true,
    }
}

/// Host and explicit port equality
pub fn is_same_host(url: &Url, base: &Url) -> bool {
    url.host_str().is_some() && netloc(url) == netloc(base)
}

fn netloc(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host.to_lowercase(), port),
        (Some(host), None) => host.to_lowercase(),
        (None, _) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip(url: &str) -> bool {
        should_skip(url, &default_skip_patterns())
    }

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_skip_patterns_case_insensitive() {
        assert!(skip("https://example.com/Contact/"));
        assert!(skip("https://example.com/files/report.PDF"));
        assert!(skip("https://example.com/img/logo.png"));
        assert!(skip("https://example.com/news/2024/launch"));
        assert!(skip("https://example.com/Careers/"));
        assert!(skip("https://example.com/privacy-policy"));
        assert!(skip("https://example.com/our-locations"));
        assert!(!skip("https://example.com/services/analytics"));
    }

    #[test]
    fn test_skip_in_page_anchor() {
        assert!(skip("https://example.com/about#team"));
        assert!(!skip("https://example.com/about#"));
        assert!(!skip("https://example.com/app#/route/inner"));
        assert!(!skip("https://example.com/about"));
    }

    #[test]
    fn test_skip_pagination() {
        assert!(skip("https://example.com/blog?page=2"));
        assert!(skip("https://example.com/blog?sort=asc&page=3"));
        assert!(!skip("https://example.com/blog?pages=3"));
        assert!(!skip("https://example.com/blog?sort=asc"));
        assert!(!skip("https://example.com/blog?page="));
        assert!(!skip("https://example.com/app#/route?page=2"));
        assert!(skip("/blog?page=4#top-of-list/"));
    }

    #[test]
    fn test_custom_skip_patterns() {
        let patterns = vec!["/Legal/".to_string()];
        assert!(should_skip("https://example.com/legal/notice", &patterns));
        assert!(!should_skip("https://example.com/contact", &patterns));
    }

    #[test]
    fn test_should_crawl_rejects_other_hosts() {
        assert!(!should_crawl("https://other.com/services", &base(), None, None));
        assert!(!should_crawl(
            "https://sub.example.com/services",
            &base(),
            Some("services"),
            None
        ));
        assert!(!should_crawl("http://example.com/services", &base(), None, None));
        assert!(!should_crawl("not a url", &base(), None, None));
    }

    #[test]
    fn test_should_crawl_patterns() {
        let url = "https://example.com/services/clinical";
        assert!(should_crawl(url, &base(), Some("/services"), None));
        assert!(!should_crawl(url, &base(), Some("/products"), None));
        assert!(!should_crawl(url, &base(), Some("/services"), Some("clinical")));
        assert!(should_crawl(url, &base(), None, Some("/blog")));
    }

    #[test]
    fn test_is_same_host() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert!(is_same_host(&url("http://EXAMPLE.com/x"), &base()));
        assert!(is_same_host(&url("https://example.com:443/x"), &base()));
        assert!(!is_same_host(&url("https://example.com:8080/x"), &base()));
        assert!(!is_same_host(&url("https://www.example.com/"), &base()));
    }

    #[test]
    fn test_filter_config_scope() {
        let filter = FilterConfig::new(base(), &default_skip_patterns(), None, None);
        assert_eq!(filter.base_domain(), "example.com");
        assert!(filter.in_scope("https://example.com/a"));
        assert!(filter.in_scope("http://example.com/a"));
        assert!(!filter.in_scope("https://example.com:8443/a"));
        assert!(!filter.in_scope("https://elsewhere.org/a"));
        assert!(!filter.in_scope("mailto:someone@example.com"));

        let scoped = FilterConfig::new(
            base(),
            &default_skip_patterns(),
            Some("/services".to_string()),
            None,
        );
        assert!(scoped.in_scope("https://example.com/services/x"));
        assert!(!scoped.in_scope("https://example.com/about"));
    }
}
