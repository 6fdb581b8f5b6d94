//! Content extraction functionality for the crawler module
//!
//! Turns raw page markup into the visible text worth summarizing, and pulls
//! out the title and outbound links. Parsing goes through html5ever via
//! `scraper`, which recovers from malformed markup instead of failing.

use std::collections::HashSet;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;
use url::Url;

use crate::crawler::error::ParseError;

/// Elements whose whole subtree is dropped
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "footer", "header", "nav", "aside", "img", "image", "link", "noscript",
    "meta", "source", "video",
];

/// Class or id fragments that mark page chrome rather than content
const NOISE_PATTERNS: &[&str] = &[
    "sidebar",
    "menu",
    "advertisement",
    "ad-",
    "banner",
    "widget",
    "popup",
    "modal",
    "cookie",
    "social",
    "navbar",
    "footer",
    "header",
];

/// Extract the visible text of a page
///
/// Subtrees rooted at excluded tags, or at elements whose class or id
/// contains a noise pattern, are removed. Remaining text nodes are trimmed,
/// empty ones dropped, and the rest joined with newlines.
///
/// # Arguments
///
/// * `html` - The raw page markup
///
/// # Returns
///
/// The cleaned text
pub fn clean_content(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    collect_text(document.tree.root(), &mut blocks);
    blocks.join("\n")
}

/// Extract the visible text of the elements matching a CSS selector
///
/// An invalid selector is reported and the whole document is used instead.
pub fn clean_content_with_selector(html: &str, selector: &str) -> String {
    let parsed = match parse_selector(selector) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("{}; extracting whole document", e);
            return clean_content(html);
        }
    };

    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    for element in document.select(&parsed) {
        collect_text(*element, &mut blocks);
    }
    blocks.join("\n")
}

/// Extract the page title, if it has a non-empty one
pub fn extract_title(html: &str) -> Result<Option<String>, ParseError> {
    let document = Html::parse_document(html);
    let title_selector = parse_selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty()))
}

/// Extract every `a[href]` target as an absolute http(s) URL
///
/// Links are resolved against `page_url`, kept in document order, and
/// deduplicated. Fragments are preserved so the URL filter can see anchors.
pub fn extract_links(html: &str, page_url: &Url) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let anchor_selector = parse_selector("a[href]")?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(absolute) = page_url.join(href.trim()) else {
            continue;
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }
        let absolute = absolute.to_string();
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }
    Ok(links)
}

fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Depth-first walk in document order. Iterative so that deeply nested
/// markup cannot exhaust the stack.
fn collect_text(root: NodeRef<'_, Node>, blocks: &mut Vec<String>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    blocks.push(trimmed.to_string());
                }
                continue;
            }
            Node::Element(_) => {
                if ElementRef::wrap(node).is_some_and(is_noise) {
                    continue;
                }
            }
            Node::Document | Node::Fragment => {}
            _ => continue,
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }
}

fn is_noise(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if EXCLUDED_TAGS.contains(&value.name()) {
        return true;
    }

    let id = value.attr("id").map(str::to_lowercase);
    let classes: Vec<String> = value.classes().map(str::to_lowercase).collect();
    NOISE_PATTERNS.iter().any(|pattern| {
        id.as_deref().is_some_and(|id| id.contains(pattern))
            || classes.iter().any(|class| class.contains(pattern))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_text_removed() {
        let html = "<html><body><script>ignored</script><p>Hello world. Hello again.</p></body></html>";
        let text = clean_content(html);
        assert_eq!(text, "Hello world. Hello again.");
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn test_excluded_tags_removed() {
        let html = r#"
            <html><head><style>.x { color: red }</style></head><body>
              <header>Site header</header>
              <nav><a href="/">Home</a></nav>
              <main>
                <h1>Clinical services</h1>
                <p>We run  trials.</p>
                <noscript>Enable JS</noscript>
                <video>Video fallback</video>
              </main>
              <aside>Related</aside>
              <footer>Copyright</footer>
            </body></html>
        "#;
        let text = clean_content(html);
        assert_eq!(text, "Clinical services\nWe run  trials.");
    }

    #[test]
    fn test_noise_classes_and_ids_removed() {
        let html = r#"
            <body>
              <div class="Main-Sidebar">Sidebar links</div>
              <div id="cookie-consent">Accept cookies</div>
              <div class="content ad-slot">Buy now</div>
              <div class="SOCIAL-share">Share</div>
              <div class="content"><p>Real content</p></div>
            </body>
        "#;
        assert_eq!(clean_content(html), "Real content");
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let html = "<div><p>Unclosed paragraph<div>Nested <b>bold</p></span>tail";
        let text = clean_content(html);
        assert!(text.contains("Unclosed paragraph"));
        assert!(text.contains("bold"));
        assert!(text.contains("tail"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_content(""), "");
    }

    #[test]
    fn test_content_selector() {
        let html = r#"<body><p>Outside</p><article><p>Inside</p><script>x</script></article></body>"#;
        assert_eq!(clean_content_with_selector(html, "article"), "Inside");
        // invalid selector degrades to the whole document
        assert_eq!(clean_content_with_selector(html, "[[["), "Outside\nInside");
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title> About Us </title></head><body></body></html>";
        assert_eq!(extract_title(html).unwrap().as_deref(), Some("About Us"));
        assert_eq!(extract_title("<p>no title</p>").unwrap(), None);
    }

    #[test]
    fn test_extract_links() {
        let page = Url::parse("https://example.com/about/").unwrap();
        let html = r##"
            <a href="/services">Services</a>
            <a href="team">Team</a>
            <a href="https://other.com/x">Other</a>
            <a href="#history">History</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="/services">Services again</a>
            <a>No href</a>
        "##;
        let links = extract_links(html, &page).unwrap();
        assert_eq!(
            links,
            vec![
                "https://example.com/services",
                "https://example.com/about/team",
                "https://other.com/x",
                "https://example.com/about/#history",
            ]
        );
    }
}
