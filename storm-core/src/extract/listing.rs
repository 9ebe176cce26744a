use regex::Regex;
use std::sync::LazyLock;

/// `href` attribute of an anchor tag, in either quote style.
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*?\shref\s*=\s*["']([^"']+)["']"#).expect("valid anchor pattern")
});

/// Collects every anchor `href` ending in `kmz` from the archive results page, resolved against
/// `base`.
///
/// Links are returned in page order. Absolute links are kept as they are.
pub fn scrape_kmz_links(html: &str, base: &str) -> Vec<String> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|link| link.ends_with("kmz"))
        .map(|link| resolve(base, link))
        .collect()
}

fn resolve(base: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if base.ends_with('/') {
        format!("{base}{}", link.trim_start_matches('/'))
    } else {
        format!("{base}/{}", link.trim_start_matches('/'))
    }
}
