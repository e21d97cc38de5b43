//! Domain normalization shared by the source-prior lookup and the scraper.
//!
//! All helpers are total: malformed input resolves to an empty string rather
//! than an error, so a bad `source_url` degrades to the "no-source" path.

use std::collections::HashSet;
use url::Url;

/// Extract the registrable host from a URL: lowercased, one leading `www.`
/// label stripped. Returns `""` for empty input or any parse failure.
pub fn get_domain(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    match Url::parse(url) {
        Ok(u) => u
            .host_str()
            .map(|h| strip_www(&h.to_ascii_lowercase()).to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Trim, lowercase, strip one leading `www.`. Idempotent.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim().to_ascii_lowercase();
    strip_www(&d).to_string()
}

/// Exact-match membership test after normalization. The set is expected to
/// hold already-normalized entries.
pub fn is_platform_domain(domain: &str, platform_set: &HashSet<String>) -> bool {
    platform_set.contains(normalize_domain(domain).as_str())
}

fn strip_www(d: &str) -> &str {
    d.strip_prefix("www.").unwrap_or(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_domain_lowercases_and_strips_www() {
        assert_eq!(get_domain("https://WWW.Example.COM/path?q=1"), "example.com");
        assert_eq!(get_domain("http://news.example.org"), "news.example.org");
    }

    #[test]
    fn get_domain_never_errors() {
        assert_eq!(get_domain(""), "");
        assert_eq!(get_domain("   "), "");
        assert_eq!(get_domain("not a url"), "");
        assert_eq!(get_domain("ftp//broken"), "");
    }

    #[test]
    fn normalize_domain_is_idempotent() {
        let once = normalize_domain("WWW.Example.COM");
        assert_eq!(once, "example.com");
        assert_eq!(normalize_domain(&once), once);
    }

    #[test]
    fn normalize_domain_keeps_inner_www_labels() {
        // Only a leading `www.` is host boilerplate.
        assert_eq!(normalize_domain("news.www.example.com"), "news.www.example.com");
    }

    #[test]
    fn platform_membership_normalizes_first() {
        let set: HashSet<String> = ["facebook.com".to_string()].into_iter().collect();
        assert!(is_platform_domain("WWW.Facebook.com", &set));
        assert!(!is_platform_domain("example.com", &set));
    }
}
