//! Link eligibility for prefetching.
//!
//! Only same-origin navigations are worth prefetching. Everything else
//! (fragments, `mailto:`, `tel:`, `javascript:`, other origins) is ignored.
//! Hrefs are resolved with WHATWG URL rules, so the answer matches what the
//! browser would navigate to.

use url::{Position, Url};

use crate::utils::dom;

/// The page a link lives on, used to resolve relative hrefs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// `scheme://host[:port]`, no trailing slash.
    pub origin: String,
    /// Current path, starting with `/`.
    pub path: String,
}

impl PageLocation {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            path: path.into(),
        }
    }

    /// Location of the current document.
    pub fn current() -> Self {
        Self::new(dom::origin(), dom::pathname())
    }

    /// Absolute URL of the page, `None` if the origin is not a valid URL.
    fn base(&self) -> Option<Url> {
        let path = if self.path.starts_with('/') {
            self.path.as_str()
        } else {
            "/"
        };
        Url::parse(&format!("{}{}", self.origin, path)).ok()
    }
}

/// Reduce an href to `path + search + hash` if it is eligible for prefetch.
///
/// Returns `None` for empty, fragment-only, non-http schemes and
/// cross-origin URLs. Relative hrefs resolve against `location.path`.
pub fn normalise_href(href: &str, location: &PageLocation) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base = location.base()?;
    let target = base.join(href).ok()?;

    // mailto:, tel:, javascript: and data: have opaque origins
    if target.origin() != base.origin() {
        return None;
    }

    Some(target[Position::BeforePath..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> PageLocation {
        PageLocation::new("https://folio.test", "/blog/hello")
    }

    #[test]
    fn test_ineligible_hrefs() {
        for href in [
            "",
            "   ",
            "#frag",
            "mailto:a@b.com",
            "MAILTO:a@b.com",
            "tel:123",
            "javascript:x",
            "data:text/plain,hi",
            "https://other-origin.com/x",
            "http://folio.test/about",
            "//other-origin.com/x",
        ] {
            assert_eq!(normalise_href(href, &here()), None, "href: {:?}", href);
        }
    }

    #[test]
    fn test_absolute_same_origin() {
        assert_eq!(
            normalise_href("https://folio.test/about?x=1#y", &here()),
            Some("/about?x=1#y".to_string())
        );
        assert_eq!(
            normalise_href("HTTPS://FOLIO.TEST", &here()),
            Some("/".to_string())
        );
        assert_eq!(
            normalise_href("https://folio.test?q=1", &here()),
            Some("/?q=1".to_string())
        );
        assert_eq!(
            normalise_href("//folio.test/contact", &here()),
            Some("/contact".to_string())
        );
    }

    #[test]
    fn test_default_port_is_same_origin() {
        let root = PageLocation::new("https://folio.test", "/");
        assert_eq!(
            normalise_href("https://folio.test:443/about", &root),
            Some("/about".to_string())
        );
        assert_eq!(normalise_href("https://folio.test:8443/about", &root), None);
    }

    #[test]
    fn test_backslash_authority_is_cross_origin() {
        let root = PageLocation::new("https://folio.test", "/");
        assert_eq!(normalise_href("/\\other.com/x", &root), None);
        assert_eq!(normalise_href("\\\\other.com/x", &root), None);
        assert_eq!(
            normalise_href("/\\folio.test/about", &root),
            Some("/about".to_string())
        );
    }

    #[test]
    fn test_tab_and_newline_inside_scheme() {
        let root = PageLocation::new("https://folio.test", "/");
        assert_eq!(normalise_href("java\tscript:x", &root), None);
        assert_eq!(normalise_href("java\nscript:alert(1)", &root), None);
        assert_eq!(
            normalise_href("/ab\tout", &root),
            Some("/about".to_string())
        );
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(normalise_href("/about", &here()), Some("/about".to_string()));
        assert_eq!(
            normalise_href("  /blog/../about#team ", &here()),
            Some("/about#team".to_string())
        );
    }

    #[test]
    fn test_relative_to_current_path() {
        assert_eq!(
            normalise_href("world", &here()),
            Some("/blog/world".to_string())
        );
        assert_eq!(
            normalise_href("../contact", &here()),
            Some("/contact".to_string())
        );
        assert_eq!(
            normalise_href("./", &here()),
            Some("/blog/".to_string())
        );
        assert_eq!(
            normalise_href("?page=2", &here()),
            Some("/blog/hello?page=2".to_string())
        );
    }

    #[test]
    fn test_dot_segments() {
        let root = PageLocation::new("https://folio.test", "/a/b");
        assert_eq!(normalise_href("/a/b/../c", &root), Some("/a/c".to_string()));
        assert_eq!(normalise_href("/a/..", &root), Some("/".to_string()));
        assert_eq!(normalise_href("/../../x", &root), Some("/x".to_string()));
        assert_eq!(normalise_href("/a/./b/.", &root), Some("/a/b/".to_string()));
    }

    #[test]
    fn test_port_is_part_of_origin() {
        let dev = PageLocation::new("http://localhost:8080", "/");
        assert_eq!(
            normalise_href("http://localhost:8080/blog", &dev),
            Some("/blog".to_string())
        );
        assert_eq!(normalise_href("http://localhost:3000/blog", &dev), None);
    }

    #[test]
    fn test_unparseable_origin() {
        let broken = PageLocation::new("", "/");
        assert_eq!(normalise_href("/about", &broken), None);
    }
}
