//! Markdown rendering utilities.
//!
//! Provides safe markdown-to-HTML conversion with XSS protection.

use comrak::Options;

/// Convert markdown content to sanitized HTML.
///
/// Supports extended markdown syntax including:
/// - Strikethrough (`~~text~~`)
/// - Tables
/// - Footnotes
///
/// The output is sanitized using `ammonia` to prevent XSS attacks
/// by removing potentially dangerous HTML elements and attributes.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.footnotes = true;

    let html_output = comrak::markdown_to_html(markdown, &options);

    ammonia::clean(&html_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_extensions() {
        let html = markdown_to_html("~~old~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strips_scripts() {
        let html = markdown_to_html("hello <script>alert(1)</script>\n\n[x](javascript:alert(1))");
        assert!(html.contains("hello"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("javascript:"));
    }
}
