//! Extraction of the document link from a download confirmation page.
//!
//! The page does not redirect to the document; it embeds a direct link of
//! the form:
//! ```text
//! https://download.microsoft.com/download/.../ServiceTags_Public_20240513.json
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Regex for the first absolute `ServiceTags_*.json` link on the page.
/// Brackets and separators end the link so it can sit inside CSS or script.
static DOCUMENT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://[^\s"'<>(),;]+/ServiceTags_[\w.\-]+\.json"#)
        .expect("Invalid document link regex")
});

/// Returns the first service tag document link found in `page`.
///
/// # Example
/// ```
/// use udr_tags::scrape::find_document_link;
///
/// let page = r#"<a href="https://download.example.test/d/ServiceTags_Public_20240513.json">x</a>"#;
/// assert_eq!(
///     find_document_link(page),
///     Some("https://download.example.test/d/ServiceTags_Public_20240513.json")
/// );
/// ```
pub fn find_document_link(page: &str) -> Option<&str> {
    DOCUMENT_LINK_REGEX.find(page).map(|m| m.as_str())
}
