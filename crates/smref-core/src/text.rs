use scraper::Html;

/// Reduce an HTML fragment to its rendered plain text.
///
/// Tags are dropped, entities decoded, and the result trimmed. Malformed
/// markup is recovered by the parser, so this never fails.
pub fn html_to_text(fragment: &str) -> String {
    if fragment.is_empty() {
        return String::new();
    }
    let document = Html::parse_fragment(fragment);
    let text: String = document.root_element().text().collect();
    text.trim().to_string()
}
