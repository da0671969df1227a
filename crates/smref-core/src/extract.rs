//! Extraction of the `<supermemoreference>` metadata block.
//!
//! Two passes, kept separate: the HTML parser isolates the container and
//! later reduces each captured value to plain text, while the `#Name: ...<br>`
//! markers in between are delimited with plain regex matching.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};

use crate::record::{Field, ReferenceRecord};
use crate::text::html_to_text;

/// Tag name of the element SuperMemo stores reference metadata in.
pub const CONTAINER_TAG: &str = "supermemoreference";

/// Marker terminating each field value inside the block.
pub const BREAK_MARKER: &str = "<br>";

static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(CONTAINER_TAG).unwrap());

static FIELD_PATTERNS: Lazy<Vec<(Field, Regex)>> = Lazy::new(|| {
    Field::ALL
        .into_iter()
        .map(|f| (f, field_pattern(f.name()).unwrap()))
        .collect()
});

/// Character references that decode to LF or CR (`&#10;`, `&#x0D;`,
/// `&NewLine;`). A trailing digit or hex letter means a different code point.
static LINE_BREAK_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:0*(10|13)|[xX]0*([aAdD]))(?:;|\b)|&NewLine;").unwrap()
});

// Stand-ins for encoded line breaks while the document is parsed and the
// block re-serialized. The serializer writes decoded text back raw, which
// would otherwise turn `a&#10;b` into a real newline the single-line field
// pattern can't cross.
const LF_PLACEHOLDER: char = '\u{E00A}';
const CR_PLACEHOLDER: char = '\u{E00D}';

/// `#{name}: ` followed by the shortest run up to the first `<br>`.
fn field_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "#{}: (.*?){}",
        regex::escape(name),
        regex::escape(BREAK_MARKER)
    ))
}

/// Extract the reference record embedded in an HTML fragment.
///
/// Returns `None` only for empty input. Any non-empty input yields a record,
/// with every field left empty when no reference block is present.
pub fn extract(content: &str) -> Option<ReferenceRecord> {
    if content.is_empty() {
        return None;
    }

    let block = metadata_block(content).unwrap_or_default();
    if block.is_empty() {
        tracing::debug!(len = content.len(), "no reference block found");
    }

    let mut record = ReferenceRecord::default();
    for (field, pattern) in FIELD_PATTERNS.iter() {
        let value = capture_value(&block, pattern);
        if value.is_empty() {
            tracing::trace!(field = field.name(), "field not present");
        }
        record.set(*field, value);
    }

    tracing::debug!(populated = record.populated(), "extracted reference record");
    Some(record)
}

/// Inner markup of the first `<supermemoreference>` element, matched
/// case-insensitively, or `None` when the document has no such element.
pub fn metadata_block(html: &str) -> Option<String> {
    let document = Html::parse_document(&protect_line_break_refs(html));
    document
        .select(&CONTAINER_SELECTOR)
        .next()
        .map(|el| restore_line_break_refs(&el.inner_html()))
}

fn protect_line_break_refs(html: &str) -> Cow<'_, str> {
    LINE_BREAK_REF.replace_all(html, |caps: &Captures| {
        let code = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
        if matches!(code, Some("13" | "d" | "D")) {
            CR_PLACEHOLDER.to_string()
        } else {
            LF_PLACEHOLDER.to_string()
        }
    })
}

fn restore_line_break_refs(block: &str) -> String {
    block
        .replace(LF_PLACEHOLDER, "&#10;")
        .replace(CR_PLACEHOLDER, "&#13;")
}

/// Value of the first `#{name}: ...<br>` marker in `block`, as plain text.
///
/// The name must match exactly (case-sensitive). Returns an empty string when
/// the block is empty, the marker is missing, or the value has no text.
pub fn extract_field(block: &str, name: &str) -> String {
    if block.is_empty() {
        return String::new();
    }
    match field_pattern(name) {
        Ok(pattern) => capture_value(block, &pattern),
        Err(e) => {
            tracing::debug!(name, error = %e, "unusable field name");
            String::new()
        }
    }
}

fn capture_value(block: &str, pattern: &Regex) -> String {
    if block.is_empty() {
        return String::new();
    }
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| html_to_text(m.as_str()))
        .unwrap_or_default()
}
