use std::io::Write;
use std::path::Path;

use serde::Serialize;
use smref_core::{Field, ReferenceRecord};
use smref_ingest::ExtractedDocument;

use crate::types::{ExportError, ExportFormat, Summary};

/// Render extracted documents in the given format.
pub fn render(docs: &[ExtractedDocument], format: ExportFormat) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::Json => export_json(docs)?,
        ExportFormat::Csv => export_csv(docs),
        ExportFormat::Markdown => export_markdown(docs),
        ExportFormat::Text => export_text(docs),
    })
}

/// Render and write documents to `path`, replacing any existing file.
pub fn export_to_path(
    docs: &[ExtractedDocument],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = render(docs, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    source: &'a str,
    record: Option<&'a ReferenceRecord>,
}

fn export_json(docs: &[ExtractedDocument]) -> Result<String, ExportError> {
    let entries: Vec<JsonDocument<'_>> = docs
        .iter()
        .map(|d| JsonDocument {
            source: &d.source,
            record: d.record.as_ref(),
        })
        .collect();
    let mut out = serde_json::to_string_pretty(&entries)?;
    out.push('\n');
    Ok(out)
}

fn csv_escape(s: &str) -> String {
    if s.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn export_csv(docs: &[ExtractedDocument]) -> String {
    let mut out = String::from("File");
    for f in Field::ALL {
        out.push(',');
        out.push_str(f.name());
    }
    out.push('\n');

    for doc in docs {
        out.push_str(&csv_escape(&doc.source));
        match &doc.record {
            Some(record) => {
                for (_, value) in record.fields() {
                    out.push(',');
                    out.push_str(&csv_escape(value));
                }
            }
            None => out.push_str(&",".repeat(Field::ALL.len())),
        }
        out.push('\n');
    }
    out
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

fn export_markdown(docs: &[ExtractedDocument]) -> String {
    let mut out = String::from("# SuperMemo References\n\n");
    let s = Summary::from_documents(docs);
    out.push_str(&format!(
        "**{}** documents | **{}** with references | **{}** without | **{}** empty\n\n",
        s.total, s.populated, s.empty, s.absent,
    ));

    for doc in docs {
        out.push_str(&format!("## {}\n\n", doc.source));
        match &doc.record {
            Some(record) if !record.is_empty() => {
                out.push_str("| Field | Value |\n|---|---|\n");
                for (field, value) in record.fields().filter(|(_, v)| !v.is_empty()) {
                    out.push_str(&format!("| {} | {} |\n", field.name(), md_escape(value)));
                }
                out.push('\n');
            }
            _ => out.push_str("_No reference data._\n\n"),
        }
    }
    out
}

/// Decoration hooks for the text report. Styles only wrap the pieces of the
/// layout, so every style renders the same characters apart from its markup.
pub trait TextStyle {
    fn heading(&self, s: &str) -> String {
        s.to_string()
    }
    fn label(&self, s: &str) -> String {
        s.to_string()
    }
    fn placeholder(&self, s: &str) -> String {
        s.to_string()
    }
    fn summary(&self, s: &str) -> String {
        s.to_string()
    }
}

/// Undecorated text, as written by [`render`] for [`ExportFormat::Text`].
pub struct PlainText;

impl TextStyle for PlainText {}

fn export_text(docs: &[ExtractedDocument]) -> String {
    render_text(docs, &PlainText)
}

/// Text report: banner, one underlined section per document, summary line.
pub fn render_text(docs: &[ExtractedDocument], style: &dyn TextStyle) -> String {
    let mut out = style.heading("SuperMemo References");
    out.push('\n');
    out.push_str(&"=".repeat(60));
    out.push('\n');

    for doc in docs {
        out.push_str(&format!("\n{}\n", style.heading(&doc.source)));
        out.push_str(&"-".repeat(doc.source.chars().count()));
        out.push('\n');
        out.push_str(&text_body(doc.record.as_ref(), style));
    }

    let s = Summary::from_documents(docs);
    out.push('\n');
    out.push_str(&style.summary(&format!(
        "{} documents | {} with references | {} without | {} empty",
        s.total, s.populated, s.empty, s.absent,
    )));
    out.push('\n');
    out
}

/// Indented `Field: value` lines for one record, or a placeholder line.
fn text_body(record: Option<&ReferenceRecord>, style: &dyn TextStyle) -> String {
    let Some(record) = record else {
        return format!("  {}\n", style.placeholder("(empty input)"));
    };
    if record.is_empty() {
        return format!("  {}\n", style.placeholder("(no reference block)"));
    }
    let width = Field::ALL.iter().map(|f| f.name().len()).max().unwrap_or(0) + 1;
    let mut out = String::new();
    for (field, value) in record.fields().filter(|(_, v)| !v.is_empty()) {
        let label = format!("{:<width$}", format!("{}:", field.name()));
        out.push_str(&format!("  {}  {}\n", style.label(&label), value));
    }
    out
}
