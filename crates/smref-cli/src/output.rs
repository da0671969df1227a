use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use smref_core::{Field, ReferenceRecord};
use smref_ingest::IngestError;
use smref_reporting::TextStyle;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Terminal styling for the text report; the layout itself comes from
/// [`smref_reporting::render_text`].
pub struct AnsiStyle;

impl TextStyle for AnsiStyle {
    fn heading(&self, s: &str) -> String {
        s.bold().to_string()
    }
    fn label(&self, s: &str) -> String {
        s.cyan().to_string()
    }
    fn placeholder(&self, s: &str) -> String {
        s.dimmed().to_string()
    }
    fn summary(&self, s: &str) -> String {
        s.dimmed().to_string()
    }
}

/// Print a single field value for a document (`--field` mode).
pub fn print_field(w: &mut dyn Write, record: Option<&ReferenceRecord>, field: Field) -> std::io::Result<()> {
    writeln!(w, "{}", record.map(|r| r.get(field)).unwrap_or(""))
}

/// Report an input that could not be read.
pub fn print_failure(
    w: &mut dyn Write,
    path: &Path,
    error: &IngestError,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}: {}", "ERROR:".red(), path.display(), error)
    } else {
        writeln!(w, "ERROR: {}: {}", path.display(), error)
    }
}
