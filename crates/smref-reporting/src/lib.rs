pub mod export;
pub mod types;

pub use export::{PlainText, TextStyle, export_to_path, render, render_text};
pub use types::{ExportError, ExportFormat, Summary, UnknownFormat};
