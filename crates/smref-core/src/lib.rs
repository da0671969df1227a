pub mod config_file;
pub mod extract;
pub mod record;
pub mod text;

// Re-export for convenience
pub use extract::{BREAK_MARKER, CONTAINER_TAG, extract, extract_field, metadata_block};
pub use record::{Field, ReferenceRecord, UnknownField};
pub use text::html_to_text;
