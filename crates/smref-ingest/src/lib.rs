use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

// Re-export domain types for convenience
pub use smref_core::{Field, ReferenceRecord};
pub use smref_core::config_file::DEFAULT_EXTENSIONS;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// How directories given as input are scanned.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Accepted file extensions, compared case-insensitively, without the dot.
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: true,
        }
    }
}

/// Reference record extracted from one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Display label: the file path, or `<stdin>`.
    pub source: String,
    /// `None` when the input was empty.
    pub record: Option<ReferenceRecord>,
}

/// Outcome of extracting from many inputs. Per-file failures don't abort
/// the batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub documents: Vec<ExtractedDocument>,
    pub failures: Vec<(PathBuf, IngestError)>,
}

/// Check whether a path has one of the accepted extensions.
pub fn is_html_path(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Expand the given paths into the list of files to read.
///
/// Files named explicitly are kept whatever their extension; directories are
/// scanned for files with an accepted extension. The result is sorted and
/// free of duplicates.
pub fn collect_inputs(paths: &[PathBuf], options: &ScanOptions) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            scan_dir(path, options, &mut files)?;
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(IngestError::NotFound(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Collect accepted files under `dir`. Symlinked directories are not
/// descended into, so link cycles can't repeat entries.
fn scan_dir(dir: &Path, options: &ScanOptions, out: &mut Vec<PathBuf>) -> Result<(), IngestError> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(dir).follow_links(false).max_depth(max_depth) {
        let entry = entry.map_err(|e| IngestError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if path.is_file() && is_html_path(path, &options.extensions) {
            out.push(path.to_path_buf());
        }
    }
    Ok(())
}

/// Read a file as text. Invalid UTF-8 is replaced rather than rejected and a
/// leading byte-order mark is dropped.
pub fn read_html(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::NotFound(path.to_path_buf())
        } else {
            IngestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(decode(&bytes))
}

fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(text.as_ref()).to_string()
}

/// Extract the reference record from a single file.
pub fn extract_document(path: &Path) -> Result<ExtractedDocument, IngestError> {
    let content = read_html(path)?;
    Ok(ExtractedDocument {
        source: path.display().to_string(),
        record: smref_core::extract(&content),
    })
}

/// Extract the reference record from any reader, e.g. stdin.
pub fn extract_reader<R: Read>(mut reader: R, label: &str) -> Result<ExtractedDocument, IngestError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| IngestError::Io {
            path: PathBuf::from(label),
            source,
        })?;
    Ok(ExtractedDocument {
        source: label.to_string(),
        record: smref_core::extract(&decode(&bytes)),
    })
}

/// Expand `paths` and extract every file found.
///
/// Expansion errors (a missing input path, an unreadable directory) are
/// reported as failures too, so one bad argument doesn't hide the rest.
pub fn extract_all(paths: &[PathBuf], options: &ScanOptions) -> BatchResult {
    let mut batch = BatchResult::default();

    let mut files = Vec::new();
    for path in paths {
        match collect_inputs(std::slice::from_ref(path), options) {
            Ok(found) => files.extend(found),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping input");
                batch.failures.push((path.clone(), e));
            }
        }
    }
    files.sort();
    files.dedup();

    for file in files {
        match extract_document(&file) {
            Ok(doc) => {
                tracing::debug!(
                    path = %file.display(),
                    populated = doc.record.as_ref().map(|r| r.populated()).unwrap_or(0),
                    "extracted"
                );
                batch.documents.push(doc);
            }
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "failed to read input");
                batch.failures.push((file, e));
            }
        }
    }

    tracing::info!(
        documents = batch.documents.len(),
        failures = batch.failures.len(),
        "extraction batch complete"
    );
    batch
}
