use std::fmt;
use std::str::FromStr;

use smref_ingest::ExtractedDocument;
use thiserror::Error;

/// Output format for extracted references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Text,
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// File extension conventionally used for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown export format '{0}' (expected text, json, csv or markdown)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// Counts over a set of extracted documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Empty inputs (no record at all).
    pub absent: usize,
    /// Records with no populated field.
    pub empty: usize,
    /// Records with at least one populated field.
    pub populated: usize,
}

impl Summary {
    pub fn from_documents(docs: &[ExtractedDocument]) -> Self {
        let mut s = Summary {
            total: docs.len(),
            ..Default::default()
        };
        for doc in docs {
            match &doc.record {
                None => s.absent += 1,
                Some(r) if r.is_empty() => s.empty += 1,
                Some(_) => s.populated += 1,
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smref_core::ReferenceRecord;

    #[test]
    fn format_from_str() {
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("MD".parse::<ExportFormat>(), Ok(ExportFormat::Markdown));
        assert_eq!("txt".parse::<ExportFormat>(), Ok(ExportFormat::Text));
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn format_display_round_trips() {
        for f in ExportFormat::ALL {
            assert_eq!(f.to_string().parse::<ExportFormat>(), Ok(f));
        }
    }

    #[test]
    fn summary_counts() {
        let docs = vec![
            ExtractedDocument {
                source: "a".into(),
                record: None,
            },
            ExtractedDocument {
                source: "b".into(),
                record: Some(ReferenceRecord::default()),
            },
            ExtractedDocument {
                source: "c".into(),
                record: Some(ReferenceRecord {
                    title: "T".into(),
                    ..Default::default()
                }),
            },
        ];
        assert_eq!(
            Summary::from_documents(&docs),
            Summary {
                total: 3,
                absent: 1,
                empty: 1,
                populated: 1,
            }
        );
    }
}
