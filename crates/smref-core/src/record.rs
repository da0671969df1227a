use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the seven metadata fields SuperMemo stores inside a
/// `<supermemoreference>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Author,
    Comment,
    Date,
    Email,
    Link,
    Source,
    Title,
}

impl Field {
    /// Every field, in the order extraction visits them.
    pub const ALL: [Field; 7] = [
        Field::Author,
        Field::Comment,
        Field::Date,
        Field::Email,
        Field::Link,
        Field::Source,
        Field::Title,
    ];

    /// Marker name as written in the block (`#Author: ...`). Case-sensitive.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Author => "Author",
            Field::Comment => "Comment",
            Field::Date => "Date",
            Field::Email => "Email",
            Field::Link => "Link",
            Field::Source => "Source",
            Field::Title => "Title",
        }
    }

    /// Lower-case attribute name used for record keys and report columns.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Author => "author",
            Field::Comment => "comment",
            Field::Date => "date",
            Field::Email => "email",
            Field::Link => "link",
            Field::Source => "source",
            Field::Title => "title",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown reference field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    /// Accepts either spelling (`Author` or `author`), ignoring case.
    /// Marker matching during extraction stays case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Reference metadata extracted from a single HTML fragment.
///
/// Every attribute holds the trimmed plain text found after its marker, or an
/// empty string when the marker (or the whole block) is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Notes about the content
    pub comment: String,
    /// Original URI of the content
    pub link: String,
    /// Original source of the content
    pub source: String,
    pub date: String,
    pub title: String,
    /// Original author of the content
    pub author: String,
    /// Email the content was extracted from
    pub email: String,
}

impl ReferenceRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Author => &self.author,
            Field::Comment => &self.comment,
            Field::Date => &self.date,
            Field::Email => &self.email,
            Field::Link => &self.link,
            Field::Source => &self.source,
            Field::Title => &self.title,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Author => &mut self.author,
            Field::Comment => &mut self.comment,
            Field::Date => &mut self.date,
            Field::Email => &mut self.email,
            Field::Link => &mut self.link,
            Field::Source => &mut self.source,
            Field::Title => &mut self.title,
        };
        *slot = value;
    }

    /// `(field, value)` pairs in [`Field::ALL`] order, including empty ones.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Number of fields with a non-empty value.
    pub fn populated(&self) -> usize {
        self.fields().filter(|(_, v)| !v.is_empty()).count()
    }

    /// True when no field carries a value (e.g. no reference block was found).
    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_from_str_accepts_both_spellings() {
        assert_eq!("Author".parse::<Field>(), Ok(Field::Author));
        assert_eq!("title".parse::<Field>(), Ok(Field::Title));
        assert_eq!(" EMAIL ".parse::<Field>(), Ok(Field::Email));
    }

    #[test]
    fn field_from_str_rejects_unknown() {
        let err = "publisher".parse::<Field>().unwrap_err();
        assert_eq!(err, UnknownField("publisher".to_string()));
        assert_eq!(err.to_string(), "unknown reference field: publisher");
    }

    #[test]
    fn all_fields_are_distinct_and_ordered() {
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["Author", "Comment", "Date", "Email", "Link", "Source", "Title"]
        );
        for f in Field::ALL {
            assert_eq!(f.key(), f.name().to_lowercase());
        }
    }

    #[test]
    fn get_and_set_address_the_same_attribute() {
        let mut record = ReferenceRecord::default();
        for f in Field::ALL {
            record.set(f, format!("value of {}", f.key()));
        }
        assert_eq!(record.author, "value of author");
        assert_eq!(record.link, "value of link");
        for f in Field::ALL {
            assert_eq!(record.get(f), format!("value of {}", f.key()));
        }
    }

    #[test]
    fn populated_counts_non_empty_fields() {
        let record = ReferenceRecord {
            author: "Jane Doe".into(),
            title: "Sample".into(),
            ..Default::default()
        };
        assert_eq!(record.populated(), 2);
        assert!(!record.is_empty());
        assert!(ReferenceRecord::default().is_empty());
    }

    #[test]
    fn record_serializes_with_lowercase_keys() {
        let record = ReferenceRecord {
            email: "a@b.c".into(),
            ..Default::default()
        };
        let toml_str = toml::to_string(&record).unwrap();
        assert!(toml_str.contains("email = \"a@b.c\""));
        assert!(toml_str.contains("author = \"\""));
    }
}
