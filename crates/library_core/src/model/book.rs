//! Book record domain model.
//!
//! # Responsibility
//! - Define `BookRecord` and its mapping onto store rows.
//! - Validate form input (`NewBook`) before anything reaches the store.
//!
//! # Invariants
//! - Every persisted record carries all five fields.
//! - Text fields are stored exactly as entered; equality is case-sensitive.
//! - A publication year of `0` is treated as an unfilled form field.

use crate::store::Row;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const TITLE_COLUMN: &str = "Title";
pub const AUTHOR_COLUMN: &str = "Author";
pub const PUBLICATION_YEAR_COLUMN: &str = "Publication Year";
pub const GENRE_COLUMN: &str = "Genre";
pub const READ_STATUS_COLUMN: &str = "Read Status";

/// Whether a book has been read.
///
/// Serialized as `"Yes"` / `"No"` to match the store row schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadStatus {
    #[serde(rename = "Yes")]
    Read,
    #[serde(rename = "No")]
    Unread,
}

impl ReadStatus {
    /// Returns the value stored in the `Read Status` column.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Read => "Yes",
            Self::Unread => "No",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }
}

impl Display for ReadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Error returned when text cannot be interpreted as a read status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReadStatusError(String);

impl Display for ParseReadStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported read status `{}`; expected yes|no|read|unread",
            self.0
        )
    }
}

impl Error for ParseReadStatusError {}

impl FromStr for ReadStatus {
    type Err = ParseReadStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "read" => Ok(Self::Read),
            "no" | "n" | "unread" => Ok(Self::Unread),
            other => Err(ParseReadStatusError(other.to_string())),
        }
    }
}

/// Mandatory fields of the add-book form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    PublicationYear,
    Genre,
    ReadStatus,
}

impl BookField {
    /// Store column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => TITLE_COLUMN,
            Self::Author => AUTHOR_COLUMN,
            Self::PublicationYear => PUBLICATION_YEAR_COLUMN,
            Self::Genre => GENRE_COLUMN,
            Self::ReadStatus => READ_STATUS_COLUMN,
        }
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::PublicationYear => "publication year",
            Self::Genre => "genre",
            Self::ReadStatus => "read status",
        };
        f.write_str(label)
    }
}

/// Form validation failure. Reported back as a modeled outcome, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    MissingField(BookField),
}

impl BookValidationError {
    /// Form field that failed validation.
    pub fn field(&self) -> BookField {
        match self {
            Self::MissingField(field) => *field,
        }
    }
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
        }
    }
}

impl Error for BookValidationError {}

/// Canonical catalog record, one row in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    /// Rows written by older clients may hold the year as an integral float.
    #[serde(rename = "Publication Year", deserialize_with = "deserialize_year")]
    pub publication_year: i32,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Read Status")]
    pub read_status: ReadStatus,
}

impl BookRecord {
    pub fn is_read(&self) -> bool {
        self.read_status.is_read()
    }

    /// Builds the store row for this record.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(TITLE_COLUMN.to_string(), Value::from(self.title.as_str()));
        row.insert(AUTHOR_COLUMN.to_string(), Value::from(self.author.as_str()));
        row.insert(
            PUBLICATION_YEAR_COLUMN.to_string(),
            Value::from(self.publication_year),
        );
        row.insert(GENRE_COLUMN.to_string(), Value::from(self.genre.as_str()));
        row.insert(
            READ_STATUS_COLUMN.to_string(),
            Value::from(self.read_status.as_wire()),
        );
        row
    }

    /// Decodes a store row. Columns outside the schema (`id`, `created_at`)
    /// are ignored.
    pub fn from_row(row: &Row) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(row.clone()))
    }
}

/// Unvalidated add-book form input.
///
/// `None` and blank text both mean "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub genre: String,
    pub read_status: Option<ReadStatus>,
}

impl NewBook {
    /// Creates a fully filled form.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        publication_year: i32,
        genre: impl Into<String>,
        read_status: ReadStatus,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year: Some(publication_year),
            genre: genre.into(),
            read_status: Some(read_status),
        }
    }

    /// Checks that every field is filled and returns the record to persist.
    ///
    /// Fields are checked in column order; the first missing one is reported.
    pub fn validate(&self) -> Result<BookRecord, BookValidationError> {
        let title = require_text(&self.title, BookField::Title)?;
        let author = require_text(&self.author, BookField::Author)?;
        let publication_year = self
            .publication_year
            .filter(|year| *year != 0)
            .ok_or(BookValidationError::MissingField(BookField::PublicationYear))?;
        let genre = require_text(&self.genre, BookField::Genre)?;
        let read_status = self
            .read_status
            .ok_or(BookValidationError::MissingField(BookField::ReadStatus))?;

        Ok(BookRecord {
            title,
            author,
            publication_year,
            genre,
            read_status,
        })
    }
}

fn require_text(value: &str, field: BookField) -> Result<String, BookValidationError> {
    if value.trim().is_empty() {
        return Err(BookValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => i32::try_from(int).ok(),
            None => number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .filter(|float| *float >= f64::from(i32::MIN) && *float <= f64::from(i32::MAX))
                .map(|float| float as i32),
        },
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        D::Error::custom(format!("publication year must be an integer, got {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::{BookField, BookRecord, BookValidationError, NewBook, ReadStatus};
    use serde_json::json;

    #[test]
    fn zero_year_counts_as_unfilled() {
        let mut form = NewBook::new("Dune", "Herbert", 1965, "Sci-Fi", ReadStatus::Read);
        form.publication_year = Some(0);

        assert_eq!(
            form.validate().unwrap_err(),
            BookValidationError::MissingField(BookField::PublicationYear)
        );
    }

    #[test]
    fn row_uses_store_column_names() {
        let record = NewBook::new("Dune", "Herbert", 1965, "Sci-Fi", ReadStatus::Unread)
            .validate()
            .unwrap();

        let row = record.to_row();
        assert_eq!(row["Title"], "Dune");
        assert_eq!(row["Publication Year"], 1965);
        assert_eq!(row["Read Status"], "No");
        assert_eq!(BookRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn year_rejects_fractional_float() {
        let value = json!({
            "Title": "Dune",
            "Author": "Herbert",
            "Publication Year": 1965.5,
            "Genre": "Sci-Fi",
            "Read Status": "Yes"
        });

        let err = serde_json::from_value::<BookRecord>(value).unwrap_err();
        assert!(err.to_string().contains("publication year must be an integer"));
    }
}
