use serde::{Deserialize, Serialize};

use crate::{progress_percent, DomainError};

/// Catalog-assigned identifier, stable across searches. Doubles as the
/// storage key prefix for both persisted record families.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyBookId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One normalized search-result item. Ephemeral: the set is replaced on
/// every search and never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub id: BookId,
    pub title: String,
    pub thumbnail: String,
    pub authors: String,
    pub description: String,
    /// 0 means unknown, not zero pages.
    pub total_pages: u32,
}

impl SearchRecord {
    /// The persisted metadata slice of this record.
    pub fn info(&self) -> BookInfo {
        BookInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            authors: self.authors.clone(),
            total_pages: self.total_pages,
        }
    }
}

/// Persisted cache of a book's display metadata, written on every search
/// hit so the reading-now list works without network access. The JSON
/// field names match the stored layout, `totalPages` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub id: BookId,
    pub title: String,
    pub thumbnail: String,
    pub authors: String,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Unseen,
    Known,
    Reading,
    Completed,
}

/// Lifecycle position of a book given what the store holds for it.
/// Transitions happen only through explicit saves or a fresh search
/// overwriting the metadata.
pub fn reading_status(info: Option<&BookInfo>, pages_read: u32) -> ReadingStatus {
    let Some(info) = info else {
        return ReadingStatus::Unseen;
    };
    if pages_read == 0 {
        return ReadingStatus::Known;
    }
    if progress_percent(pages_read, info.total_pages) == 100 {
        ReadingStatus::Completed
    } else {
        ReadingStatus::Reading
    }
}
