use hondana_domain::{BookId, ReadingStatus, SearchRecord};

#[derive(Debug, Clone, Default)]
pub struct BootstrapStoreCommand;

#[derive(Debug, Clone)]
pub struct SearchBooksCommand {
    pub query: String,
}

/// Detail view is only reachable for a book in the current result set, so
/// the query carries the record itself rather than a bare id.
#[derive(Debug, Clone)]
pub struct BookDetailQuery {
    pub record: SearchRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetailView {
    pub id: BookId,
    pub title: String,
    pub thumbnail: String,
    pub authors: String,
    pub description: String,
    pub total_pages: u32,
    pub pages_read: u32,
    pub percent: u8,
    pub status: ReadingStatus,
    /// Upper bound for the pages input widget.
    pub pages_input_max: u32,
}

#[derive(Debug, Clone)]
pub struct SaveProgressCommand {
    pub id: BookId,
    pub total_pages: u32,
    /// Raw parsed input; non-numeric input parses to 0 at the UI boundary.
    pub requested_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedProgress {
    pub pages_read: u32,
    pub percent: u8,
    pub completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReadingNowQuery;

#[derive(Debug, Clone)]
pub struct StoredInfoQuery {
    pub id: BookId,
}

#[derive(Debug, Clone)]
pub struct CoverImageQuery {
    pub url: String,
}
