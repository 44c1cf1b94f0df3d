use hondana_domain::{BookId, BookInfo, ProgressRecord, SearchRecord};

use crate::ApplicationError;

/// Durable, synchronous, string-keyed storage for per-book records.
/// Implementations map malformed stored values to `None` on read; only a
/// failing read or write of the store itself is an error.
pub trait ProgressStore {
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn pages(&self, id: &BookId) -> Result<Option<ProgressRecord>, ApplicationError>;

    fn put_pages(&self, id: &BookId, record: ProgressRecord) -> Result<(), ApplicationError>;

    fn info(&self, id: &BookId) -> Result<Option<BookInfo>, ApplicationError>;

    fn put_info(&self, info: &BookInfo) -> Result<(), ApplicationError>;

    /// Distinct book ids that currently hold a progress record, in no
    /// particular order.
    fn progress_book_ids(&self) -> Result<Vec<BookId>, ApplicationError>;
}

/// External book catalog. One blocking request per call, no retries.
pub trait CatalogClient {
    /// The query is expected to be non-empty and trimmed by the caller.
    fn search(&self, query: &str) -> Result<Vec<SearchRecord>, ApplicationError>;

    fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, ApplicationError>;
}
