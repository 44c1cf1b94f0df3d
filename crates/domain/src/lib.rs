mod book;
mod error;
mod progress;

pub use book::{reading_status, BookId, BookInfo, ReadingStatus, SearchRecord};
pub use error::DomainError;
pub use progress::{
    clamp_pages, progress_percent, ProgressRecord, ReadingNowEntry, FALLBACK_PAGES_INPUT_MAX,
    PLAUSIBLE_MAX_PAGES,
};
