mod error;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use ports::{CatalogClient, ProgressStore};
pub use service::ApplicationService;
pub use use_cases::{
    BookDetailQuery, BookDetailView, BootstrapStoreCommand, CoverImageQuery, ReadingNowQuery,
    SaveProgressCommand, SavedProgress, SearchBooksCommand, StoredInfoQuery,
};
