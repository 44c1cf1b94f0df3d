pub mod catalog;
pub mod migrations;
pub mod presenters;
pub mod sqlite;

pub use catalog::GoogleBooksClient;
pub use presenters::{
    present_progress_line, present_reading_now_row, present_research_notice, present_search_row,
    present_total_pages, NO_READING_NOW_MESSAGE, NO_RESULTS_MESSAGE, PROGRESS_SAVED_MESSAGE,
};
pub use sqlite::SqliteProgressStore;
