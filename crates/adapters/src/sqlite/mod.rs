mod queries;

use std::fs;
use std::path::PathBuf;

use hondana_application::{ApplicationError, ProgressStore};
use hondana_domain::{BookId, BookInfo, ProgressRecord};
use log::warn;
use rusqlite::Connection;

use crate::migrations::MIGRATIONS;

const INFO_SUFFIX: &str = "_info";
const PAGES_SUFFIX: &str = "_pages";

/// Key-value store over a single sqlite table. Two key families per book:
/// `"<id>_info"` holds the JSON metadata blob, `"<id>_pages"` a plain
/// integer string. Last write wins; another process sharing the file is
/// not coordinated with.
#[derive(Debug, Clone)]
pub struct SqliteProgressStore {
    path: PathBuf,
}

impl SqliteProgressStore {
    pub fn new(path: String) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path)
            .map_err(|error| ApplicationError::Storage(error.to_string()))
    }
}

fn info_key(id: &BookId) -> String {
    format!("{}{INFO_SUFFIX}", id.as_str())
}

fn pages_key(id: &BookId) -> String {
    format!("{}{PAGES_SUFFIX}", id.as_str())
}

fn decode_pages(raw: &str) -> Option<ProgressRecord> {
    match raw.trim().parse::<u32>() {
        Ok(pages_read) => Some(ProgressRecord { pages_read }),
        Err(_) => {
            warn!("ignoring malformed pages value: {raw:?}");
            None
        }
    }
}

fn decode_info(raw: &str) -> Option<BookInfo> {
    match serde_json::from_str(raw) {
        Ok(info) => Some(info),
        Err(error) => {
            warn!("ignoring malformed book info blob: {error}");
            None
        }
    }
}

impl ProgressStore for SqliteProgressStore {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "store path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Storage(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|error| ApplicationError::Storage(error.to_string()))?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration)
                .map_err(|error| ApplicationError::Storage(error.to_string()))?;
        }

        Ok(())
    }

    fn pages(&self, id: &BookId) -> Result<Option<ProgressRecord>, ApplicationError> {
        let conn = self.open_connection()?;
        let raw = queries::get_value(&conn, &pages_key(id))
            .map_err(|error| ApplicationError::Storage(error.to_string()))?;
        Ok(raw.as_deref().and_then(decode_pages))
    }

    fn put_pages(&self, id: &BookId, record: ProgressRecord) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        queries::put_value(&conn, &pages_key(id), &record.pages_read.to_string())
            .map_err(|error| ApplicationError::Storage(error.to_string()))
    }

    fn info(&self, id: &BookId) -> Result<Option<BookInfo>, ApplicationError> {
        let conn = self.open_connection()?;
        let raw = queries::get_value(&conn, &info_key(id))
            .map_err(|error| ApplicationError::Storage(error.to_string()))?;
        Ok(raw.as_deref().and_then(decode_info))
    }

    fn put_info(&self, info: &BookInfo) -> Result<(), ApplicationError> {
        let blob = serde_json::to_string(info)
            .map_err(|error| ApplicationError::Storage(error.to_string()))?;
        let conn = self.open_connection()?;
        queries::put_value(&conn, &info_key(&info.id), &blob)
            .map_err(|error| ApplicationError::Storage(error.to_string()))
    }

    fn progress_book_ids(&self) -> Result<Vec<BookId>, ApplicationError> {
        let conn = self.open_connection()?;
        let keys = queries::all_keys(&conn)
            .map_err(|error| ApplicationError::Storage(error.to_string()))?;
        Ok(keys
            .iter()
            .filter_map(|key| key.strip_suffix(PAGES_SUFFIX))
            .filter_map(|id| BookId::new(id).ok())
            .collect())
    }
}
