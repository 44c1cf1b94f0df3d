use std::fmt::{Display, Formatter};

use hondana_domain::DomainError;

#[derive(Debug)]
pub enum ApplicationError {
    Domain(DomainError),
    /// Catalog request failed or returned malformed JSON. Not retried.
    Network(String),
    /// The underlying key-value store failed a read or write. Fatal to the
    /// action; there is no rollback.
    Storage(String),
    InvalidInput(String),
    NotFound(String),
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(error) => write!(f, "{error}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for ApplicationError {}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        Self::Domain(value)
    }
}
