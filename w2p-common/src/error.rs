//! Error type for the Wish2Plan library crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable or not valid TOML
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown category, status or source text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored id or timestamp that no longer parses
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

impl Error {
    /// A UNIQUE constraint rejected the write (e.g. an idea added to a
    /// plan twice)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(err) => err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!Error::InvalidInput("HIKE".to_string()).is_unique_violation());
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }
}
