use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A column held a value that does not fit the record's field type
    /// (wrong type, NULL, or out of range).
    #[error("cannot decode column `{column}`: {source}")]
    Decode {
        column: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, DbError>;
