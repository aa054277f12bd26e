//! Row types and their decoders.
//!
//! Every record type has one `from_row` function that reads columns by name
//! and reports the offending column through [`DbError::Decode`] when a value
//! is missing or has the wrong type.

use rusqlite::Row;
use rusqlite::types::FromSql;

use crate::{DbError, Result};

fn column<T: FromSql>(row: &Row<'_>, name: &'static str) -> Result<T> {
    row.get(name)
        .map_err(|source| DbError::Decode { column: name, source })
}

/// A message joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub message_id: i64,
    pub author_id: i64,
    pub username: String,
    pub text: String,
    pub pub_date: i64,
    pub flagged: u8,
}

impl MessageRow {
    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            message_id: column(row, "message_id")?,
            author_id: column(row, "author_id")?,
            username: column(row, "username")?,
            text: column(row, "text")?,
            pub_date: column(row, "pub_date")?,
            flagged: column(row, "flagged")?,
        })
    }
}

/// One entry of a user's followee listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolloweeRow {
    pub username: String,
}

impl FolloweeRow {
    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            username: column(row, "username")?,
        })
    }
}
