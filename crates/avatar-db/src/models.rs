//! Rust structs mirroring database rows.

use serde::{Deserialize, Serialize};

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Storage-relative avatar path, e.g. `avatars/7/<uuid>.png`.
    pub avatar_path: Option<String>,
}

impl User {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            avatar_path: row.get(2)?,
        })
    }
}
