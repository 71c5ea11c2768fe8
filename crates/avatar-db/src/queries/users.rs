//! User CRUD operations.

use avatar_core::{Error, Result};
use rusqlite::{Connection, ErrorCode, OptionalExtension};

use crate::models::User;

/// Create a new user and return it.
///
/// When `id` is `None` SQLite assigns the next row id.
pub fn create_user(conn: &Connection, username: &str, id: Option<i64>) -> Result<User> {
    conn.execute(
        "INSERT INTO users (id, username) VALUES (?1, ?2)",
        rusqlite::params![id, username],
    )
    .map_err(|e| match unique_violation(&e) {
        Some(column) if column == "users.username" => {
            Error::DuplicateUsername(username.to_string())
        }
        Some(_) => Error::Validation(format!(
            "User id {} already exists",
            id.map(|i| i.to_string()).unwrap_or_default()
        )),
        None => Error::database(e),
    })?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        avatar_path: None,
    })
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, avatar_path FROM users WHERE id = ?1",
        [id],
        User::from_row,
    )
    .optional()
    .map_err(Error::database)
}

/// Set or clear a user's avatar path. Returns false if the user does not exist.
pub fn set_avatar_path(conn: &Connection, id: i64, avatar_path: Option<&str>) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE users SET avatar_path = ?1 WHERE id = ?2",
            rusqlite::params![avatar_path, id],
        )
        .map_err(Error::database)?;
    Ok(n > 0)
}

/// Every avatar path currently referenced by a user record.
pub fn list_avatar_paths(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT avatar_path FROM users WHERE avatar_path IS NOT NULL")
        .map_err(Error::database)?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(Error::database)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(Error::database)?;
    Ok(rows)
}

/// Extract the `table.column` named by a UNIQUE/PRIMARY KEY violation.
fn unique_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            msg.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let user = create_user(&conn, "alice", None).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.avatar_path.is_none());

        let fetched = get_user_by_id(&conn, user.id).unwrap().unwrap();
        assert_eq!(fetched, user);
    }

    #[test]
    fn create_with_explicit_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let user = create_user(&conn, "seven", Some(7)).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(get_user_by_id(&conn, 7).unwrap().unwrap().username, "seven");
    }

    #[test]
    fn duplicate_username() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_user(&conn, "alice", None).unwrap();
        let err = create_user(&conn, "alice", None).unwrap_err();
        assert!(matches!(err, Error::DuplicateUsername(ref name) if name == "alice"));
    }

    #[test]
    fn duplicate_explicit_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_user(&conn, "first", Some(3)).unwrap();
        let err = create_user(&conn, "second", Some(3)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_user_is_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get_user_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn set_and_clear_avatar_path() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = create_user(&conn, "bob", None).unwrap();

        assert!(set_avatar_path(&conn, user.id, Some("avatars/1/a.png")).unwrap());
        let fetched = get_user_by_id(&conn, user.id).unwrap().unwrap();
        assert_eq!(fetched.avatar_path.as_deref(), Some("avatars/1/a.png"));

        assert!(set_avatar_path(&conn, user.id, None).unwrap());
        let fetched = get_user_by_id(&conn, user.id).unwrap().unwrap();
        assert!(fetched.avatar_path.is_none());
    }

    #[test]
    fn set_avatar_path_missing_user() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(!set_avatar_path(&conn, 12345, Some("avatars/12345/a.png")).unwrap());
    }

    #[test]
    fn list_referenced_avatar_paths() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_user(&conn, "a", None).unwrap();
        let b = create_user(&conn, "b", None).unwrap();
        set_avatar_path(&conn, b.id, Some("avatars/2/b.gif")).unwrap();

        let paths = list_avatar_paths(&conn).unwrap();
        assert_eq!(paths, vec!["avatars/2/b.gif".to_string()]);
    }
}
