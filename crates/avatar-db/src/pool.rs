//! Connection pool management for SQLite via r2d2.

use avatar_core::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Connections per pool. Avatar requests hold a connection only for a single
/// lookup or `UPDATE users SET avatar_path`.
const MAX_CONNECTIONS: u32 = 4;

/// How long a writer waits on a locked database before failing the upload
/// with a persistence error.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Open the user database at `db_path`, creating it if needed.
///
/// Every connection runs in WAL mode so `/users/{id}` reads are not blocked
/// by an avatar commit. Pending migrations run before the pool is returned.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
        ))
    });
    migrated_pool(manager, db_path)
}

/// Open a private in-memory user database.
///
/// Each call gets its own shared-cache name so test harnesses running in
/// parallel never see each other's users, while the connections of one pool
/// share a single database.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT_DB: AtomicU64 = AtomicU64::new(0);
    let n = NEXT_DB.fetch_add(1, Ordering::Relaxed);
    let uri = format!(
        "file:avatar_users_{}_{n}?mode=memory&cache=shared",
        std::process::id()
    );

    migrated_pool(SqliteConnectionManager::file(&uri), &uri)
}

fn migrated_pool(manager: SqliteConnectionManager, label: &str) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(MAX_CONNECTIONS)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to open user database {label}: {e}")))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)?;
    tracing::debug!(
        "User database {label} ready at schema V{}",
        migrations::latest_version()
    );

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}
