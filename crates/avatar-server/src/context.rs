//! Application context shared by all route handlers.

use std::sync::Arc;

use avatar_db::pool::DbPool;
use avatar_store::AvatarStore;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds an `Arc` and the pool
/// handle. Settings the handlers need (size limit, base URL) live on the
/// store.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Avatar file store rooted at `storage.upload_dir`.
    pub store: Arc<AvatarStore>,
}

impl AppContext {
    pub fn new(db: DbPool, store: AvatarStore) -> Self {
        Self {
            db,
            store: Arc::new(store),
        }
    }
}
