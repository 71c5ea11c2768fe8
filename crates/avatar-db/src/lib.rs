//! avatar-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage of user records with r2d2
//! connection pooling, embedded migrations, typed models, and query
//! functions.
//!
//! # Example
//!
//! ```
//! use avatar_db::pool::{init_memory_pool, get_conn};
//! use avatar_db::queries::users;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let user = users::create_user(&conn, "alice", None).unwrap();
//! assert!(user.avatar_path.is_none());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
