//! avatar-store: validated local-disk storage for user avatars.
//!
//! Uploads flow through three stages:
//!
//! - [`validate`]: size limit and content sniffing against the image
//!   allow-list (jpeg, png, gif). The declared content type is never trusted.
//! - [`path`]: allocation of a collision-free relative path
//!   `avatars/{user_id}/{uuid}.{ext}`.
//! - [`AvatarStore`]: directory creation, durable writes, deletes, reads,
//!   URL resolution, and the orphan sweep.
//!
//! # Example
//!
//! ```no_run
//! use avatar_store::{AvatarStore, StoreConfig};
//!
//! let store = AvatarStore::new(StoreConfig {
//!     root: "uploads".into(),
//!     max_size: 2 * 1024 * 1024,
//!     base_url: "http://127.0.0.1:5005".into(),
//! })
//! .unwrap();
//!
//! let png = std::fs::read("me.png").unwrap();
//! let path = store.upload(7, &png).unwrap();
//! println!("{}", store.resolve_url(&path));
//! ```

pub mod path;
mod store;
mod sweep;
pub mod validate;

pub use store::{AvatarStore, StoreConfig, STATIC_PREFIX};
pub use sweep::{SweepOptions, SweepReport, DEFAULT_MIN_AGE};
