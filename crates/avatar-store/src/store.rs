//! Filesystem-level avatar storage.
//!
//! Avatars are stored at `{root}/avatars/{user_id}/{uuid}.{ext}` and served
//! read-only under [`STATIC_PREFIX`]. The store owns the mapping between
//! relative paths and file bytes; it never touches the database.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use avatar_core::config::Config;
use avatar_core::{Error, Result, WriteOp};

use crate::{path, validate};

/// URL path under which the storage root is mounted.
pub const STATIC_PREFIX: &str = "/static";

/// Settings the store needs, extracted from the application [`Config`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Storage root directory.
    pub root: PathBuf,
    /// Maximum accepted avatar size in bytes.
    pub max_size: usize,
    /// Public base URL used by [`AvatarStore::resolve_url`].
    pub base_url: String,
}

impl StoreConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.storage.upload_dir.clone(),
            max_size: config.storage.max_avatar_size,
            base_url: config.server.base_url.clone(),
        }
    }
}

/// Local-disk avatar store.
#[derive(Debug)]
pub struct AvatarStore {
    config: StoreConfig,
}

impl AvatarStore {
    /// Create a store, creating the root directory if it is absent.
    pub fn new(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.root)?;
        Ok(Self { config })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Maximum accepted avatar size in bytes.
    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    /// Validate and store `data` as a new avatar for `user_id`.
    ///
    /// Returns the relative path of the new file. On a failed write any
    /// partially written file is removed before the error is returned.
    pub fn upload(&self, user_id: i64, data: &[u8]) -> Result<String> {
        let media_type = validate::validate(data, self.config.max_size)?;
        let relative = path::allocate(user_id, media_type);

        let user_dir = self.config.root.join(path::user_dir(user_id));
        fs::create_dir_all(&user_dir)
            .map_err(|e| Error::write_failure(WriteOp::Write, path::user_dir(user_id), e))?;

        let absolute = self.absolute_path(&relative)?;
        if let Err(e) = write_new_file(&absolute, data) {
            if let Err(cleanup) = fs::remove_file(&absolute) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to remove partial avatar {}: {cleanup}",
                        absolute.display()
                    );
                }
            }
            return Err(Error::write_failure(WriteOp::Write, relative, e));
        }

        tracing::debug!(
            user_id,
            path = %relative,
            media_type = %media_type,
            bytes = data.len(),
            "Stored avatar"
        );
        Ok(relative)
    }

    /// Delete the avatar file at `relative_path`.
    pub fn delete(&self, relative_path: &str) -> Result<()> {
        let absolute = self.absolute_path(relative_path)?;
        if !absolute.is_file() {
            return Err(Error::NotFound(relative_path.to_string()));
        }

        match fs::remove_file(&absolute) {
            Ok(()) => {
                tracing::debug!(path = %relative_path, "Deleted avatar");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(Error::write_failure(WriteOp::Delete, relative_path, e)),
        }
    }

    /// Public URL for a relative avatar path. Pure string composition.
    pub fn resolve_url(&self, relative_path: &str) -> String {
        format!(
            "{}{STATIC_PREFIX}/{}",
            self.config.base_url.trim_end_matches('/'),
            path::normalize(relative_path).trim_start_matches('/')
        )
    }

    /// Read back the bytes of a stored avatar.
    pub fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
        let absolute = self.absolute_path(relative_path)?;
        match fs::read(&absolute) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute location of a relative avatar path under the root.
    ///
    /// Paths that would leave the avatar tree are reported as
    /// [`Error::NotFound`].
    pub fn absolute_path(&self, relative_path: &str) -> Result<PathBuf> {
        path::resolve(&self.config.root, relative_path)
            .ok_or_else(|| Error::NotFound(relative_path.to_string()))
    }
}

/// Write `data` to a file that must not already exist, then fsync it.
fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
