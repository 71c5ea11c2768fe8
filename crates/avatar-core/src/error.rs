//! Unified error type for the avatar service.
//!
//! Every crate funnels its failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`] and a stable machine-readable code via
//! [`Error::code`].

use std::fmt;

/// The file-system operation that failed in [`Error::WriteFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Creating or writing an avatar file.
    Write,
    /// Removing an avatar file.
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Unified error type covering all failure modes of the avatar service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A user with the requested username already exists.
    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    /// No user record exists for the given id.
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// The uploaded file is larger than the configured maximum.
    #[error("File exceeds the {limit} byte size limit")]
    PayloadTooLarge {
        /// Configured maximum avatar size in bytes.
        limit: usize,
    },

    /// Content sniffing could not inspect the buffer.
    #[error("File type detection failed: {0}")]
    TypeSniffFailure(String),

    /// The sniffed media type is not one of the allowed image types.
    #[error("Unsupported media type '{detected}'; allowed types: image/jpeg, image/png, image/gif")]
    UnsupportedMediaType {
        /// MIME type detected from the file content.
        detected: String,
    },

    /// Writing or deleting an avatar file failed.
    #[error("Failed to {op} avatar file {path}: {source}")]
    WriteFailure {
        /// Which operation failed.
        op: WriteOp,
        /// Storage-relative path of the file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The avatar file referenced by a relative path does not exist.
    #[error("Avatar file not found: {0}")]
    NotFound(String),

    /// The user has no avatar to delete.
    #[error("User {0} has no avatar")]
    NoAvatar(i64),

    /// Recording the new avatar path failed after the file was written.
    #[error("Failed to update avatar for user {user_id}: {source}")]
    PersistenceFailure {
        /// The user whose record could not be updated.
        user_id: i64,
        /// The underlying persistence error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation outside avatar file handling failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::DuplicateUsername(_) => 400,
            Error::UserNotFound(_) => 404,
            Error::PayloadTooLarge { .. } => 400,
            Error::TypeSniffFailure(_) => 400,
            Error::UnsupportedMediaType { .. } => 400,
            Error::WriteFailure { .. } => 500,
            Error::NotFound(_) => 404,
            Error::NoAvatar(_) => 400,
            Error::PersistenceFailure { .. } => 500,
            Error::Validation(_) => 400,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable snake_case identifier for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::DuplicateUsername(_) => "duplicate_username",
            Error::UserNotFound(_) => "user_not_found",
            Error::PayloadTooLarge { .. } => "payload_too_large",
            Error::TypeSniffFailure(_) => "type_sniff_failure",
            Error::UnsupportedMediaType { .. } => "unsupported_media_type",
            Error::WriteFailure { op: WriteOp::Write, .. } => "write_failure",
            Error::WriteFailure { op: WriteOp::Delete, .. } => "delete_failure",
            Error::NotFound(_) => "not_found",
            Error::NoAvatar(_) => "no_avatar",
            Error::PersistenceFailure { .. } => "persistence_failure",
            Error::Validation(_) => "validation_error",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::WriteFailure`].
    pub fn write_failure(op: WriteOp, path: impl Into<String>, source: std::io::Error) -> Self {
        Error::WriteFailure {
            op,
            path: path.into(),
            source,
        }
    }

    /// Convenience constructor for [`Error::PersistenceFailure`].
    pub fn persistence(
        user_id: i64,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::PersistenceFailure {
            user_id,
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
