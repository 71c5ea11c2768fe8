//! Route handlers for the HTTP API.

pub mod avatars;
pub mod health;
pub mod users;

use avatar_core::Error;
use avatar_db::models::User;
use avatar_store::AvatarStore;
use serde::Serialize;

/// Parse a `{id}` path segment into a user id.
pub(crate) fn parse_user_id(raw: &str) -> avatar_core::Result<i64> {
    raw.parse()
        .map_err(|_| Error::Validation(format!("Invalid user id '{raw}'")))
}

/// Public view of a user record.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    /// Storage-relative avatar path, if one is set.
    pub avatar_path: Option<String>,
    /// Public URL of the avatar, if one is set.
    pub avatar_url: Option<String>,
}

impl UserResponse {
    pub(crate) fn from_model(user: User, store: &AvatarStore) -> Self {
        let avatar_url = user.avatar_path.as_deref().map(|p| store.resolve_url(p));
        Self {
            id: user.id,
            username: user.username,
            avatar_path: user.avatar_path,
            avatar_url,
        }
    }
}
