//! Relative path allocation and resolution.
//!
//! Relative paths always use `/` separators, independent of the host OS, and
//! have the shape `avatars/{user_id}/{uuid}.{ext}`.

use std::path::{Component, Path, PathBuf};

use avatar_core::ImageMediaType;
use uuid::Uuid;

/// Top-level directory (under the storage root) holding all avatars.
pub const AVATAR_DIR: &str = "avatars";

/// Allocate a fresh relative path for a user's avatar.
///
/// The file stem is a random v4 UUID, so no lookup is needed to avoid
/// collisions.
pub fn allocate(user_id: i64, media_type: ImageMediaType) -> String {
    format!(
        "{AVATAR_DIR}/{user_id}/{}.{}",
        Uuid::new_v4(),
        media_type.extension()
    )
}

/// Relative directory holding a user's avatars.
pub fn user_dir(user_id: i64) -> String {
    format!("{AVATAR_DIR}/{user_id}")
}

/// Normalize separators to `/`.
pub fn normalize(relative_path: &str) -> String {
    relative_path.replace('\\', "/")
}

/// Join a relative avatar path onto `root`.
///
/// Returns `None` for paths that could escape the avatar tree: absolute
/// paths, `.`/`..` components, empty segments, or anything not under
/// `avatars/`.
pub fn resolve(root: &Path, relative_path: &str) -> Option<PathBuf> {
    let normalized = normalize(relative_path);
    let mut segments = normalized.split('/');
    if segments.next() != Some(AVATAR_DIR) {
        return None;
    }

    let mut resolved = root.join(AVATAR_DIR);
    let mut depth = 0;
    for segment in segments {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == segment => resolved.push(part),
            _ => return None,
        }
        depth += 1;
    }

    (depth > 0).then_some(resolved)
}

/// Convert an absolute path under `root` back to a `/`-separated relative path.
pub fn relativize(root: &Path, absolute: &Path) -> Option<String> {
    let rel = absolute.strip_prefix(root).ok()?;
    let parts = rel
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
