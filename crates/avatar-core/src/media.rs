//! Allow-listed image media types.
//!
//! `Display` prints the canonical MIME type, so `ImageMediaType::Jpeg`
//! prints as `image/jpeg`. Sniffed formats enter the allow-list through
//! [`ImageMediaType::from_mime`].

use std::fmt;

/// Image formats accepted as avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
}

impl ImageMediaType {
    /// Canonical MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// File extension used for stored files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// Parse a MIME type. `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpg_alias() {
        assert_eq!(ImageMediaType::from_mime("image/jpg"), Some(ImageMediaType::Jpeg));
        assert_eq!(ImageMediaType::from_mime("IMAGE/JPEG"), Some(ImageMediaType::Jpeg));
        assert_eq!(ImageMediaType::Jpeg.extension(), "jpg");
    }

    #[test]
    fn mime_round_trip() {
        for t in [ImageMediaType::Jpeg, ImageMediaType::Png, ImageMediaType::Gif] {
            assert_eq!(ImageMediaType::from_mime(t.mime_type()), Some(t));
            assert_eq!(t.to_string(), t.mime_type());
        }
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(ImageMediaType::from_mime("image/webp"), None);
        assert_eq!(ImageMediaType::from_mime("text/plain"), None);
    }
}
