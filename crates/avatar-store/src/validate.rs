//! Upload validation: size limit and magic-number media type sniffing.

use avatar_core::{Error, ImageMediaType, Result};
use image::{ImageError, ImageFormat};

/// Reported when the content carries no recognizable image signature.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Check `data` against the size limit and the image allow-list.
///
/// The media type is determined from the leading bytes of the content
/// only; any client-declared content type is ignored.
pub fn validate(data: &[u8], max_size: usize) -> Result<ImageMediaType> {
    if data.len() > max_size {
        return Err(Error::PayloadTooLarge { limit: max_size });
    }

    let format = sniff(data)?;
    let Some(format) = format else {
        return Err(Error::UnsupportedMediaType {
            detected: UNKNOWN_MIME.to_string(),
        });
    };

    let mime = format.to_mime_type();
    ImageMediaType::from_mime(mime).ok_or_else(|| Error::UnsupportedMediaType {
        detected: mime.to_string(),
    })
}

/// Sniff the image format. `Ok(None)` means no known signature matched.
fn sniff(data: &[u8]) -> Result<Option<ImageFormat>> {
    if data.is_empty() {
        return Err(Error::TypeSniffFailure("file is empty".into()));
    }

    match image::guess_format(data) {
        Ok(format) => Ok(Some(format)),
        Err(ImageError::Unsupported(_)) => Ok(None),
        Err(e) => Err(Error::TypeSniffFailure(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\0\x01\0";

    #[test]
    fn accepts_allow_listed_types() {
        assert_eq!(validate(PNG_MAGIC, 1024).unwrap(), ImageMediaType::Png);
        assert_eq!(validate(JPEG_MAGIC, 1024).unwrap(), ImageMediaType::Jpeg);
        assert_eq!(validate(GIF_MAGIC, 1024).unwrap(), ImageMediaType::Gif);
        assert_eq!(validate(b"GIF87a\x01\0\x01\0", 1024).unwrap(), ImageMediaType::Gif);
    }

    #[test]
    fn rejects_oversized_before_sniffing() {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(2048, 0);
        let err = validate(&data, 2047).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { limit: 2047 }));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate(PNG_MAGIC, PNG_MAGIC.len()).is_ok());
        assert!(validate(PNG_MAGIC, PNG_MAGIC.len() - 1).is_err());
    }

    #[test]
    fn text_is_unsupported() {
        let err = validate(b"hello, txt", 1024).unwrap_err();
        match err {
            Error::UnsupportedMediaType { detected } => assert_eq!(detected, UNKNOWN_MIME),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_image_formats_are_unsupported() {
        let webp = b"RIFF\x24\0\0\0WEBPVP8 ";
        match validate(webp, 1024).unwrap_err() {
            Error::UnsupportedMediaType { detected } => assert_eq!(detected, "image/webp"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn spoofed_extension_content_is_sniffed() {
        // A PNG signature wins regardless of what the client claims.
        let mut data = PNG_MAGIC.to_vec();
        data.extend_from_slice(b"rest of file named avatar.jpg");
        assert_eq!(validate(&data, 1024).unwrap(), ImageMediaType::Png);
    }

    #[test]
    fn empty_buffer_is_sniff_failure() {
        let err = validate(&[], 1024).unwrap_err();
        assert!(matches!(err, Error::TypeSniffFailure(_)));
    }
}
