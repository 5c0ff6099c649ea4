//! Uploaded image validation.

use image::ImageFormat;

use crate::error::CoreError;

/// Maximum accepted image size (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions, lower-case.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    /// Normalized lower-case extension.
    pub extension: String,
    pub content_type: &'static str,
}

/// Check an uploaded file's name, size and content.
///
/// The extension must be allowed, the size within [`MAX_IMAGE_BYTES`], and
/// the bytes must sniff as an image in one of the accepted formats.
pub fn validate_image_upload(filename: &str, data: &[u8]) -> Result<ValidatedImage, CoreError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported image format '.{extension}'. Supported: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    if data.is_empty() {
        return Err(CoreError::Validation(format!("File '{filename}' is empty")));
    }

    if data.len() > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "File '{filename}' is {} bytes; the limit is {MAX_IMAGE_BYTES}",
            data.len()
        )));
    }

    let content_type = match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => {
            return Err(CoreError::Validation(format!(
                "File '{filename}' is not a readable image"
            )))
        }
    };

    Ok(ValidatedImage {
        extension,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn accepts_png_and_jpeg() {
        let png = validate_image_upload("front.PNG", PNG_MAGIC).unwrap();
        assert_eq!(png.extension, "png");
        assert_eq!(png.content_type, "image/png");

        let jpeg = validate_image_upload("side.jpeg", JPEG_MAGIC).unwrap();
        assert_eq!(jpeg.content_type, "image/jpeg");
    }

    #[test]
    fn rejects_unsupported_extension() {
        assert_matches!(
            validate_image_upload("car.gif", PNG_MAGIC),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_image_upload("noextension", PNG_MAGIC),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_empty_and_oversized_files() {
        assert_matches!(
            validate_image_upload("car.png", &[]),
            Err(CoreError::Validation(_))
        );
        let mut big = PNG_MAGIC.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert_matches!(
            validate_image_upload("car.png", &big),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_non_image_content() {
        assert_matches!(
            validate_image_upload("car.jpg", b"definitely not an image"),
            Err(CoreError::Validation(_))
        );
    }
}
