use crate::{IntakeConfig, IntakeError, MediaType, UploadedImage, ValidatedImage};

/// Checks type, size and decodability of one upload.
///
/// Decoding uses the declared format, so a JPEG labelled as PNG is rejected.
pub fn validate(image: &UploadedImage, cfg: &IntakeConfig) -> Result<ValidatedImage, IntakeError> {
    let filename = image.filename.clone();

    if image.data.is_empty() {
        return Err(IntakeError::Empty { filename });
    }

    let media_type = MediaType::from_declared(image.content_type.as_deref(), &image.filename)
        .ok_or_else(|| IntakeError::UnsupportedType {
            filename: filename.clone(),
            declared: image
                .content_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        })?;

    if image.data.len() > cfg.max_image_bytes {
        return Err(IntakeError::TooLarge {
            filename,
            size: image.data.len(),
            max: cfg.max_image_bytes,
        });
    }

    let decoded = image::load_from_memory_with_format(&image.data, media_type.image_format())
        .map_err(|e| IntakeError::Decode {
            filename: filename.clone(),
            reason: e.to_string(),
        })?;

    Ok(ValidatedImage {
        filename,
        media_type,
        width: decoded.width(),
        height: decoded.height(),
        data: image.data.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, png_bytes};

    fn upload(name: &str, ct: Option<&str>, data: Vec<u8>) -> UploadedImage {
        UploadedImage::new(name, ct.map(str::to_string), data)
    }

    #[test]
    fn accepts_png_and_jpeg() {
        let cfg = IntakeConfig::default();

        let png = validate(&upload("a.png", Some("image/png"), png_bytes(4, 3)), &cfg).unwrap();
        assert_eq!(png.media_type, MediaType::Png);
        assert_eq!((png.width, png.height), (4, 3));

        let jpg = validate(&upload("b.jpg", Some("image/jpeg"), jpeg_bytes(8, 8)), &cfg).unwrap();
        assert_eq!(jpg.media_type, MediaType::Jpeg);
        assert_eq!((jpg.width, jpg.height), (8, 8));
    }

    #[test]
    fn rejects_empty() {
        let err = validate(&upload("a.png", Some("image/png"), vec![]), &IntakeConfig::default())
            .unwrap_err();
        assert!(matches!(err, IntakeError::Empty { .. }));
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = validate(
            &upload("a.gif", Some("image/gif"), vec![1, 2, 3]),
            &IntakeConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType { .. }));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = validate(
            &upload("a.png", Some("image/png"), b"definitely not a png".to_vec()),
            &IntakeConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IntakeError::Decode { .. }));
    }

    #[test]
    fn rejects_mislabelled_format() {
        let err = validate(
            &upload("a.png", Some("image/png"), jpeg_bytes(2, 2)),
            &IntakeConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IntakeError::Decode { .. }));
    }

    #[test]
    fn rejects_oversized() {
        let cfg = IntakeConfig {
            max_image_bytes: 10,
            ..Default::default()
        };
        let err = validate(&upload("a.png", Some("image/png"), png_bytes(16, 16)), &cfg)
            .unwrap_err();
        assert!(matches!(err, IntakeError::TooLarge { max: 10, .. }));
    }
}
