//! Unit tests for the image codec

use anime_portrait::codec::{self, base64, FileHandle};
use anime_portrait::error::AppError;

#[test]
fn test_payload_round_trips_original_bytes() {
    let samples: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x00],
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        (0..=255u8).collect(),
        (0..4099u32).map(|i| (i * 31 % 251) as u8).collect(),
    ];

    for bytes in samples {
        let image = codec::encode(FileHandle::new(None, "image/png", bytes.clone())).unwrap();
        assert_eq!(base64::decode(&image.base64_payload).unwrap(), bytes);
        assert_eq!(base64::decode(&image.preview_reference).unwrap(), bytes);
        assert_eq!(image.raw_bytes, bytes);
    }
}

#[test]
fn test_preview_reference_is_data_uri() {
    let image = codec::encode(FileHandle::new(
        Some("photo.jpg".to_string()),
        "image/jpeg",
        b"Hello, World!".to_vec(),
    ))
    .unwrap();

    assert_eq!(image.base64_payload, "SGVsbG8sIFdvcmxkIQ==");
    assert_eq!(
        image.preview_reference,
        "data:image/jpeg;base64,SGVsbG8sIFdvcmxkIQ=="
    );
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(image.size_bytes(), 13);
}

#[test]
fn test_media_type_parameters_are_dropped() {
    let image = codec::encode(FileHandle::new(
        None,
        "Image/PNG; name=selfie.png",
        b"Hello, World!".to_vec(),
    ))
    .unwrap();

    assert_eq!(image.mime_type, "image/png");
    assert_eq!(
        image.preview_reference,
        "data:image/png;base64,SGVsbG8sIFdvcmxkIQ=="
    );
}

#[test]
fn test_non_image_kinds_are_rejected() {
    for kind in ["application/pdf", "text/plain", "video/mp4", "", "imagepng"] {
        let result = codec::encode(FileHandle::new(None, kind, vec![1, 2, 3]));
        assert!(
            matches!(result, Err(AppError::InvalidInputKind(_))),
            "{kind} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_open_declares_kind_from_extension() {
    let dir = tempfile::tempdir().unwrap();

    let photo = dir.path().join("photo.jpg");
    std::fs::write(&photo, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    let file = FileHandle::open(&photo).await.unwrap();
    assert_eq!(file.media_type, "image/jpeg");
    assert_eq!(file.name.as_deref(), Some("photo.jpg"));
    assert!(codec::encode(file).is_ok());

    let document = dir.path().join("document.pdf");
    std::fs::write(&document, b"%PDF-1.7").unwrap();
    let file = FileHandle::open(&document).await.unwrap();
    assert_eq!(file.media_type, "application/pdf");
    assert!(matches!(
        codec::encode(file),
        Err(AppError::InvalidInputKind(_))
    ));
}

#[tokio::test]
async fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileHandle::open(dir.path().join("missing.png")).await;
    assert!(matches!(result, Err(AppError::Io(_))));
}
