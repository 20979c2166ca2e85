//! Variant Generator Tests
//!
//! Covers format acceptance, aspect-ratio semantics, original gating,
//! and output ordering for the pure derivation step.

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use uuid::Uuid;

use imagex::domain::account::Entitlement;
use imagex::domain::tier::DimensionSpec;
use imagex::imaging::variants::{generate, VariantError};

fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Bytes {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 20, 60])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    Bytes::from(buf)
}

fn spec(height: Option<u32>, width: Option<u32>) -> DimensionSpec {
    DimensionSpec {
        id: Uuid::new_v4(),
        height,
        width,
    }
}

fn entitlement(original: bool, sizes: Vec<DimensionSpec>) -> Entitlement {
    Entitlement {
        account_id: Uuid::new_v4(),
        allow_original_access: original,
        allow_expiring_links: false,
        image_sizes: sizes,
    }
}

#[test]
fn width_only_preserves_aspect_ratio() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(false, vec![spec(None, Some(150))]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!(variants.len(), 1);
    assert_eq!((variants[0].width, variants[0].height), (150, 75));
    assert!(variants[0].name.ends_with(".jpeg"));
}

#[test]
fn height_only_preserves_aspect_ratio() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(false, vec![spec(Some(50), None)]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!((variants[0].width, variants[0].height), (100, 50));
}

#[test]
fn both_dimensions_ignore_source_aspect_ratio() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(false, vec![spec(Some(50), Some(150))]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!((variants[0].width, variants[0].height), (150, 50));
}

#[test]
fn original_comes_first_when_tier_allows_it() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(true, vec![spec(None, Some(150))]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!(variants.len(), 2);
    assert!(variants[0].size.is_none());
    assert_eq!(variants[0].bytes, source);
    assert_eq!((variants[0].width, variants[0].height), (200, 100));
    assert!(variants[1].size.is_some());
}

#[test]
fn no_original_without_entitlement() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(false, vec![spec(None, Some(150)), spec(Some(50), None)]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!(variants.len(), 2);
    assert!(variants.iter().all(|v| v.size.is_some()));
}

#[test]
fn variants_follow_entitlement_order() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let first = spec(None, Some(150));
    let second = spec(Some(50), None);
    let ent = entitlement(false, vec![first, second]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert_eq!(variants[0].size.unwrap().id, first.id);
    assert_eq!(variants[1].size.unwrap().id, second.id);
}

#[test]
fn png_input_produces_png_variants() {
    let source = encoded_image(64, 64, ImageFormat::Png);
    let ent = entitlement(false, vec![spec(Some(32), None)]);

    let variants = generate(&source, "Logo", &ent).unwrap();

    assert!(variants[0].name.ends_with(".png"));
    assert_eq!(variants[0].format.content_type(), "image/png");
    let decoded = image::load_from_memory(&variants[0].bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 32));
}

#[test]
fn variant_names_carry_the_title() {
    let source = encoded_image(200, 100, ImageFormat::Jpeg);
    let ent = entitlement(true, vec![spec(Some(50), Some(150))]);

    let variants = generate(&source, "Cat", &ent).unwrap();

    assert!(variants.iter().all(|v| v.name.contains("Cat")));
    assert!(variants[1].name.contains("50x150"));
}

#[test]
fn gif_is_rejected_as_unsupported() {
    let source = Bytes::from_static(b"GIF89a\x01\x00\x01\x00\x00\x00\x00;");
    let ent = entitlement(true, vec![spec(None, Some(150))]);

    let err = generate(&source, "Animated", &ent).unwrap_err();
    assert!(matches!(err, VariantError::UnsupportedFormat));
}

#[test]
fn undecodable_bytes_are_rejected_as_invalid() {
    let source = Bytes::from_static(b"definitely not an image");
    let ent = entitlement(true, vec![spec(None, Some(150))]);

    let err = generate(&source, "Broken", &ent).unwrap_err();
    assert!(matches!(err, VariantError::InvalidImage(_)));
}

#[test]
fn truncated_jpeg_fails_whole_call() {
    let mut source = encoded_image(200, 100, ImageFormat::Jpeg).to_vec();
    source.truncate(source.len() / 2);
    let ent = entitlement(true, vec![spec(None, Some(150))]);

    let err = generate(&Bytes::from(source), "Broken", &ent).unwrap_err();
    assert!(matches!(err, VariantError::InvalidImage(_)));
}
