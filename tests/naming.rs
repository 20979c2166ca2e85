//! Name Allocator Tests

use std::collections::HashSet;
use uuid::Uuid;

use imagex::domain::tier::DimensionSpec;
use imagex::imaging::naming::{allocate, random_token, NamingError, NAME_TOKEN_LEN};

fn spec(height: Option<u32>, width: Option<u32>) -> DimensionSpec {
    DimensionSpec {
        id: Uuid::new_v4(),
        height,
        width,
    }
}

#[test]
fn full_name_carries_every_part() {
    let name = allocate(Some("Cat"), Some(&spec(Some(100), Some(200))), Some("jpeg")).unwrap();

    let (prefix, rest) = name.split_once('-').unwrap();
    assert_eq!(prefix.len(), NAME_TOKEN_LEN);
    assert!(prefix.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(rest.contains("Cat"));
    assert!(rest.contains("100x200"));
    assert!(name.ends_with(".jpeg"));
}

#[test]
fn size_part_is_rendered_without_title() {
    let name = allocate(None, Some(&spec(Some(100), Some(200))), Some("jpeg")).unwrap();
    let (_, rest) = name.split_once('-').unwrap();
    assert_eq!(rest, "100x200.jpeg");
}

#[test]
fn single_dimension_sizes_render_alone() {
    let height_only = allocate(None, Some(&spec(Some(100), None)), Some("png")).unwrap();
    assert!(height_only.ends_with("-100.png"));

    let width_only = allocate(None, Some(&spec(None, Some(200))), Some("png")).unwrap();
    assert!(width_only.ends_with("-200.png"));
}

#[test]
fn title_without_size_renders_alone() {
    let name = allocate(Some("Cat"), None, Some("jpeg")).unwrap();
    let (_, rest) = name.split_once('-').unwrap();
    assert_eq!(rest, "Cat.jpeg");
}

#[test]
fn format_token_is_lowercased() {
    let name = allocate(Some("Cat"), None, Some("JPEG")).unwrap();
    assert!(name.ends_with(".jpeg"));
}

#[test]
fn missing_format_is_an_error() {
    assert_eq!(
        allocate(Some("Cat"), None, None).unwrap_err(),
        NamingError::MissingFormat
    );
    assert_eq!(
        allocate(Some("Cat"), None, Some("")).unwrap_err(),
        NamingError::MissingFormat
    );
}

#[test]
fn random_prefixes_do_not_collide_across_a_thousand_calls() {
    let mut prefixes = HashSet::new();
    for _ in 0..1000 {
        let name = allocate(Some("Cat"), Some(&spec(Some(100), Some(200))), Some("jpeg")).unwrap();
        let (prefix, _) = name.split_once('-').unwrap();
        prefixes.insert(prefix.to_string());
    }
    assert_eq!(prefixes.len(), 1000);
}

#[test]
fn random_token_has_requested_length_and_alphabet() {
    let token = random_token(32);
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
}
