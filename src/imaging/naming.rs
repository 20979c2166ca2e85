use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;

use crate::domain::tier::DimensionSpec;

/// Length of the random prefix on storage names. The storage layer still
/// enforces uniqueness as a hard constraint.
pub const NAME_TOKEN_LEN: usize = 10;

/// Expiring-link tokens are longer since they double as capability secrets.
pub const LINK_TOKEN_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("image format token is required")]
    MissingFormat,
}

/// Cryptographically random token over letters and digits.
pub fn random_token(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Build a storage name: `<random>-<title><size>.<ext>`.
///
/// Every computed part is appended to the stem unconditionally; the
/// extension comes from the supplied format token, never a filename.
pub fn allocate(
    title: Option<&str>,
    size: Option<&DimensionSpec>,
    format: Option<&str>,
) -> Result<String, NamingError> {
    let format = match format {
        Some(format) if !format.is_empty() => format,
        _ => return Err(NamingError::MissingFormat),
    };

    let mut stem = String::new();
    if let Some(title) = title {
        stem.push_str(&sanitize_title(title));
    }
    if let Some(size) = size {
        stem.push_str(&size_part(size));
    }

    Ok(format!(
        "{}-{}.{}",
        random_token(NAME_TOKEN_LEN),
        stem,
        format.to_lowercase()
    ))
}

fn size_part(size: &DimensionSpec) -> String {
    match (size.height, size.width) {
        (Some(height), Some(width)) => format!("{}x{}", height, width),
        (Some(height), None) => height.to_string(),
        (None, Some(width)) => width.to_string(),
        (None, None) => String::new(),
    }
}

fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn spec(height: Option<u32>, width: Option<u32>) -> DimensionSpec {
        DimensionSpec {
            id: Uuid::new_v4(),
            height,
            width,
        }
    }

    #[test]
    fn size_part_renders_both_height_first() {
        assert_eq!(size_part(&spec(Some(100), Some(200))), "100x200");
    }

    #[test]
    fn size_part_renders_single_dimension() {
        assert_eq!(size_part(&spec(Some(100), None)), "100");
        assert_eq!(size_part(&spec(None, Some(200))), "200");
    }

    #[test]
    fn sanitize_keeps_safe_chars_and_dashes_spaces() {
        assert_eq!(sanitize_title("My Cat!"), "My-Cat");
        assert_eq!(sanitize_title("snap_01"), "snap_01");
    }
}
