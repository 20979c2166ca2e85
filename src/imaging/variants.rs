use std::io::Cursor;

use bytes::Bytes;
use image::ImageFormat;
use thiserror::Error;

use crate::domain::account::Entitlement;
use crate::domain::tier::DimensionSpec;
use crate::imaging::{naming, resize};

/// The two raster formats this service accepts. Matched against the
/// decoded bytes, never the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
}

impl SourceFormat {
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn ext(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("image: unsupported format, only png and jpeg are accepted")]
    UnsupportedFormat,
    #[error("image: could not decode uploaded bytes: {0}")]
    InvalidImage(#[source] image::ImageError),
    #[error("failed to encode variant: {0}")]
    Encode(#[source] image::ImageError),
    #[error(transparent)]
    Naming(#[from] naming::NamingError),
}

/// One output of the generator: resized (or passthrough) bytes plus the
/// allocated storage name. `size` is None for the unmodified original.
#[derive(Debug, Clone)]
pub struct GeneratedVariant {
    pub name: String,
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    pub size: Option<DimensionSpec>,
}

/// Derive the full variant set for one upload.
///
/// Pure transformation: no persistence happens here, so a decode failure
/// cannot leave partial state behind. The original comes first when the
/// tier allows it, then one variant per entitled size in tier order.
pub fn generate(
    source: &Bytes,
    title: &str,
    entitlement: &Entitlement,
) -> Result<Vec<GeneratedVariant>, VariantError> {
    let format = image::guess_format(source).map_err(VariantError::InvalidImage)?;
    let format = SourceFormat::from_image_format(format).ok_or(VariantError::UnsupportedFormat)?;
    let decoded = image::load_from_memory_with_format(source, format.image_format())
        .map_err(VariantError::InvalidImage)?;

    let mut variants = Vec::with_capacity(entitlement.image_sizes.len() + 1);

    if entitlement.allow_original_access {
        variants.push(GeneratedVariant {
            name: naming::allocate(Some(title), None, Some(format.ext()))?,
            bytes: source.clone(),
            width: decoded.width(),
            height: decoded.height(),
            format,
            size: None,
        });
    }

    for size in &entitlement.image_sizes {
        let resized = resize::resize(&decoded, size);
        let mut buf = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buf), format.image_format())
            .map_err(VariantError::Encode)?;

        variants.push(GeneratedVariant {
            name: naming::allocate(Some(title), Some(size), Some(format.ext()))?,
            bytes: Bytes::from(buf),
            width: resized.width(),
            height: resized.height(),
            format,
            size: Some(*size),
        });
    }

    Ok(variants)
}
