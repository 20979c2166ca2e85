use image::imageops::FilterType;
use image::DynamicImage;

use crate::domain::tier::DimensionSpec;

/// Pinned resampling filter. Golden tests compare output dimensions and
/// format, so the filter must never vary per call.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Compute the output size for a spec against a source size.
///
/// Both dimensions set: exact target, aspect ratio ignored. One dimension
/// set: the other follows the source aspect ratio, truncated toward zero so
/// repeated resize-then-measure is reproducible. Neither set: passthrough.
pub fn target_dimensions(spec: &DimensionSpec, source_width: u32, source_height: u32) -> (u32, u32) {
    match (spec.width, spec.height) {
        (Some(width), Some(height)) => (width, height),
        (Some(width), None) => {
            let height = (source_height as u64 * width as u64 / source_width as u64) as u32;
            (width, height.max(1))
        }
        (None, Some(height)) => {
            let width = (source_width as u64 * height as u64 / source_height as u64) as u32;
            (width.max(1), height)
        }
        (None, None) => (source_width, source_height),
    }
}

pub fn resize(source: &DynamicImage, spec: &DimensionSpec) -> DynamicImage {
    let (width, height) = target_dimensions(spec, source.width(), source.height());
    if (width, height) == (source.width(), source.height()) {
        return source.clone();
    }
    source.resize_exact(width, height, RESIZE_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use uuid::Uuid;

    fn spec(height: Option<u32>, width: Option<u32>) -> DimensionSpec {
        DimensionSpec {
            id: Uuid::new_v4(),
            height,
            width,
        }
    }

    #[test]
    fn both_dimensions_ignore_source_aspect() {
        assert_eq!(target_dimensions(&spec(Some(50), Some(150)), 200, 100), (150, 50));
    }

    #[test]
    fn width_only_preserves_aspect() {
        assert_eq!(target_dimensions(&spec(None, Some(150)), 200, 100), (150, 75));
    }

    #[test]
    fn height_only_preserves_aspect() {
        assert_eq!(target_dimensions(&spec(Some(50), None), 200, 100), (100, 50));
    }

    #[test]
    fn neither_dimension_is_passthrough() {
        assert_eq!(target_dimensions(&spec(None, None), 200, 100), (200, 100));
    }

    #[test]
    fn derived_dimension_truncates_toward_zero() {
        // 2 * 2 / 3 = 1.33.. -> 1
        assert_eq!(target_dimensions(&spec(None, Some(2)), 3, 2), (2, 1));
    }

    #[test]
    fn derived_dimension_never_collapses_to_zero() {
        assert_eq!(target_dimensions(&spec(None, Some(10)), 1000, 1), (10, 1));
        assert_eq!(target_dimensions(&spec(Some(10), None), 1, 1000), (1, 10));
    }

    #[test]
    fn resize_produces_target_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([10, 20, 30])));
        let resized = resize(&img, &spec(None, Some(150)));
        assert_eq!((resized.width(), resized.height()), (150, 75));
    }

    #[test]
    fn resize_passthrough_keeps_source_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([1, 2, 3])));
        let resized = resize(&img, &spec(None, None));
        assert_eq!((resized.width(), resized.height()), (64, 48));
    }
}
