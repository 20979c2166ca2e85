use serde::Serialize;
use uuid::Uuid;

/// One thumbnail target size. At least one dimension is always present;
/// the dimension_specs table enforces this at definition time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DimensionSpec {
    pub id: Uuid,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountTier {
    pub id: Uuid,
    pub name: String,
    pub allow_original_access: bool,
    pub allow_expiring_links: bool,
    pub image_sizes: Vec<DimensionSpec>,
}
