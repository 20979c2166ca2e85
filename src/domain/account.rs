use uuid::Uuid;

use crate::domain::tier::DimensionSpec;

/// What the owning tier lets an account do. Resolved fresh per request so
/// tier edits take effect immediately.
#[derive(Debug, Clone)]
pub struct Entitlement {
    pub account_id: Uuid,
    pub allow_original_access: bool,
    pub allow_expiring_links: bool,
    pub image_sizes: Vec<DimensionSpec>,
}
