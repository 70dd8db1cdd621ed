use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Work site with an optional circular geofence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkLocation {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Head Office")]
    pub name: String,

    /// Missing coordinates exclude the site from geofence checks.
    #[schema(example = 13.7563)]
    pub latitude: Option<f64>,

    #[schema(example = 100.5018)]
    pub longitude: Option<f64>,

    /// Geofence radius in meters. Defaults to 100 when unset.
    #[schema(example = 150.0)]
    pub radius_m: Option<f64>,

    pub is_active: bool,
}
