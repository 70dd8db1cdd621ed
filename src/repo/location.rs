use sqlx::{FromRow, MySqlPool};

use crate::error::DomainResult;
use crate::model::location::WorkLocation;

#[derive(FromRow)]
struct LocationRow {
    id: u64,
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_m: Option<f64>,
    is_active: bool,
}

pub async fn fetch_active(pool: &MySqlPool) -> DomainResult<Vec<WorkLocation>> {
    let rows = sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, latitude, longitude, radius_m, is_active \
         FROM work_locations WHERE is_active = TRUE",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| WorkLocation {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            radius_m: row.radius_m,
            is_active: row.is_active,
        })
        .collect())
}
