use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::error::DomainResult;
use crate::model::location::WorkLocation;
use crate::repo;

const ACTIVE_KEY: &str = "active";

/// Active work sites, refreshed every few minutes.
pub static LOCATION_CACHE: Lazy<Cache<&'static str, Vec<WorkLocation>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(4)
        .time_to_live(Duration::from_secs(300)) // 5 min TTL
        .build()
});

/// Active sites for geofence checks, cache-first.
pub async fn active_locations(pool: &MySqlPool) -> DomainResult<Vec<WorkLocation>> {
    if let Some(cached) = LOCATION_CACHE.get(ACTIVE_KEY).await {
        return Ok(cached);
    }

    let locations = repo::location::fetch_active(pool).await?;
    LOCATION_CACHE.insert(ACTIVE_KEY, locations.clone()).await;
    Ok(locations)
}

/// Load the active site list into memory at startup (streamed).
pub async fn warmup_location_cache(pool: &MySqlPool) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String, Option<f64>, Option<f64>, Option<f64>, bool)>(
        r#"
        SELECT id, name, latitude, longitude, radius_m, is_active
        FROM work_locations
        WHERE is_active = TRUE
        "#,
    )
    .fetch(pool);

    let mut locations = Vec::new();
    while let Some(row) = stream.next().await {
        let (id, name, latitude, longitude, radius_m, is_active) = row?;
        locations.push(WorkLocation {
            id,
            name,
            latitude,
            longitude,
            radius_m,
            is_active,
        });
    }

    let total_count = locations.len();
    LOCATION_CACHE.insert(ACTIVE_KEY, locations).await;

    log::info!(
        "Work location cache warmup complete: {} active sites",
        total_count
    );

    Ok(())
}
