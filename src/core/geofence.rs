use crate::model::attendance::LocationSnapshot;
use crate::model::location::WorkLocation;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Applied when a site has no radius configured.
pub const DEFAULT_RADIUS_M: f64 = 100.0;

/// Outcome of checking a reported position against the configured sites.
///
/// `NoCandidates` is distinct from being outside every geofence: the caller
/// must be able to tell "nothing is configured" apart from "too far away".
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceCheck {
    NoCandidates,
    Resolved {
        location_id: u64,
        location_name: String,
        distance_m: f64,
        within: bool,
    },
}

/// Great-circle distance between two coordinates in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Checks a reported position against every site that has coordinates and
/// classifies it by the nearest one.
pub fn check_position(latitude: f64, longitude: f64, locations: &[WorkLocation]) -> GeofenceCheck {
    let mut nearest: Option<(&WorkLocation, f64)> = None;

    for location in locations {
        let (Some(lat), Some(lon)) = (location.latitude, location.longitude) else {
            continue;
        };

        let distance = haversine_distance(latitude, longitude, lat, lon);
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((location, distance));
        }
    }

    match nearest {
        None => GeofenceCheck::NoCandidates,
        Some((location, distance_m)) => {
            let radius = location.radius_m.unwrap_or(DEFAULT_RADIUS_M);
            GeofenceCheck::Resolved {
                location_id: location.id,
                location_name: location.name.clone(),
                distance_m,
                within: distance_m <= radius,
            }
        }
    }
}

/// Builds the snapshot stored on the attendance record for a clock event.
pub fn snapshot(latitude: f64, longitude: f64, check: &GeofenceCheck) -> LocationSnapshot {
    match check {
        GeofenceCheck::NoCandidates => LocationSnapshot {
            latitude,
            longitude,
            location_id: None,
            location_name: None,
            distance_m: None,
            within_geofence: false,
        },
        GeofenceCheck::Resolved {
            location_id,
            location_name,
            distance_m,
            within,
        } => LocationSnapshot {
            latitude,
            longitude,
            location_id: Some(*location_id),
            location_name: Some(location_name.clone()),
            distance_m: Some(*distance_m),
            within_geofence: *within,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: u64, lat: f64, lon: f64, radius: Option<f64>) -> WorkLocation {
        WorkLocation {
            id,
            name: format!("Site {}", id),
            latitude: Some(lat),
            longitude: Some(lon),
            radius_m: radius,
            is_active: true,
        }
    }

    #[test]
    fn identical_coordinates_are_within_at_zero_distance() {
        let locations = vec![site(1, 13.7563, 100.5018, Some(50.0))];
        match check_position(13.7563, 100.5018, &locations) {
            GeofenceCheck::Resolved {
                distance_m, within, ..
            } => {
                assert_eq!(distance_m, 0.0);
                assert!(within);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn no_candidates_when_no_location_has_coordinates() {
        let locations = vec![WorkLocation {
            id: 9,
            name: "Remote hub".into(),
            latitude: None,
            longitude: None,
            radius_m: None,
            is_active: true,
        }];
        assert_eq!(
            check_position(13.7563, 100.5018, &locations),
            GeofenceCheck::NoCandidates
        );
        assert_eq!(check_position(13.7563, 100.5018, &[]), GeofenceCheck::NoCandidates);
    }

    #[test]
    fn outside_when_distance_exceeds_radius() {
        // ~0.01 degrees of latitude is roughly 1.1 km.
        let locations = vec![site(1, 13.7563, 100.5018, Some(100.0))];
        match check_position(13.7663, 100.5018, &locations) {
            GeofenceCheck::Resolved {
                distance_m, within, ..
            } => {
                assert!(distance_m > 1_000.0);
                assert!(!within);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn default_radius_applies_when_unset() {
        let locations = vec![site(1, 13.7563, 100.5018, None)];
        // ~55 m north of the site: within the 100 m default.
        match check_position(13.7568, 100.5018, &locations) {
            GeofenceCheck::Resolved { within, .. } => assert!(within),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn nearest_location_wins() {
        let locations = vec![
            site(1, 13.7563, 100.5018, Some(100.0)),
            site(2, 13.7564, 100.5018, Some(100.0)),
        ];
        match check_position(13.75641, 100.5018, &locations) {
            GeofenceCheck::Resolved { location_id, .. } => assert_eq!(location_id, 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
