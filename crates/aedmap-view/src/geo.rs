//! Great-circle distance and view ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use aedmap_core::{GeoPoint, Record, UserLocation};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// One row of the rendered view: a record plus the values derived for it in
/// this pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub record: Arc<Record>,
    /// Present only when a user location exists and the record has valid
    /// coordinates.
    pub distance_km: Option<f64>,
    /// Set on at most one entry per view.
    pub nearest: bool,
}

/// Haversine distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Orders records for display.
///
/// With a user location, entries get a distance and sort ascending by it,
/// records without usable coordinates last. Without one, every distance is
/// `None` and entries sort by name, ignoring case and accents. Both sorts are stable, so ties keep their input order.
#[must_use]
pub fn rank(records: Vec<Arc<Record>>, user: Option<&UserLocation>) -> Vec<ViewEntry> {
    let mut entries: Vec<ViewEntry> = records
        .into_iter()
        .map(|record| {
            let distance_km = user
                .zip(record.coordinates())
                .map(|(u, point)| haversine_km(u.point, point));
            ViewEntry {
                record,
                distance_km,
                nearest: false,
            }
        })
        .collect();

    if user.is_some() {
        entries.sort_by(|a, b| cmp_distance(a.distance_km, b.distance_km));
    } else {
        entries.sort_by_cached_key(|e| name_key(&e.record.name));
    }

    entries
}

/// Collation key for names: accents and case are ignored first, so
/// `"École"` sorts among the `e`s; the plain lowercase name then puts
/// `"ecole"` ahead of `"école"`.
fn name_key(name: &str) -> (String, String) {
    let base = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    (base, name.to_lowercase())
}

fn cmp_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
