//! Outbound links and display formatting for a single unit.

use aedmap_core::GeoPoint;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a query component. Leaves the unreserved marks that
/// browsers leave alone (`- _ . ! ~ * ' ( )`).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=";

/// Google Maps directions link to `destination`.
#[must_use]
pub fn navigation_link(destination: GeoPoint) -> String {
    let coords = format!("{},{}", destination.lat, destination.lng);
    format!(
        "{DIRECTIONS_URL}{}",
        utf8_percent_encode(&coords, QUERY_COMPONENT)
    )
}

/// `tel:` link for the emergency number; whitespace is dropped.
#[must_use]
pub fn telephone_link(number: &str) -> String {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    format!("tel:{digits}")
}

/// Human-readable distance: metres under 1 km, otherwise kilometres to two
/// decimals. Empty when there is no distance.
#[must_use]
pub fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(km) if km.is_finite() && km >= 0.0 => {
            if km < 1.0 {
                format!("{:.0} m", km * 1000.0)
            } else {
                format!("{km:.2} km")
            }
        }
        _ => String::new(),
    }
}
