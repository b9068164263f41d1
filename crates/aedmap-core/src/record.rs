//! Canonical catalogue types shared by every stage of the view pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Operational status of a defibrillator as reported by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    Active,
    #[serde(rename = "Out of Service")]
    OutOfService,
    #[default]
    Unknown,
}

impl Status {
    /// Display label, matching the spelling used by the data source.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::OutOfService => "Out of Service",
            Status::Unknown => "Unknown",
        }
    }

    /// Lenient parse used at the normalization boundary.
    ///
    /// Anything that is not recognisably `Active` or `Out of Service`
    /// collapses to [`Status::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or(Status::Unknown)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "active" => Ok(Status::Active),
            "outofservice" => Ok(Status::OutOfService),
            "unknown" => Ok(Status::Unknown),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Returns `Some` only for finite coordinates inside the WGS84 ranges.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

/// One catalogued defibrillator.
///
/// Produced once per load by the normalizer and never mutated afterwards;
/// distance and nearest designation are derived per view and live on the
/// view entries, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Source-assigned identifier (Airtable record id).
    pub id: String,
    pub name: String,
    pub address: String,
    pub parish: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: Status,
    pub public_access: bool,
    pub access_instructions: String,
    /// Display-ready date, or the raw source value when it did not parse.
    pub last_verified: String,
    /// Image URLs in source order.
    pub images: Vec<String>,
}

impl Record {
    /// A record with the given id and every other field at its default.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            address: String::new(),
            parish: String::new(),
            lat: None,
            lng: None,
            status: Status::Unknown,
            public_access: false,
            access_instructions: String::new(),
            last_verified: String::new(),
            images: Vec::new(),
        }
    }

    /// Map position of this record, if both coordinates are usable.
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat?, self.lng?)
    }

    /// Whether this record may be designated the nearest unit.
    #[must_use]
    pub fn is_nearest_eligible(&self) -> bool {
        self.status == Status::Active && self.public_access && self.coordinates().is_some()
    }
}

/// Exact-match catalogue filter; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub parish: Option<String>,
    pub status: Option<Status>,
}

impl FilterState {
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.parish.as_deref().is_none_or(|p| record.parish == p)
            && self.status.is_none_or(|s| record.status == s)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parish.is_none() && self.status.is_none()
    }
}

/// The user's position for the current session.
///
/// Deliberately not `Serialize`: it is held in memory only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserLocation {
    pub point: GeoPoint,
    /// Reported accuracy radius in metres, when the provider gives one.
    pub accuracy_m: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_source_spellings() {
        assert_eq!(Status::parse("Active"), Status::Active);
        assert_eq!(Status::parse("out of service"), Status::OutOfService);
        assert_eq!(Status::parse("Out-of-Service"), Status::OutOfService);
        assert_eq!(Status::parse("OUT_OF_SERVICE"), Status::OutOfService);
    }

    #[test]
    fn status_parse_defaults_unknown() {
        assert_eq!(Status::parse(""), Status::Unknown);
        assert_eq!(Status::parse("retired"), Status::Unknown);
    }

    #[test]
    fn status_from_str_rejects_garbage() {
        let err = "broken".parse::<Status>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus(ref s) if s == "broken"));
    }

    #[test]
    fn status_serializes_with_display_label() {
        let json = serde_json::to_string(&Status::OutOfService).unwrap();
        assert_eq!(json, "\"Out of Service\"");
    }

    #[test]
    fn coordinates_require_both_values_in_range() {
        let mut record = Record::new("rec1");
        assert!(record.coordinates().is_none());

        record.lat = Some(49.18);
        assert!(record.coordinates().is_none(), "lng missing");

        record.lng = Some(-2.10);
        assert_eq!(
            record.coordinates(),
            Some(GeoPoint {
                lat: 49.18,
                lng: -2.10
            })
        );

        record.lat = Some(149.18);
        assert!(record.coordinates().is_none(), "latitude out of range");

        record.lat = Some(f64::NAN);
        assert!(record.coordinates().is_none(), "NaN latitude");
    }

    #[test]
    fn eligibility_needs_active_public_and_coordinates() {
        let mut record = Record::new("rec1");
        record.lat = Some(49.19);
        record.lng = Some(-2.11);
        record.status = Status::Active;
        record.public_access = true;
        assert!(record.is_nearest_eligible());

        record.public_access = false;
        assert!(!record.is_nearest_eligible());

        record.public_access = true;
        record.status = Status::OutOfService;
        assert!(!record.is_nearest_eligible());

        record.status = Status::Active;
        record.lng = None;
        assert!(!record.is_nearest_eligible());
    }

    #[test]
    fn filter_state_matches_exactly() {
        let mut record = Record::new("rec1");
        record.parish = "St Helier".to_string();
        record.status = Status::Active;

        assert!(FilterState::default().matches(&record));

        let parish = FilterState {
            parish: Some("St Helier".to_string()),
            status: None,
        };
        assert!(parish.matches(&record));

        let other_parish = FilterState {
            parish: Some("st helier".to_string()),
            status: None,
        };
        assert!(!other_parish.matches(&record), "match is case-sensitive");

        let status = FilterState {
            parish: None,
            status: Some(Status::OutOfService),
        };
        assert!(!status.matches(&record));
    }
}
