//! Nearest-unit locator: a single-flight state machine around a position
//! request.
//!
//! ```text
//! Idle ──begin──▶ Locating ──resolve──▶ Succeeded | Denied | TimedOut | Unavailable ──finish──▶ Idle
//! ```
//!
//! Only one request may be in flight. There is no mid-flight cancellation;
//! the caller bounds the wait with [`PositionRequest::timeout`] so the
//! machine always reaches a terminal state.

use std::future::Future;
use std::time::Duration;

use aedmap_core::{AppConfig, GeoPoint, UserLocation};
use thiserror::Error;

/// Options for one position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    /// Upper bound on the wait for a fix.
    pub timeout: Duration,
    /// Cached fixes older than this are rejected.
    pub maximum_age: Duration,
    /// Hint that the provider should prefer a precise fix (GPS over network
    /// positioning). Providers without that choice ignore it.
    pub high_accuracy: bool,
}

impl Default for PositionRequest {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(30),
            high_accuracy: true,
        }
    }
}

impl PositionRequest {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.locate_timeout_ms),
            maximum_age: Duration::from_millis(config.locate_max_age_ms),
            high_accuracy: true,
        }
    }
}

/// A position reported by the geolocation collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    /// Accuracy radius in metres.
    pub accuracy_m: Option<f64>,
    /// How old the fix was when it was handed over; zero for a fresh reading.
    pub age: Duration,
}

/// Classified geolocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out")]
    Timeout,

    #[error("position unavailable")]
    PositionUnavailable,
}

impl GeolocationError {
    /// Message shown to the user for this failure.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location permission was denied. You can still browse the map and use filters."
            }
            GeolocationError::Timeout => {
                "Finding your location took too long. Please try again."
            }
            GeolocationError::PositionUnavailable => {
                "Could not get your location. Please try again."
            }
        }
    }
}

/// Misuse of the locator's single-flight protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("a location request is already in flight")]
    InFlight,

    #[error("no location request is in flight")]
    NotLocating,
}

/// Source of the user's current position (browser geolocation, GPS, a
/// fixed test position, ...).
pub trait PositionProvider {
    /// Requests one position fix honouring `request`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`GeolocationError`] when no fix is available.
    fn current_position(
        &self,
        request: &PositionRequest,
    ) -> impl Future<Output = Result<PositionFix, GeolocationError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocatorState {
    Idle,
    Locating,
    Succeeded(UserLocation),
    Denied,
    TimedOut,
    Unavailable,
}

impl LocatorState {
    /// The failure behind a failed terminal state.
    #[must_use]
    pub fn failure(&self) -> Option<GeolocationError> {
        match self {
            LocatorState::Denied => Some(GeolocationError::PermissionDenied),
            LocatorState::TimedOut => Some(GeolocationError::Timeout),
            LocatorState::Unavailable => Some(GeolocationError::PositionUnavailable),
            LocatorState::Idle | LocatorState::Locating | LocatorState::Succeeded(_) => None,
        }
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, LocatorState::Idle | LocatorState::Locating)
    }
}

/// What a completed locate run produced, as reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    /// The nearest eligible unit in the current view.
    Nearest { id: String, distance_km: f64 },
    /// A position was obtained but no visible unit is eligible. Not an error.
    NoEligibleUnit,
    /// No position; records and view state are untouched.
    Failed(GeolocationError),
}

impl LocateOutcome {
    /// Message for the view layer, if this outcome needs one.
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            LocateOutcome::Nearest { .. } => None,
            LocateOutcome::NoEligibleUnit => Some(
                "No active, publicly accessible defibrillators are currently shown with valid coordinates.",
            ),
            LocateOutcome::Failed(err) => Some(err.user_message()),
        }
    }
}

#[derive(Debug)]
pub struct NearestLocator {
    state: LocatorState,
    request: PositionRequest,
}

impl NearestLocator {
    #[must_use]
    pub fn new(request: PositionRequest) -> Self {
        Self {
            state: LocatorState::Idle,
            request,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LocatorState {
        &self.state
    }

    /// `true` while a request is in flight; the locate control should be
    /// disabled for the duration.
    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.state == LocatorState::Locating
    }

    /// Enters `Locating` and returns the request to issue.
    ///
    /// A leftover terminal state is treated as `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::InFlight`] if a request is already in flight.
    pub fn begin(&mut self) -> Result<PositionRequest, LocateError> {
        if self.is_locating() {
            return Err(LocateError::InFlight);
        }
        self.state = LocatorState::Locating;
        Ok(self.request)
    }

    /// Moves from `Locating` to the terminal state matching `result`.
    ///
    /// Fixes older than the staleness tolerance, or with unusable
    /// coordinates, resolve as [`LocatorState::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::NotLocating`] if no request is in flight.
    pub fn resolve(
        &mut self,
        result: Result<PositionFix, GeolocationError>,
    ) -> Result<LocatorState, LocateError> {
        if !self.is_locating() {
            return Err(LocateError::NotLocating);
        }

        self.state = match result.and_then(|fix| self.accept(fix)) {
            Ok(location) => LocatorState::Succeeded(location),
            Err(GeolocationError::PermissionDenied) => LocatorState::Denied,
            Err(GeolocationError::Timeout) => LocatorState::TimedOut,
            Err(GeolocationError::PositionUnavailable) => LocatorState::Unavailable,
        };
        Ok(self.state)
    }

    /// Returns to `Idle` from a terminal state. No-op otherwise.
    pub fn finish(&mut self) {
        if self.state.is_terminal() {
            self.state = LocatorState::Idle;
        }
    }

    fn accept(&self, fix: PositionFix) -> Result<UserLocation, GeolocationError> {
        if fix.age > self.request.maximum_age {
            tracing::debug!(
                age_ms = fix.age.as_millis(),
                max_age_ms = self.request.maximum_age.as_millis(),
                "rejecting stale position fix"
            );
            return Err(GeolocationError::PositionUnavailable);
        }
        let point = GeoPoint::new(fix.lat, fix.lng).ok_or(GeolocationError::PositionUnavailable)?;
        Ok(UserLocation {
            point,
            accuracy_m: fix.accuracy_m.filter(|a| a.is_finite() && *a >= 0.0),
        })
    }
}

impl Default for NearestLocator {
    fn default() -> Self {
        Self::new(PositionRequest::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lng: f64) -> PositionFix {
        PositionFix {
            lat,
            lng,
            accuracy_m: Some(12.0),
            age: Duration::ZERO,
        }
    }

    #[test]
    fn begin_enters_locating_and_returns_request() {
        let mut locator = NearestLocator::default();
        let request = locator.begin().unwrap();
        assert_eq!(request, PositionRequest::default());
        assert!(locator.is_locating());
    }

    #[test]
    fn default_request_asks_for_high_accuracy() {
        let request = PositionRequest::default();
        assert!(request.high_accuracy);
        assert_eq!(request.timeout, Duration::from_secs(10));
        assert_eq!(request.maximum_age, Duration::from_secs(30));
    }

    #[test]
    fn second_begin_while_locating_is_rejected() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        assert_eq!(locator.begin(), Err(LocateError::InFlight));
        assert!(locator.is_locating(), "rejection leaves the request in flight");
    }

    #[test]
    fn resolve_without_begin_is_rejected() {
        let mut locator = NearestLocator::default();
        assert_eq!(
            locator.resolve(Ok(fix(49.18, -2.10))),
            Err(LocateError::NotLocating)
        );
        assert_eq!(*locator.state(), LocatorState::Idle);
    }

    #[test]
    fn success_then_finish_returns_to_idle() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        let state = locator.resolve(Ok(fix(49.18, -2.10))).unwrap();
        match state {
            LocatorState::Succeeded(loc) => {
                assert!((loc.point.lat - 49.18).abs() < 1e-12);
                assert_eq!(loc.accuracy_m, Some(12.0));
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }
        locator.finish();
        assert_eq!(*locator.state(), LocatorState::Idle);
    }

    #[test]
    fn each_failure_kind_has_its_own_terminal_state() {
        for (err, expected) in [
            (GeolocationError::PermissionDenied, LocatorState::Denied),
            (GeolocationError::Timeout, LocatorState::TimedOut),
            (
                GeolocationError::PositionUnavailable,
                LocatorState::Unavailable,
            ),
        ] {
            let mut locator = NearestLocator::default();
            locator.begin().unwrap();
            let state = locator.resolve(Err(err)).unwrap();
            assert_eq!(state, expected);
            assert_eq!(state.failure(), Some(err));
        }
    }

    #[test]
    fn stale_fix_is_unavailable() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        let mut stale = fix(49.18, -2.10);
        stale.age = Duration::from_secs(31);
        assert_eq!(
            locator.resolve(Ok(stale)).unwrap(),
            LocatorState::Unavailable
        );
    }

    #[test]
    fn fix_at_tolerance_is_accepted() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        let mut cached = fix(49.18, -2.10);
        cached.age = Duration::from_secs(30);
        assert!(matches!(
            locator.resolve(Ok(cached)).unwrap(),
            LocatorState::Succeeded(_)
        ));
    }

    #[test]
    fn nonsense_coordinates_are_unavailable() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        assert_eq!(
            locator.resolve(Ok(fix(f64::NAN, -2.10))).unwrap(),
            LocatorState::Unavailable
        );
    }

    #[test]
    fn begin_after_terminal_state_is_allowed() {
        let mut locator = NearestLocator::default();
        locator.begin().unwrap();
        locator.resolve(Err(GeolocationError::Timeout)).unwrap();
        assert!(locator.begin().is_ok());
    }

    #[test]
    fn user_messages_are_distinct() {
        let messages = [
            GeolocationError::PermissionDenied.user_message(),
            GeolocationError::Timeout.user_message(),
            GeolocationError::PositionUnavailable.user_message(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }
}
