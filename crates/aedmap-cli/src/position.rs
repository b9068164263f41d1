use std::time::Duration;

use aedmap_view::{GeolocationError, PositionFix, PositionProvider, PositionRequest};

/// Position supplied on the command line.
///
/// Without both coordinates the provider reports the position as
/// unavailable, which the session treats like any other locate failure.
/// The fix is exact as given, so `high_accuracy` has no effect.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedPosition {
    lat: Option<f64>,
    lng: Option<f64>,
    accuracy_m: Option<f64>,
}

impl FixedPosition {
    pub(crate) fn new(lat: Option<f64>, lng: Option<f64>, accuracy_m: Option<f64>) -> Self {
        Self {
            lat,
            lng,
            accuracy_m,
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _request: &PositionRequest,
    ) -> Result<PositionFix, GeolocationError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(PositionFix {
                lat,
                lng,
                accuracy_m: self.accuracy_m,
                age: Duration::ZERO,
            }),
            _ => Err(GeolocationError::PositionUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn both_coordinates_give_a_fresh_fix() {
        let provider = FixedPosition::new(Some(49.18), Some(-2.10), Some(25.0));
        let fix = provider
            .current_position(&PositionRequest::default())
            .await
            .unwrap();
        assert_eq!(fix.age, Duration::ZERO);
        assert_eq!(fix.accuracy_m, Some(25.0));
    }

    #[tokio::test]
    async fn accuracy_hint_does_not_change_the_fix() {
        let provider = FixedPosition::new(Some(49.18), Some(-2.10), None);
        let precise = PositionRequest::default();
        let coarse = PositionRequest {
            high_accuracy: false,
            ..precise
        };
        assert_eq!(
            provider.current_position(&precise).await,
            provider.current_position(&coarse).await
        );
    }

    #[tokio::test]
    async fn missing_coordinate_is_unavailable() {
        let provider = FixedPosition::new(Some(49.18), None, None);
        assert!(!provider.is_set());
        assert_eq!(
            provider
                .current_position(&PositionRequest::default())
                .await,
            Err(GeolocationError::PositionUnavailable)
        );
    }
}
