//! Single owner of the mutable map state.
//!
//! A [`Session`] holds the loaded catalogue, the filter, the user's location
//! and the locator, and is the only place that rebuilds and publishes the
//! view. Every mutation ends in exactly one full recompute.

use std::sync::Arc;

use aedmap_core::{FilterState, Record, UserLocation};
use aedmap_source::{RecordSource, SourceError};

use crate::filter::parish_options;
use crate::nearest::{
    GeolocationError, LocateError, LocateOutcome, LocatorState, NearestLocator, PositionFix,
    PositionProvider, PositionRequest,
};
use crate::sync::{recompute, OrderedView, ViewRenderer, ViewSignal, ViewSync};

/// Summary of a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub generation: u64,
    /// Records in the new catalogue.
    pub loaded: usize,
    /// Records visible under the current filter.
    pub visible: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded,
    Failed(String),
}

pub struct Session<M, L> {
    records: Vec<Arc<Record>>,
    load_state: LoadState,
    generation: u64,
    filter: FilterState,
    user_location: Option<UserLocation>,
    locator: NearestLocator,
    sync: ViewSync<M, L>,
    view: OrderedView,
}

impl<M: ViewRenderer, L: ViewRenderer> Session<M, L> {
    /// Creates an empty session and publishes the initial not-loaded view.
    pub fn new(map: M, list: L, request: PositionRequest) -> Self {
        let mut session = Self {
            records: Vec::new(),
            load_state: LoadState::NotLoaded,
            generation: 0,
            filter: FilterState::default(),
            user_location: None,
            locator: NearestLocator::new(request),
            sync: ViewSync::new(map, list),
            view: OrderedView::default(),
        };
        session.rebuild();
        session
    }

    /// Fetches a fresh catalogue from `source` and replaces the current one.
    ///
    /// Filter and user location survive a reload, so the nearest designation
    /// is re-derived against the new records.
    ///
    /// # Errors
    ///
    /// Returns the source's [`SourceError`]. The catalogue is emptied and the
    /// published view carries [`ViewSignal::LoadFailed`].
    pub async fn reload<S: RecordSource>(&mut self, source: &S) -> Result<LoadReport, SourceError> {
        match source.fetch_records().await {
            Ok(records) => Ok(self.load_records(records)),
            Err(e) => {
                tracing::error!(error = %e, "failed to load defibrillator records");
                self.records.clear();
                self.generation += 1;
                self.load_state = LoadState::Failed(e.to_string());
                self.rebuild();
                Err(e)
            }
        }
    }

    /// Installs an already-normalized catalogue.
    pub fn load_records(&mut self, records: Vec<Record>) -> LoadReport {
        self.records = records.into_iter().map(Arc::new).collect();
        self.generation += 1;
        self.load_state = LoadState::Loaded;
        self.rebuild();

        let report = LoadReport {
            generation: self.generation,
            loaded: self.records.len(),
            visible: self.view.len(),
        };
        tracing::info!(
            generation = report.generation,
            loaded = report.loaded,
            visible = report.visible,
            "catalogue loaded"
        );
        report
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        tracing::debug!(parish = ?filter.parish, status = ?filter.status, "filter changed");
        self.filter = filter;
        self.rebuild();
    }

    /// Starts a locate run and returns the request to hand the provider.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::InFlight`] if a run is already in progress.
    pub fn begin_locate(&mut self) -> Result<PositionRequest, LocateError> {
        let request = self.locator.begin()?;
        tracing::debug!(
            timeout_ms = request.timeout.as_millis(),
            high_accuracy = request.high_accuracy,
            "locating user"
        );
        Ok(request)
    }

    /// Finishes a locate run with the provider's result.
    ///
    /// On success the location is stored and the view rebuilt; the outcome
    /// names the nearest eligible unit, if any. On failure nothing but the
    /// locator changes. The locator is always back to idle afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::NotLocating`] without a preceding
    /// [`Session::begin_locate`].
    pub fn complete_locate(
        &mut self,
        result: Result<PositionFix, GeolocationError>,
    ) -> Result<LocateOutcome, LocateError> {
        let state = self.locator.resolve(result)?;

        let outcome = if let LocatorState::Succeeded(location) = state {
            self.user_location = Some(location);
            self.rebuild();
            match self.view.nearest() {
                Some(entry) => LocateOutcome::Nearest {
                    id: entry.record.id.clone(),
                    distance_km: entry.distance_km.unwrap_or_default(),
                },
                None => LocateOutcome::NoEligibleUnit,
            }
        } else {
            let err = state
                .failure()
                .unwrap_or(GeolocationError::PositionUnavailable);
            tracing::warn!(error = %err, "could not determine user location");
            LocateOutcome::Failed(err)
        };

        self.locator.finish();
        Ok(outcome)
    }

    /// Runs a full locate against `provider`, bounded by the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::InFlight`] if a run is already in progress.
    pub async fn locate<P: PositionProvider>(
        &mut self,
        provider: &P,
    ) -> Result<LocateOutcome, LocateError> {
        let request = self.begin_locate()?;
        let result = tokio::time::timeout(request.timeout, provider.current_position(&request))
            .await
            .unwrap_or(Err(GeolocationError::Timeout));
        self.complete_locate(result)
    }

    #[must_use]
    pub fn view(&self) -> &OrderedView {
        &self.view
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn user_location(&self) -> Option<&UserLocation> {
        self.user_location.as_ref()
    }

    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.locator.is_locating()
    }

    #[must_use]
    pub fn locator_state(&self) -> &LocatorState {
        self.locator.state()
    }

    /// Parishes present in the loaded catalogue, sorted.
    #[must_use]
    pub fn parish_options(&self) -> Vec<String> {
        parish_options(&self.records)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn renderers(&self) -> &ViewSync<M, L> {
        &self.sync
    }

    pub fn into_renderers(self) -> (M, L) {
        self.sync.into_parts()
    }

    fn rebuild(&mut self) {
        let mut view = match &self.load_state {
            LoadState::Loaded => {
                recompute(&self.records, &self.filter, self.user_location.as_ref())
            }
            LoadState::NotLoaded => OrderedView {
                user_location: self.user_location,
                signal: Some(ViewSignal::NotLoaded),
                ..OrderedView::default()
            },
            LoadState::Failed(message) => OrderedView {
                user_location: self.user_location,
                signal: Some(ViewSignal::LoadFailed(message.clone())),
                ..OrderedView::default()
            },
        };
        view.generation = self.generation;
        self.sync.publish(&view);
        self.view = view;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
