//! The full-rebuild view pipeline shared by the map and the list.
//!
//! Every trigger (load finished, filter changed, position resolved) produces
//! a brand-new [`OrderedView`]; renderers replace their state from it rather
//! than patching, so the map and the list can never disagree on membership,
//! order, or which unit is nearest.

use std::sync::Arc;

use aedmap_core::{FilterState, Record, UserLocation};

use crate::filter::filter;
use crate::geo::{rank, ViewEntry};

/// Why a view is empty, for the view layer to explain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSignal {
    /// The first load has not completed yet.
    NotLoaded,
    /// The last load failed; carries the error text.
    LoadFailed(String),
    /// The catalogue is loaded but nothing passes the current filter.
    NoMatches,
}

/// One atomic, ordered snapshot of what both renderers must show.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedView {
    /// Load generation of the catalogue this view was built from.
    pub generation: u64,
    pub entries: Vec<ViewEntry>,
    pub user_location: Option<UserLocation>,
    pub signal: Option<ViewSignal>,
}

impl OrderedView {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries the map can place: those with valid coordinates, in view order.
    pub fn markers(&self) -> impl Iterator<Item = &ViewEntry> {
        self.entries
            .iter()
            .filter(|e| e.record.coordinates().is_some())
    }

    /// The entry designated nearest, if any.
    #[must_use]
    pub fn nearest(&self) -> Option<&ViewEntry> {
        self.entries.iter().find(|e| e.nearest)
    }
}

/// A consumer of the ordered view (map markers, result list, ...).
pub trait ViewRenderer {
    /// Discards everything previously rendered and renders `view`.
    fn replace(&mut self, view: &OrderedView);
}

/// Hands each view, whole, to the map renderer and then the list renderer.
#[derive(Debug)]
pub struct ViewSync<M, L> {
    map: M,
    list: L,
}

impl<M: ViewRenderer, L: ViewRenderer> ViewSync<M, L> {
    pub fn new(map: M, list: L) -> Self {
        Self { map, list }
    }

    pub fn publish(&mut self, view: &OrderedView) {
        self.map.replace(view);
        self.list.replace(view);
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn into_parts(self) -> (M, L) {
        (self.map, self.list)
    }
}

/// Rebuilds the view from scratch: filter, rank, then the nearest pass.
///
/// The nearest pass runs only with a user location and flags the first
/// eligible entry in distance order, so at most one entry is ever flagged and
/// only from the filtered set. Pure: identical inputs give identical views.
#[must_use]
pub fn recompute(
    records: &[Arc<Record>],
    filter_state: &FilterState,
    user_location: Option<&UserLocation>,
) -> OrderedView {
    let visible = filter(records, filter_state);
    let mut entries = rank(visible, user_location);

    if user_location.is_some() {
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.record.is_nearest_eligible() && e.distance_km.is_some())
        {
            entry.nearest = true;
        }
    }

    let signal = entries.is_empty().then_some(ViewSignal::NoMatches);
    tracing::debug!(
        total = records.len(),
        visible = entries.len(),
        located = user_location.is_some(),
        "view recomputed"
    );

    OrderedView {
        generation: 0,
        entries,
        user_location: user_location.copied(),
        signal,
    }
}
