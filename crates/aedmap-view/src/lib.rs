//! Filtering, ranking, nearest-unit selection and the map/list view pipeline.
//!
//! Data flows one way: normalized records → [`filter`] → [`geo`] ranking →
//! nearest pass ([`sync::recompute`]) → one [`OrderedView`] handed to every
//! renderer. [`Session`] owns all mutable state and is the only thing that
//! triggers a recompute.

pub mod filter;
pub mod geo;
pub mod links;
pub mod nearest;
pub mod session;
pub mod sync;

pub use filter::{filter, parish_options};
pub use geo::{haversine_km, rank, ViewEntry};
pub use nearest::{
    GeolocationError, LocateError, LocateOutcome, LocatorState, NearestLocator, PositionFix,
    PositionProvider, PositionRequest,
};
pub use session::{LoadReport, Session};
pub use sync::{recompute, OrderedView, ViewRenderer, ViewSignal, ViewSync};
