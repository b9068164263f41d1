//! Terminal renderers for the shared ordered view.
//!
//! [`ListRenderer`] builds the result cards as plain text and [`MapRenderer`]
//! builds a JSON marker document a web map can consume. Both are fed the
//! same `OrderedView` by the session and rebuild their output from scratch
//! on every publish.

use aedmap_core::{AppConfig, GeoPoint};
use aedmap_view::links::{format_distance, navigation_link, telephone_link};
use aedmap_view::{OrderedView, ViewEntry, ViewRenderer, ViewSignal};
use serde::Serialize;

const UNNAMED: &str = "Defibrillator";

/// Text for an empty or failed view, if the view carries a signal.
fn signal_text(signal: Option<&ViewSignal>) -> Option<String> {
    match signal? {
        ViewSignal::NotLoaded => Some("Loading defibrillator data...".to_string()),
        ViewSignal::LoadFailed(message) => Some(format!("Could not load data. {message}")),
        ViewSignal::NoMatches => Some("No defibrillators match the current filters.".to_string()),
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct ListRenderer {
    emergency_number: String,
    report_update_url: Option<String>,
    output: String,
}

impl ListRenderer {
    pub(crate) fn new(emergency_number: &str, report_update_url: Option<&str>) -> Self {
        Self {
            emergency_number: emergency_number.to_string(),
            report_update_url: report_update_url.map(str::to_string),
            output: String::new(),
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.emergency_number,
            config.report_update_url.as_deref(),
        )
    }

    /// Text produced by the most recent publish.
    pub(crate) fn output(&self) -> &str {
        &self.output
    }

    fn card_lines(&self, entry: &ViewEntry) -> Vec<String> {
        let record = &entry.record;
        let name = if record.name.is_empty() {
            UNNAMED
        } else {
            record.name.as_str()
        };
        let distance = format_distance(entry.distance_km);

        let mut lines = Vec::new();
        if entry.nearest {
            lines.push(format!("Nearest ({distance})"));
            lines.push(format!("  {name}"));
        } else if distance.is_empty() {
            lines.push(name.to_string());
        } else {
            lines.push(format!("{distance} - {name}"));
        }

        let mut badges = vec![format!("[{}]", record.status)];
        if !record.parish.is_empty() {
            badges.push(format!("[{}]", record.parish));
        }
        if record.public_access {
            badges.push("[Public access]".to_string());
        }
        lines.push(format!("  {}", badges.join(" ")));

        if !record.address.is_empty() {
            lines.push(format!("  {}", record.address));
        }
        if !record.access_instructions.is_empty() {
            lines.push(format!("  Access: {}", record.access_instructions));
        }
        if !record.last_verified.is_empty() {
            lines.push(format!("  Last verified: {}", record.last_verified));
        }
        if let Some(point) = record.coordinates() {
            lines.push(format!("  Navigate: {}", navigation_link(point)));
        }
        lines.push(format!(
            "  Call {}: {}",
            self.emergency_number,
            telephone_link(&self.emergency_number)
        ));
        lines
    }
}

impl ViewRenderer for ListRenderer {
    fn replace(&mut self, view: &OrderedView) {
        let mut lines = Vec::new();

        match &view.signal {
            Some(ViewSignal::LoadFailed(_)) => lines.push("Data load failed".to_string()),
            Some(ViewSignal::NotLoaded) => {}
            _ => lines.push(format!("{} shown", view.len())),
        }
        lines.extend(signal_text(view.signal.as_ref()));

        for entry in &view.entries {
            lines.push(String::new());
            lines.extend(self.card_lines(entry));
        }

        if let Some(url) = &self.report_update_url {
            lines.push(String::new());
            lines.push(format!("Report an update: {url}"));
        }

        self.output = lines.into_iter().map(|line| line + "\n").collect();
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct Marker {
    pub id: String,
    pub name: String,
    pub address: String,
    pub parish: String,
    pub status: String,
    pub access: String,
    pub position: GeoPoint,
    pub nearest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub navigate: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct UserMarker {
    pub position: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

/// Everything a map needs to draw one view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct MapDocument {
    pub center: GeoPoint,
    pub zoom: u8,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub user: Option<UserMarker>,
    pub markers: Vec<Marker>,
}

#[derive(Debug)]
pub(crate) struct MapRenderer {
    document: MapDocument,
}

impl MapRenderer {
    pub(crate) fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            document: MapDocument {
                center,
                zoom,
                generation: 0,
                notice: None,
                user: None,
                markers: Vec::new(),
            },
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::new(config.map_center, config.map_zoom)
    }

    pub(crate) fn document(&self) -> &MapDocument {
        &self.document
    }
}

impl ViewRenderer for MapRenderer {
    fn replace(&mut self, view: &OrderedView) {
        let markers = view
            .markers()
            .filter_map(|entry| {
                let record = &entry.record;
                let position = record.coordinates()?;
                Some(Marker {
                    id: record.id.clone(),
                    name: if record.name.is_empty() {
                        UNNAMED.to_string()
                    } else {
                        record.name.clone()
                    },
                    address: record.address.clone(),
                    parish: record.parish.clone(),
                    status: record.status.label().to_string(),
                    access: record.access_instructions.clone(),
                    position,
                    nearest: entry.nearest,
                    distance_km: entry.distance_km,
                    navigate: navigation_link(position),
                })
            })
            .collect();

        self.document = MapDocument {
            center: self.document.center,
            zoom: self.document.zoom,
            generation: view.generation,
            notice: signal_text(view.signal.as_ref()),
            user: view.user_location.map(|u| UserMarker {
                position: u.point,
                accuracy_m: u.accuracy_m,
            }),
            markers,
        };
    }
}
