//! Rendering state for the map page.
//!
//! Everything the Leaflet bridge needs (markers, popups, the area to fit) is
//! derived from `MapViewState`, which lives in the seed `Model` instead of
//! in JS globals.

use serde::Serialize;
use shared::{Coordinate, RankedTrail, ReferencePoint, TrailRecord, haversine_km};

pub const DEFAULT_ZOOM: u8 = 12;
pub const FOCUS_ZOOM: u8 = 14;

/// A trail as shown on the map page, with its distance when known.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedTrail {
    pub trail: TrailRecord,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Reference,
    Trail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lng: f64,
    pub kind: MarkerKind,
    pub title: String,
    pub popup_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    fn around(point: Coordinate) -> Self {
        Self {
            south: point.lat,
            west: point.lon,
            north: point.lat,
            east: point.lon,
        }
    }

    fn extend(&mut self, point: Coordinate) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lon);
        self.east = self.east.max(point.lon);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFocus {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone)]
pub struct MapViewState {
    reference: ReferencePoint,
    displayed: Vec<DisplayedTrail>,
    focus: MapFocus,
}

impl MapViewState {
    pub fn new(reference: ReferencePoint) -> Self {
        let focus = MapFocus {
            lat: reference.lat,
            lng: reference.lng,
            zoom: DEFAULT_ZOOM,
        };
        Self {
            reference,
            displayed: Vec::new(),
            focus,
        }
    }

    pub fn reference(&self) -> &ReferencePoint {
        &self.reference
    }

    pub fn set_reference(&mut self, reference: ReferencePoint) {
        self.reference = reference;
    }

    pub fn displayed(&self) -> &[DisplayedTrail] {
        &self.displayed
    }

    pub fn route_count(&self) -> usize {
        self.displayed.len()
    }

    pub fn focus(&self) -> MapFocus {
        self.focus
    }

    /// Shows `trails` in their given order. Distances are filled in for
    /// trails with a usable coordinate.
    pub fn show_trails(&mut self, trails: &[TrailRecord]) {
        let origin = self.reference.coordinate();
        let origin_valid = origin.is_valid();
        self.displayed = trails
            .iter()
            .map(|trail| DisplayedTrail {
                trail: trail.clone(),
                distance_km: trail
                    .coordinate()
                    .ok()
                    .filter(|_| origin_valid)
                    .map(|coord| haversine_km(origin, coord)),
            })
            .collect();
    }

    pub fn show_ranked(&mut self, ranked: Vec<RankedTrail>) {
        self.displayed = ranked
            .into_iter()
            .map(|ranked| DisplayedTrail {
                trail: ranked.trail,
                distance_km: Some(ranked.distance_km),
            })
            .collect();
    }

    pub fn locate_reference(&mut self) {
        self.focus = MapFocus {
            lat: self.reference.lat,
            lng: self.reference.lng,
            zoom: FOCUS_ZOOM,
        };
    }

    /// Moves the view onto a displayed trail. Returns false when the trail is
    /// not displayed or has no coordinate.
    pub fn center_on_trail(&mut self, trail_id: u32) -> bool {
        let Some(coord) = self
            .displayed
            .iter()
            .find(|shown| shown.trail.id == trail_id)
            .and_then(|shown| shown.trail.coordinate().ok())
        else {
            return false;
        };
        self.focus = MapFocus {
            lat: coord.lat,
            lng: coord.lon,
            zoom: FOCUS_ZOOM,
        };
        true
    }

    /// Reference marker first, then one marker per mappable trail.
    pub fn markers(&self) -> Vec<MarkerSpec> {
        let reference = MarkerSpec {
            lat: self.reference.lat,
            lng: self.reference.lng,
            kind: MarkerKind::Reference,
            title: self.reference.name.clone(),
            popup_lines: vec![
                format!("Latitude: {:.4}", self.reference.lat),
                format!("Longitude: {:.4}", self.reference.lng),
            ],
        };

        std::iter::once(reference)
            .chain(self.displayed.iter().filter_map(|shown| {
                let coord = shown.trail.coordinate().ok()?;
                Some(MarkerSpec {
                    lat: coord.lat,
                    lng: coord.lon,
                    kind: MarkerKind::Trail,
                    title: shown.trail.name.clone(),
                    popup_lines: popup_lines(shown),
                })
            }))
            .collect()
    }

    /// Area covering the reference and every displayed trail, `None` when no
    /// trail is displayed.
    pub fn bounds(&self) -> Option<MapBounds> {
        let mut coords = self
            .displayed
            .iter()
            .filter_map(|shown| shown.trail.coordinate().ok())
            .peekable();
        coords.peek()?;

        let mut bounds = MapBounds::around(self.reference.coordinate());
        for coord in coords {
            bounds.extend(coord);
        }
        Some(bounds)
    }
}

pub fn distance_label(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(km) => format!("{km:.2} km"),
        None => "distance pending".to_string(),
    }
}

fn popup_lines(shown: &DisplayedTrail) -> Vec<String> {
    vec![
        format!("Difficulty: {}", shown.trail.difficulty),
        format!("Features: {}", shown.trail.features_label()),
        format!("Distance: {}", distance_label(shown.distance_km)),
    ]
}
