use serde::{Deserialize, Serialize};

use crate::models::profile_models::Location;

pub const MAP_ZOOM: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// One entry of an OpenStreetMap search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct SearchPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: [f64; 2],
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub marker: Marker,
}

impl MapView {
    pub fn new(result: &GeocodeResult, input: &Location, tile_layer: TileLayer) -> Self {
        let position = [result.latitude, result.longitude];
        let popup = if result.display_name.trim().is_empty() {
            input.label()
        } else {
            result.display_name.clone()
        };
        Self {
            center: position,
            zoom: MAP_ZOOM,
            tile_layer,
            marker: Marker { position, popup },
        }
    }
}
