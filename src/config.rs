//! Application configuration. Values can be overridden through
//! environment variables; defaults match the original deployment
//! (data set centered on Spain, CartoCDN light basemap).

use bevy::prelude::*;

use crate::geo::{GeoBounds, GeoPoint};

/// Configuration for data endpoints, the basemap, and the viewport.
#[derive(Resource, Clone)]
pub struct MapAppConfig {
    /// Base URL the JSON documents are fetched from.
    pub data_base_url: String,
    /// Slippy-tile URL template for the basemap.
    pub tile_url_template: String,
    /// Integer zoom level the basemap tiles are fetched at.
    pub tile_zoom: u8,
    /// Initial view center.
    pub center: GeoPoint,
    /// Initial view zoom.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Viewport constraint; `None` lets the view roam freely.
    pub bounds: Option<GeoBounds>,
}

/// Box around mainland Spain and the Canary Islands.
const SPAIN_BOUNDS: GeoBounds = GeoBounds {
    west: -19.0,
    east: 5.0,
    south: 27.0,
    north: 44.5,
};

impl Default for MapAppConfig {
    fn default() -> Self {
        let data_base_url = std::env::var("VCMAP_DATA_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".into());
        let tile_url_template = std::env::var("VCMAP_TILE_URL").unwrap_or_else(|_| {
            "https://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png".into()
        });
        let lat = std::env::var("VCMAP_LAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(40.416775);
        let lon = std::env::var("VCMAP_LON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(-3.703790);
        let zoom: f64 = std::env::var("VCMAP_ZOOM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6.0);
        let unbounded = std::env::var("VCMAP_UNBOUNDED").is_ok();

        Self {
            data_base_url,
            tile_url_template,
            tile_zoom: zoom.round().clamp(1.0, 19.0) as u8,
            center: GeoPoint::new(lon, lat),
            zoom,
            min_zoom: 3.0,
            max_zoom: 19.0,
            bounds: (!unbounded).then_some(SPAIN_BOUNDS),
        }
    }
}

impl MapAppConfig {
    /// Full URL for one of the JSON documents.
    pub fn document_url(&self, document: &str) -> String {
        format!("{}/{}", self.data_base_url.trim_end_matches('/'), document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_url_joins_without_double_slash() {
        let config = MapAppConfig {
            data_base_url: "http://localhost:9000/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.document_url("startups.json"),
            "http://localhost:9000/startups.json"
        );
    }
}
