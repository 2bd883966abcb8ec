//! Geographic coordinates, Web Mercator projection, and the pannable
//! map view with its optional bounding box.

use bevy::math::DVec2;
use bevy::prelude::*;

/// Side length of a slippy-map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// A point on the globe in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Project a geographic point into Web Mercator world pixels at the
/// given (fractional) zoom level.
pub fn project(point: GeoPoint, zoom: f64) -> DVec2 {
    let scale = TILE_SIZE * zoom.exp2();
    let x = (point.lon + 180.0) / 360.0 * scale;
    let lat_rad = point.lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    DVec2::new(x, y)
}

/// Inverse of [`project`].
pub fn unproject(world: DVec2, zoom: f64) -> GeoPoint {
    let scale = TILE_SIZE * zoom.exp2();
    let lon = world.x / scale * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * world.y / scale);
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lon, lat)
}

/// Tile column/row containing a point at an integer zoom level.
pub fn tile_for(point: GeoPoint, zoom: u8) -> (u32, u32) {
    let n = 1_i64 << zoom;
    let x_raw = ((point.lon + 180.0) / 360.0 * n as f64).floor() as i64;
    let lat_rad = point.lat.to_radians();
    let y_raw = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * n as f64)
        .floor() as i64;

    let x = ((x_raw % n) + n) % n;
    let y = y_raw.clamp(0, n - 1);
    (x as u32, y as u32)
}

/// North-west corner of a tile, in degrees.
pub fn tile_corner(x: u32, y: u32, zoom: u8) -> GeoPoint {
    let n = (1_u64 << zoom) as f64;
    let lon = x as f64 / n * 360.0 - 180.0;
    let lat = (std::f64::consts::PI * (1.0 - 2.0 * y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    GeoPoint::new(lon, lat)
}

/// A fixed geographic box the view center may not leave. The viewport
/// simply stops at the edges (full drag resistance, no bounce).
#[derive(Debug, Clone, Copy)]
pub struct GeoBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn clamp(&self, point: GeoPoint) -> GeoPoint {
        GeoPoint::new(
            point.lon.clamp(self.west, self.east),
            point.lat.clamp(self.south, self.north),
        )
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.west..=self.east).contains(&point.lon) && (self.south..=self.north).contains(&point.lat)
    }
}

/// Resource holding the current map viewport: a center coordinate and a
/// fractional zoom level. All screen-space conversions go through here.
#[derive(Resource, Debug, Clone)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        // Centered on Spain, same as the data set.
        Self {
            center: GeoPoint::new(-3.703790, 40.416775),
            zoom: 6.0,
        }
    }
}

impl MapView {
    /// Screen position of a geographic point inside the given viewport.
    pub fn to_screen(&self, point: GeoPoint, viewport: egui::Rect) -> egui::Pos2 {
        let center = project(self.center, self.zoom);
        let world = project(point, self.zoom);
        let offset = world - center;
        viewport.center() + egui::vec2(offset.x as f32, offset.y as f32)
    }

    /// Geographic point under a screen position.
    pub fn from_screen(&self, pos: egui::Pos2, viewport: egui::Rect) -> GeoPoint {
        let center = project(self.center, self.zoom);
        let delta = pos - viewport.center();
        unproject(center + DVec2::new(delta.x as f64, delta.y as f64), self.zoom)
    }

    /// Shift the view center by a screen-space delta, then clamp to the
    /// configured bounds.
    pub fn pan_pixels(&mut self, delta: egui::Vec2, bounds: Option<&GeoBounds>) {
        let center = project(self.center, self.zoom);
        let moved = center + DVec2::new(delta.x as f64, delta.y as f64);
        self.center = unproject(moved, self.zoom);
        if let Some(bounds) = bounds {
            self.center = bounds.clamp(self.center);
        }
    }

    /// Adjust zoom by a delta, clamped to the allowed range.
    pub fn zoom_by(&mut self, delta: f64, min_zoom: f64, max_zoom: f64) {
        self.zoom = (self.zoom + delta).clamp(min_zoom, max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MADRID: GeoPoint = GeoPoint::new(-3.70, 40.42);

    #[test]
    fn project_unproject_roundtrip() {
        for zoom in [2.0, 6.0, 11.5] {
            let world = project(MADRID, zoom);
            let back = unproject(world, zoom);
            assert!((back.lon - MADRID.lon).abs() < 1e-9);
            assert!((back.lat - MADRID.lat).abs() < 1e-9);
        }
    }

    #[test]
    fn tile_for_madrid_at_zoom_six() {
        assert_eq!(tile_for(MADRID, 6), (31, 24));
    }

    #[test]
    fn tile_corner_is_north_west_of_contents() {
        let (x, y) = tile_for(MADRID, 6);
        let nw = tile_corner(x, y, 6);
        let se = tile_corner(x + 1, y + 1, 6);
        assert!(nw.lon <= MADRID.lon && MADRID.lon < se.lon);
        assert!(se.lat < MADRID.lat && MADRID.lat <= nw.lat);
    }

    #[test]
    fn bounds_clamp_stops_at_edges() {
        let bounds = GeoBounds {
            west: -19.0,
            east: 5.0,
            south: 27.0,
            north: 44.5,
        };
        let clamped = bounds.clamp(GeoPoint::new(30.0, 60.0));
        assert_eq!(clamped.lon, 5.0);
        assert_eq!(clamped.lat, 44.5);
        assert!(bounds.contains(clamped));
        // Points already inside are untouched.
        assert_eq!(bounds.clamp(MADRID), MADRID);
    }

    #[test]
    fn pan_respects_bounds() {
        let bounds = GeoBounds {
            west: -19.0,
            east: 5.0,
            south: 27.0,
            north: 44.5,
        };
        let mut view = MapView::default();
        view.pan_pixels(egui::vec2(1e6, 0.0), Some(&bounds));
        assert!(view.center.lon <= 5.0);
    }

    #[test]
    fn screen_roundtrip_matches() {
        let view = MapView::default();
        let viewport = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 800.0));
        let pos = view.to_screen(MADRID, viewport);
        let back = view.from_screen(pos, viewport);
        assert!((back.lon - MADRID.lon).abs() < 1e-6);
        assert!((back.lat - MADRID.lat).abs() < 1e-6);
    }
}
