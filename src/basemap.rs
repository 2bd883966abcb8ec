//! Basemap tiles behind the markers.
//!
//! A small slippy-tile grid around the configured center is fetched once
//! at startup on a background thread, decoded, registered as egui
//! textures, and painted at each tile's projected geographic rectangle.
//! Markers never depend on the basemap; a failed fetch only means a plain
//! background.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_egui::EguiUserTextures;

use crate::config::MapAppConfig;
use crate::geo::{tile_corner, tile_for, GeoPoint};

/// How many tile rings around the center tile to fetch (2 → a 5x5 grid).
const GRID_RADIUS: i64 = 2;

/// Credit owed to the tile providers whenever their tiles are on screen.
pub const ATTRIBUTION: &str = "© OpenStreetMap contributors · © CARTO";

/// A decoded tile waiting to become a texture.
struct FetchedTile {
    x: u32,
    y: u32,
    zoom: u8,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// A tile ready to draw.
pub struct BasemapTile {
    pub texture: egui::TextureId,
    /// North-west and south-east geographic corners.
    pub nw: GeoPoint,
    pub se: GeoPoint,
    /// Held so the image asset stays alive as long as the tile does.
    pub handle: Handle<Image>,
}

/// Resource owning the fetch channel and the finished tiles.
#[derive(Resource)]
pub struct BasemapTiles {
    tx: Sender<FetchedTile>,
    rx: Mutex<Receiver<FetchedTile>>,
    pub tiles: Vec<BasemapTile>,
}

impl Default for BasemapTiles {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            tiles: Vec::new(),
        }
    }
}

impl BasemapTiles {
    /// Provider credit to display, once any tile has loaded.
    pub fn attribution(&self) -> Option<&'static str> {
        (!self.tiles.is_empty()).then_some(ATTRIBUTION)
    }
}

/// Startup system: fetch the tile grid around the configured center.
pub fn request_basemap_tiles(config: Res<MapAppConfig>, tiles: Res<BasemapTiles>) {
    let (center_x, center_y) = tile_for(config.center, config.tile_zoom);
    let template = config.tile_url_template.clone();
    let zoom = config.tile_zoom;
    let tx = tiles.tx.clone();

    thread::spawn(move || {
        let client = reqwest::blocking::Client::new();
        let n = 1_i64 << zoom;
        for dy in -GRID_RADIUS..=GRID_RADIUS {
            for dx in -GRID_RADIUS..=GRID_RADIUS {
                let y = center_y as i64 + dy;
                if !(0..n).contains(&y) {
                    continue;
                }
                let x = (center_x as i64 + dx).rem_euclid(n) as u32;
                match fetch_tile(&client, &template, x, y as u32, zoom) {
                    Ok(tile) => {
                        if tx.send(tile).is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!("failed to fetch basemap tile {x}/{y}: {err}"),
                }
            }
        }
    });
}

/// Download and decode a single tile.
fn fetch_tile(
    client: &reqwest::blocking::Client,
    template: &str,
    x: u32,
    y: u32,
    zoom: u8,
) -> Result<FetchedTile, String> {
    let url = template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string());
    let response = client
        .get(&url)
        .send()
        .map_err(|err| format!("request error: {err}"))?;
    if !response.status().is_success() {
        return Err(format!("tile server responded with {}", response.status()));
    }
    let bytes = response
        .bytes()
        .map_err(|err| format!("failed to read tile response: {err}"))?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|err| format!("failed to decode tile image: {err}"))?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(FetchedTile {
        x,
        y,
        zoom,
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Update system: turn finished downloads into egui textures.
pub fn drain_basemap_tiles(
    mut tiles: ResMut<BasemapTiles>,
    mut images: ResMut<Assets<Image>>,
    mut user_textures: ResMut<EguiUserTextures>,
) {
    let fetched: Vec<FetchedTile> = {
        let Ok(rx) = tiles.rx.lock() else {
            return;
        };
        let mut fetched = Vec::new();
        while let Ok(tile) = rx.try_recv() {
            fetched.push(tile);
        }
        fetched
    };

    for tile in fetched {
        let image = Image::new(
            Extent3d {
                width: tile.width,
                height: tile.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            tile.rgba,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        );
        let handle = images.add(image);
        let texture = user_textures.add_image(bevy_egui::EguiTextureHandle::Weak(handle.id()));
        tiles.tiles.push(BasemapTile {
            texture,
            nw: tile_corner(tile.x, tile.y, tile.zoom),
            se: tile_corner(tile.x + 1, tile.y + 1, tile.zoom),
            handle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_appears_with_the_first_tile() {
        let mut tiles = BasemapTiles::default();
        assert_eq!(tiles.attribution(), None);

        tiles.tiles.push(BasemapTile {
            texture: egui::TextureId::default(),
            nw: tile_corner(31, 24, 6),
            se: tile_corner(32, 25, 6),
            handle: Handle::default(),
        });
        let credit = tiles.attribution().unwrap();
        assert!(credit.contains("OpenStreetMap"));
        assert!(credit.contains("CARTO"));
    }
}
