//! VC / Startup Map
//!
//! An interactive map of venture capital firms and startups: clustered
//! markers, per-marker popups, and toggleable connection lines, rendered
//! with egui on top of Bevy.

use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

pub mod basemap;
pub mod cluster;
pub mod config;
pub mod connections;
pub mod data;
pub mod geo;
pub mod layers;
pub mod markers;
pub mod ui;

pub use config::MapAppConfig;
pub use geo::{GeoBounds, GeoPoint, MapView};

/// Main plugin wiring the map viewer into a Bevy app.
pub struct VcMapPlugin;

impl Plugin for VcMapPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default());

        app.init_resource::<MapAppConfig>()
            .init_resource::<data::loader::DataLoader>()
            .init_resource::<layers::LayerRegistry>()
            .init_resource::<connections::ConnectionState>()
            .init_resource::<ui::popups::PopupState>()
            .init_resource::<basemap::BasemapTiles>();

        app.add_systems(
            Startup,
            (
                setup_map_view,
                data::loader::request_initial_data,
                basemap::request_basemap_tiles,
            ),
        );

        app.add_systems(
            Update,
            (
                data::loader::drain_load_results,
                basemap::drain_basemap_tiles,
                connections::tick_connection_pulse,
            ),
        );

        app.add_systems(EguiPrimaryContextPass, ui::render_map_system);
    }
}

/// Initialize the viewport from configuration, env overrides included.
fn setup_map_view(mut commands: Commands, config: Res<MapAppConfig>) {
    commands.insert_resource(MapView {
        center: config.center,
        zoom: config.zoom,
    });
}
