pub mod canvas;
pub mod control_panel;
pub mod popups;

use bevy::prelude::*;
use bevy_egui::{EguiContext, PrimaryEguiContext};

use crate::basemap::BasemapTiles;
use crate::config::MapAppConfig;
use crate::connections::ConnectionState;
use crate::data::loader::DataLoader;
use crate::geo::MapView;
use crate::layers::LayerRegistry;

use popups::PopupState;

/// Main UI rendering system - coordinates the control panel, the map
/// canvas, and the marker popups.
pub fn render_map_system(world: &mut World) {
    // Get egui context and clone it (following bevy-inspector-egui pattern)
    let egui_context = world
        .query_filtered::<&mut EguiContext, With<PrimaryEguiContext>>()
        .single(world);

    let Ok(egui_context) = egui_context else {
        return;
    };
    let mut egui_context = egui_context.clone();

    let mut ui_resources = UiResources::extract_from_world(world);
    let ctx = egui_context.get_mut();

    control_panel::show_control_panel(ctx, world, &mut ui_resources);
    canvas::show_map_canvas(ctx, world, &mut ui_resources);
    popups::show_popups(ctx, world, &mut ui_resources);

    ui_resources.restore_to_world(world);
}

/// Container for UI resources to avoid repeated extract/restore cycles
pub struct UiResources {
    pub view: MapView,
    pub config: MapAppConfig,
    pub registry: LayerRegistry,
    pub connections: ConnectionState,
    pub loader: DataLoader,
    pub popups: PopupState,
    pub basemap: BasemapTiles,
    /// Rectangle the canvas occupied this frame; set during the canvas
    /// pass, read by the popup pass.
    pub canvas_rect: egui::Rect,
}

impl UiResources {
    /// Extract all UI resources from the world
    pub fn extract_from_world(world: &mut World) -> Self {
        Self {
            view: world.remove_resource::<MapView>().unwrap_or_default(),
            config: world.remove_resource::<MapAppConfig>().unwrap_or_default(),
            registry: world.remove_resource::<LayerRegistry>().unwrap_or_default(),
            connections: world.remove_resource::<ConnectionState>().unwrap_or_default(),
            loader: world.remove_resource::<DataLoader>().unwrap_or_default(),
            popups: world.remove_resource::<PopupState>().unwrap_or_default(),
            basemap: world.remove_resource::<BasemapTiles>().unwrap_or_default(),
            canvas_rect: egui::Rect::ZERO,
        }
    }

    /// Restore all UI resources back to the world
    pub fn restore_to_world(self, world: &mut World) {
        world.insert_resource(self.view);
        world.insert_resource(self.config);
        world.insert_resource(self.registry);
        world.insert_resource(self.connections);
        world.insert_resource(self.loader);
        world.insert_resource(self.popups);
        world.insert_resource(self.basemap);
    }
}
