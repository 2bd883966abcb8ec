//! The side panel: layer visibility controls and a clickable VC index.

use bevy::prelude::*;

use crate::config::MapAppConfig;
use crate::connections::{ConnectionMode, ConnectionState};
use crate::geo::{GeoPoint, MapView};
use crate::layers::{LayerId, LayerRegistry};
use crate::markers::MapMarker;

use super::popups::PopupState;
use super::UiResources;

/// Zoom applied when a list entry recenters the map on its VC.
const LIST_FOCUS_ZOOM: f64 = 13.0;

pub fn show_control_panel(ctx: &egui::Context, world: &mut World, res: &mut UiResources) {
    egui::SidePanel::right("layer-controls")
        .resizable(false)
        .default_width(190.0)
        .show(ctx, |ui| {
            ui.heading("Layers");
            ui.separator();

            let mut show_vcs = res.registry.is_attached(LayerId::VentureCapitals);
            if ui.checkbox(&mut show_vcs, "Venture capitals").changed() {
                res.registry.set_attached(LayerId::VentureCapitals, show_vcs);
            }

            let mut show_startups = res.registry.is_attached(LayerId::Startups);
            if ui.checkbox(&mut show_startups, "Startups").changed() {
                res.registry.set_attached(LayerId::Startups, show_startups);
            }

            // The box mirrors the renderer itself, so switching to one
            // startup's dashed view unchecks it.
            let mut show_connections = all_connections_active(&res.connections, &res.registry);
            if ui.checkbox(&mut show_connections, "All connections").changed() {
                if show_connections {
                    res.connections
                        .show_all(&mut res.loader, &res.config, &mut res.registry);
                } else {
                    res.connections.detach(&mut res.registry);
                }
            }

            ui.separator();
            ui.small(format!(
                "{} venture capitals · {} startups",
                res.registry.members(LayerId::VentureCapitals).len(),
                res.registry.members(LayerId::Startups).len(),
            ));

            ui.separator();
            ui.heading("Venture capitals");
            show_vc_index(ui, world, res);
        });
}

/// Scrollable list of VC names, in load order. Clicking an entry flies
/// the view to the firm and opens its popup.
fn show_vc_index(ui: &mut egui::Ui, world: &mut World, res: &mut UiResources) {
    let entries: Vec<(Entity, String, GeoPoint)> = res
        .registry
        .members(LayerId::VentureCapitals)
        .iter()
        .filter_map(|&entity| {
            world
                .get::<MapMarker>(entity)
                .map(|marker| (entity, marker.name.clone(), marker.position))
        })
        .collect();

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for (entity, name, position) in entries {
                if ui.link(name).clicked() {
                    focus_marker(&mut res.view, &res.config, &mut res.popups, entity, position);
                }
            }
        });
}

/// Whether the unfiltered connection overlay is what is on screen.
fn all_connections_active(connections: &ConnectionState, registry: &LayerRegistry) -> bool {
    connections.mode() == ConnectionMode::All && registry.is_attached(LayerId::Connections)
}

/// Recenter on a marker and open its popup, keeping the view inside the
/// configured bounds and zoom range.
fn focus_marker(
    view: &mut MapView,
    config: &MapAppConfig,
    popups: &mut PopupState,
    entity: Entity,
    position: GeoPoint,
) {
    let mut center = position;
    if let Some(bounds) = config.bounds.as_ref() {
        center = bounds.clamp(center);
    }
    view.center = center;
    view.zoom = LIST_FOCUS_ZOOM.clamp(config.min_zoom, config.max_zoom);
    popups.open(entity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::DataLoader;

    #[test]
    fn startup_view_unchecks_all_connections() {
        let mut connections = ConnectionState::default();
        let mut registry = LayerRegistry::default();
        let mut loader = DataLoader::default();
        let config = MapAppConfig::default();

        connections.show_all(&mut loader, &config, &mut registry);
        assert!(all_connections_active(&connections, &registry));

        connections.show_for_startup(
            GeoPoint::new(-3.71, 40.40),
            &mut loader,
            &config,
            &mut registry,
        );
        assert!(!all_connections_active(&connections, &registry));
    }

    #[test]
    fn detaching_unchecks_all_connections() {
        let mut connections = ConnectionState::default();
        let mut registry = LayerRegistry::default();
        let mut loader = DataLoader::default();
        let config = MapAppConfig::default();

        connections.show_all(&mut loader, &config, &mut registry);
        connections.detach(&mut registry);
        assert!(!all_connections_active(&connections, &registry));
    }

    #[test]
    fn list_focus_recenters_and_opens_popup() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut view = MapView::default();
        let config = MapAppConfig::default();
        let mut popups = PopupState::default();

        let barcelona = GeoPoint::new(2.17, 41.38);
        focus_marker(&mut view, &config, &mut popups, entity, barcelona);
        assert_eq!(view.center, barcelona);
        assert_eq!(view.zoom, LIST_FOCUS_ZOOM);
        assert!(popups.is_open(entity));
    }

    #[test]
    fn list_focus_stays_inside_the_bounds() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut view = MapView::default();
        let config = MapAppConfig::default();
        let mut popups = PopupState::default();

        focus_marker(
            &mut view,
            &config,
            &mut popups,
            entity,
            GeoPoint::new(30.0, 60.0),
        );
        let bounds = config.bounds.as_ref().unwrap();
        assert!(bounds.contains(view.center));
    }
}
