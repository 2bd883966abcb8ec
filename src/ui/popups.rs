//! Marker popups: floating windows anchored next to their marker.
//!
//! Popup and fund-section visibility are keyed by the marker's `Entity`
//! id, so two entities with the same display name never share state.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::layers::LayerRegistry;
use crate::markers::{EntityKind, MapMarker, StartupDetails, VcDetails};
use crate::ui::canvas::MARKER_RADIUS;

use super::UiResources;

#[derive(Debug, Default)]
pub struct PopupWindow {
    funds_expanded: bool,
}

/// Resource tracking which popups are open and their per-popup UI state.
#[derive(Resource, Default)]
pub struct PopupState {
    open: HashMap<Entity, PopupWindow>,
}

impl PopupState {
    /// Open a marker's popup, or close it if it is already open.
    pub fn toggle_open(&mut self, entity: Entity) {
        if self.open.remove(&entity).is_none() {
            // Fresh popup: the fund section starts collapsed.
            self.open.insert(entity, PopupWindow::default());
        }
    }

    /// Open a marker's popup; an already-open popup keeps its state.
    pub fn open(&mut self, entity: Entity) {
        self.open.entry(entity).or_default();
    }

    pub fn close(&mut self, entity: Entity) {
        self.open.remove(&entity);
    }

    pub fn is_open(&self, entity: Entity) -> bool {
        self.open.contains_key(&entity)
    }

    pub fn open_entities(&self) -> Vec<Entity> {
        self.open.keys().copied().collect()
    }

    pub fn funds_expanded(&self, entity: Entity) -> bool {
        self.open
            .get(&entity)
            .is_some_and(|window| window.funds_expanded)
    }

    /// Invert the fund section's visibility for one popup.
    pub fn toggle_funds(&mut self, entity: Entity) {
        if let Some(window) = self.open.get_mut(&entity) {
            window.funds_expanded = !window.funds_expanded;
        }
    }
}

/// Render every open popup next to its marker's current screen position.
pub fn show_popups(ctx: &egui::Context, world: &mut World, res: &mut UiResources) {
    prune_hidden(&mut res.popups, world, &res.registry);

    let mut closed = Vec::new();
    for entity in res.popups.open_entities() {
        let Some(marker) = world.get::<MapMarker>(entity).cloned() else {
            continue;
        };
        let anchor = res.view.to_screen(marker.position, res.canvas_rect)
            + egui::vec2(MARKER_RADIUS, -MARKER_RADIUS);

        let mut keep_open = true;
        egui::Window::new(&marker.name)
            .id(egui::Id::new(entity))
            .fixed_pos(anchor)
            .collapsible(false)
            .resizable(false)
            .open(&mut keep_open)
            .show(ctx, |ui| match marker.kind {
                EntityKind::VentureCapital => {
                    if let Some(details) = world.get::<VcDetails>(entity) {
                        vc_popup_body(ui, entity, details, res);
                    }
                }
                EntityKind::Startup => {
                    if let Some(details) = world.get::<StartupDetails>(entity) {
                        startup_popup_body(ui, &marker, details, res);
                    }
                }
            });
        if !keep_open {
            closed.push(entity);
        }
    }

    for entity in closed {
        res.popups.close(entity);
    }
}

/// Close popups whose marker is gone or whose layer is detached; detaching
/// a layer takes its open popups with it.
fn prune_hidden(popups: &mut PopupState, world: &World, registry: &LayerRegistry) {
    for entity in popups.open_entities() {
        let visible = world
            .get::<MapMarker>(entity)
            .is_some_and(|marker| registry.is_attached(marker.kind.layer()));
        if !visible {
            popups.close(entity);
        }
    }
}

fn vc_popup_body(ui: &mut egui::Ui, entity: Entity, details: &VcDetails, res: &mut UiResources) {
    ui.label(egui::RichText::new(&details.city).italics());
    ui.label(format!("Address: {}", details.address));
    ui.label(format!("Info: {}", details.info));
    ui.label(format!("Platform: {}", details.platform));
    ui.label(format!("Use cases: {}", details.use_cases));
    ui.label(format!("Resources: {}", details.resources));
    ui.separator();

    if details.funds.is_empty() {
        ui.label("No funds available for this VC.");
        return;
    }

    let label = if res.popups.funds_expanded(entity) {
        "Ocultar Fondos"
    } else {
        "Ver Fondos"
    };
    if ui.button(label).clicked() {
        res.popups.toggle_funds(entity);
    }
    if res.popups.funds_expanded(entity) {
        for fund in &details.funds {
            ui.add_space(4.0);
            ui.label(egui::RichText::new(&fund.name).strong());
            ui.label(format!("Date: {} · Size: {}", fund.date, fund.size));
            ui.label(format!("Focus: {}", fund.focus));
        }
    }
}

fn startup_popup_body(
    ui: &mut egui::Ui,
    marker: &MapMarker,
    details: &StartupDetails,
    res: &mut UiResources,
) {
    ui.label(format!("Info: {}", details.info));
    ui.label(format!("Website: {}", details.website));
    ui.separator();

    if ui.button("Ver Conexiones").clicked() {
        res.connections.show_for_startup(
            marker.position,
            &mut res.loader,
            &res.config,
            &mut res.registry,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn toggle_open_flips_between_open_and_closed() {
        let mut popups = PopupState::default();
        let entity = test_entity();
        popups.toggle_open(entity);
        assert!(popups.is_open(entity));
        popups.toggle_open(entity);
        assert!(!popups.is_open(entity));
    }

    #[test]
    fn fund_section_starts_collapsed() {
        let mut popups = PopupState::default();
        let entity = test_entity();
        popups.toggle_open(entity);
        assert!(!popups.funds_expanded(entity));
    }

    #[test]
    fn double_toggle_restores_fund_visibility() {
        let mut popups = PopupState::default();
        let entity = test_entity();
        popups.toggle_open(entity);
        popups.toggle_funds(entity);
        assert!(popups.funds_expanded(entity));
        popups.toggle_funds(entity);
        assert!(!popups.funds_expanded(entity));
    }

    #[test]
    fn reopening_resets_fund_visibility() {
        let mut popups = PopupState::default();
        let entity = test_entity();
        popups.toggle_open(entity);
        popups.toggle_funds(entity);
        popups.toggle_open(entity);
        popups.toggle_open(entity);
        assert!(!popups.funds_expanded(entity));
    }

    #[test]
    fn open_keeps_an_already_open_popup_intact() {
        let mut popups = PopupState::default();
        let entity = test_entity();
        popups.open(entity);
        popups.toggle_funds(entity);
        popups.open(entity);
        assert!(popups.is_open(entity));
        assert!(popups.funds_expanded(entity));
    }

    #[test]
    fn detaching_a_layer_closes_its_popups() {
        use crate::geo::GeoPoint;
        use crate::layers::LayerId;

        let mut world = World::new();
        let vc = world
            .spawn(MapMarker {
                name: "Seaya".into(),
                kind: EntityKind::VentureCapital,
                position: GeoPoint::new(-3.70, 40.42),
            })
            .id();
        let startup = world
            .spawn(MapMarker {
                name: "Glovo".into(),
                kind: EntityKind::Startup,
                position: GeoPoint::new(2.17, 41.38),
            })
            .id();

        let mut registry = LayerRegistry::default();
        let mut popups = PopupState::default();
        popups.open(vc);
        popups.open(startup);

        prune_hidden(&mut popups, &world, &registry);
        assert!(popups.is_open(vc));
        assert!(popups.is_open(startup));

        registry.set_attached(LayerId::VentureCapitals, false);
        prune_hidden(&mut popups, &world, &registry);
        assert!(!popups.is_open(vc));
        assert!(popups.is_open(startup));
    }

    #[test]
    fn despawned_markers_lose_their_popup() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        world.despawn(entity);

        let registry = LayerRegistry::default();
        let mut popups = PopupState::default();
        popups.open(entity);
        prune_hidden(&mut popups, &world, &registry);
        assert!(!popups.is_open(entity));
    }

    #[test]
    fn same_named_markers_have_independent_state() {
        let mut popups = PopupState::default();
        let mut world = World::new();
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();
        popups.toggle_open(first);
        popups.toggle_open(second);
        popups.toggle_funds(first);
        assert!(popups.funds_expanded(first));
        assert!(!popups.funds_expanded(second));
    }
}
