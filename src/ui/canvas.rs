//! The map canvas: pan/zoom input, basemap, connection lines, and
//! clustered marker badges, painted in that order.

use bevy::prelude::*;
use egui::{Align2, Color32, FontId, Stroke};

use crate::cluster::{self, Cluster, CLUSTER_RADIUS};
use crate::connections::ConnectionMode;
use crate::layers::LayerId;
use crate::markers::{EntityKind, MapMarker};

use super::UiResources;

pub const MARKER_RADIUS: f32 = 15.0;
const CLUSTER_BADGE_RADIUS: f32 = 19.0;
const CANVAS_BG: Color32 = Color32::from_rgb(0xe8, 0xea, 0xe6);
const CONNECTION_COLOR: Color32 = Color32::from_rgb(0x2c, 0x3e, 0x50);
const PULSE_COLOR: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
const ZOOM_PER_SCROLL_PIXEL: f64 = 0.005;

pub fn show_map_canvas(ctx: &egui::Context, world: &mut World, res: &mut UiResources) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            res.canvas_rect = rect;

            // Dragging pans; the view center stops at the configured bounds.
            if response.dragged() {
                let delta = response.drag_delta();
                if delta != egui::Vec2::ZERO {
                    res.view.pan_pixels(-delta, res.config.bounds.as_ref());
                }
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll != 0.0 {
                    res.view.zoom_by(
                        f64::from(scroll) * ZOOM_PER_SCROLL_PIXEL,
                        res.config.min_zoom,
                        res.config.max_zoom,
                    );
                }
            }

            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, CANVAS_BG);
            draw_basemap(&painter, rect, res);
            draw_connections(&painter, rect, res);

            // Startups first, VCs on top, matching the hit-test order below.
            let startup_clusters = layer_clusters(world, res, LayerId::Startups, rect);
            let vc_clusters = layer_clusters(world, res, LayerId::VentureCapitals, rect);
            for cluster in &startup_clusters {
                draw_cluster(&painter, cluster, EntityKind::Startup);
            }
            for cluster in &vc_clusters {
                draw_cluster(&painter, cluster, EntityKind::VentureCapital);
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    handle_click(pos, &vc_clusters, &startup_clusters, rect, res);
                }
            }
        });
}

/// Project a layer's visible markers and group them.
fn layer_clusters(
    world: &mut World,
    res: &UiResources,
    layer: LayerId,
    rect: egui::Rect,
) -> Vec<Cluster> {
    let mut markers = Vec::new();
    for &entity in res.registry.visible_members(layer) {
        let Some(marker) = world.get::<MapMarker>(entity) else {
            continue;
        };
        let pos = res.view.to_screen(marker.position, rect);
        if rect.expand(CLUSTER_RADIUS).contains(pos) {
            markers.push((entity, pos));
        }
    }
    cluster::cluster_markers(&markers, CLUSTER_RADIUS)
}

fn draw_basemap(painter: &egui::Painter, rect: egui::Rect, res: &UiResources) {
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    for tile in &res.basemap.tiles {
        let nw = res.view.to_screen(tile.nw, rect);
        let se = res.view.to_screen(tile.se, rect);
        let tile_rect = egui::Rect::from_two_pos(nw, se);
        if tile_rect.intersects(rect) {
            painter.image(tile.texture, tile_rect, uv, Color32::WHITE);
        }
    }
    if let Some(credit) = res.basemap.attribution() {
        painter.text(
            rect.right_bottom() - egui::vec2(6.0, 4.0),
            Align2::RIGHT_BOTTOM,
            credit,
            FontId::proportional(10.0),
            Color32::from_gray(0x55),
        );
    }
}

fn draw_connections(painter: &egui::Painter, rect: egui::Rect, res: &UiResources) {
    if !res.registry.is_attached(LayerId::Connections) {
        return;
    }
    let stroke = Stroke::new(2.0, CONNECTION_COLOR);
    let dashed = matches!(res.connections.mode(), ConnectionMode::ForStartup(_));
    for line in res.connections.lines() {
        let a = res.view.to_screen(line.from, rect);
        let b = res.view.to_screen(line.to, rect);
        if dashed {
            painter.extend(egui::Shape::dashed_line(&[a, b], stroke, 8.0, 6.0));
        } else {
            painter.line_segment([a, b], stroke);
            let pulse = res.view.to_screen(res.connections.pulse_point(line), rect);
            painter.circle_filled(pulse, 4.5, PULSE_COLOR);
        }
    }
}

/// Draw one cluster: a plain badge for a single marker, a count badge
/// with a halo for a group.
fn draw_cluster(painter: &egui::Painter, cluster: &Cluster, kind: EntityKind) {
    let fill = kind.badge_fill();
    if cluster.is_singleton() {
        painter.circle_filled(cluster.anchor, MARKER_RADIUS, fill);
        painter.circle_stroke(cluster.anchor, MARKER_RADIUS, Stroke::new(1.5, Color32::WHITE));
        painter.text(
            cluster.anchor,
            Align2::CENTER_CENTER,
            kind.badge_label(),
            FontId::proportional(12.0),
            Color32::WHITE,
        );
    } else {
        painter.circle_filled(
            cluster.anchor,
            CLUSTER_BADGE_RADIUS + 6.0,
            fill.gamma_multiply(0.35),
        );
        painter.circle_filled(cluster.anchor, CLUSTER_BADGE_RADIUS, fill);
        painter.text(
            cluster.anchor,
            Align2::CENTER_CENTER,
            cluster.len().to_string(),
            FontId::proportional(13.0),
            Color32::WHITE,
        );
    }
}

/// Map a click to the topmost badge under it: a single marker toggles
/// its popup, a cluster zooms one step toward its anchor.
fn handle_click(
    pos: egui::Pos2,
    vc_clusters: &[Cluster],
    startup_clusters: &[Cluster],
    rect: egui::Rect,
    res: &mut UiResources,
) {
    for cluster in vc_clusters.iter().chain(startup_clusters) {
        let radius = if cluster.is_singleton() {
            MARKER_RADIUS
        } else {
            CLUSTER_BADGE_RADIUS
        };
        if cluster.anchor.distance(pos) > radius {
            continue;
        }
        if cluster.is_singleton() {
            res.popups.toggle_open(cluster.members[0]);
        } else {
            let mut center = res.view.from_screen(cluster.anchor, rect);
            if let Some(bounds) = res.config.bounds.as_ref() {
                center = bounds.clamp(center);
            }
            res.view.center = center;
            res.view.zoom_by(1.0, res.config.min_zoom, res.config.max_zoom);
        }
        return;
    }
}
