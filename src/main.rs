use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin, WindowResolution};

use vcmap::VcMapPlugin;

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.91, 0.92, 0.90)))
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "VC & Startup Map".into(),
                    resolution: WindowResolution::new(1280, 800),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(VcMapPlugin)
        .run();
}
