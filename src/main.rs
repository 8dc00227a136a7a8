//! Gift Catcher: run and jump across four platforms collecting falling gifts.
//!
//! `main` only sizes the window to the 800×600 arena and picks the asset settings for desktop or
//! web; all gameplay is registered by `GiftCatcherPlugin` in `app.rs`.

mod app;
mod audio;
mod collectible;
mod collision;
mod config;
mod effects;
mod input;
mod level;
mod movement;
mod player;
mod score;
mod state;
mod ui;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use app::GiftCatcherPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    // The logical resolution matches the 800×600 arena so one arena unit is one pixel at the
    // default size. Resizing is allowed; the camera's scaling mode keeps the arena in view.
    let primary_window = Window {
        title: "Gift Catcher".to_string(),
        resolution: WindowResolution::new(800.0, 600.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 400.0,
            min_height: 300.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // `DefaultPlugins` spins up rendering, input, audio, logging, etc. We override pieces that
    // matter for this project: nearest-neighbor sampling for crisp sprites, and asset settings for
    // desktop vs web.
    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    // `App::new()` allocates the ECS world and schedule. Plugins + the clear color describe
    // startup state; once `run()` is called, Bevy drives the main loop until the process exits.
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.06)))
        .add_plugins(default_plugins)
        .add_plugins(GiftCatcherPlugin)
        .run();
}
