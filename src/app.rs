//! High-level plugin composition.
//!
//! The `GiftCatcherPlugin` glues together all domain-specific plugins
//! (arena, player, gifts, score, effects, audio, UI) and sets up system ordering.
//! Each subsystem is responsible for its own state; this orchestrator merely
//! registers them with the Bevy application.

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::audio::GameAudioPlugin;
use crate::collectible::CollectiblePlugin;
use crate::collision::CollisionPlugin;
use crate::config::{ConfigPlugin, GameConfig};
use crate::effects::EffectsPlugin;
use crate::input::PlayerInputPlugin;
use crate::level::LevelPlugin;
use crate::movement::MovementPlugin;
use crate::player::PlayerPlugin;
use crate::score::ScorePlugin;
use crate::state::{game_started, mark_game_started, toggle_pause, GameSet, GameStarted, GameState};
use crate::ui::UiPlugin;

/// Bundles every gameplay-centric plugin into a single unit that can be added
/// to the Bevy `App`. Memory for each plugin is managed by Bevy; once the app
/// shuts down, all resources owned by these plugins are dropped automatically.
pub struct GiftCatcherPlugin;

impl Plugin for GiftCatcherPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ConfigPlugin); // Must run first: the other plugins read `GameConfig`.
        configure_game_flow(app);

        app.add_plugins((
            LevelPlugin,        // Backdrop, platforms, arena → world sync.
            CollisionPlugin,    // Kinematic bodies against platforms.
            PlayerInputPlugin,  // Keyboard + pointer intents.
            MovementPlugin,     // Intent → velocity.
            PlayerPlugin,       // Player spawn + sprite animation.
            CollectiblePlugin,  // Gift field.
            ScorePlugin,        // Collection event + score.
            EffectsPlugin,      // Pickup bursts + celebration.
            GameAudioPlugin,    // Cues + background music.
            UiPlugin,           // Title, score readout, pause overlay.
        ))
        .add_systems(Startup, setup_camera); // Creates the primary camera entity once.
    }
}

/// State machine, start gate, and gameplay set ordering.
fn configure_game_flow(app: &mut App) {
    app.init_state::<GameState>()
        .init_resource::<GameStarted>()
        // Systems inside these sets execute sequentially once gameplay has
        // started and only while the game is in the `Playing` state.
        // `chain()` enforces Input → Movement → Physics → Collection →
        // Effects so each frame's writes land in deterministic stages.
        .configure_sets(
            Update,
            (
                GameSet::Input,
                GameSet::Movement,
                GameSet::Physics,
                GameSet::Collection,
                GameSet::Effects,
            )
                .chain()
                .run_if(in_state(GameState::Playing))
                .run_if(game_started),
        )
        .add_systems(OnExit(GameState::Title), mark_game_started)
        .add_systems(Update, toggle_pause); // Hot-swaps GameState based on keyboard input.
}

/// Spawns the 2D camera centered on the arena. `AutoMin` keeps the whole arena visible at any
/// window size, letterboxing the extra space.
fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    let mut camera = Camera2dBundle::default();
    camera.projection.scaling_mode = ScalingMode::AutoMin {
        min_width: config.arena.x,
        min_height: config.arena.y,
    };

    commands.spawn((Name::new("MainCamera"), camera));
}
