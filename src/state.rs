//! Global game state definitions. States are stored by Bevy in a stack; switching states simply
//! updates an enum value and triggers on-enter/on-exit schedules. No heap allocations occur when
//! toggling states.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine for the game loop. `Title` is the initial state and is never
/// re-entered once left, so `OnExit(GameState::Title)` doubles as the one-shot gameplay setup.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Title,
    Playing,
    Paused,
}

/// Named system sets to structure the Update schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Movement,
    Physics,
    Collection,
    Effects,
}

/// Set once the title screen has been dismissed; never cleared.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameStarted(pub bool);

/// Run condition for per-frame gameplay systems.
pub fn game_started(started: Res<GameStarted>) -> bool {
    started.0
}

pub fn mark_game_started(mut started: ResMut<GameStarted>) {
    if started.0 {
        return;
    }

    started.0 = true;
    info!("Gameplay started.");
}

/// Toggles between Playing and Paused when `ESC` is pressed. The `State` resource is read-only
/// snapshot; `NextState` writes the pending transition which Bevy applies at the end of the frame.
pub fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Title => {}
    }
}
