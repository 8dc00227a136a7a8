//! Input sampling. Keyboard arrows and up to two pointers (touches, or the held mouse cursor) are
//! folded into a single `MoveIntent` each frame.

use bevy::input::keyboard::KeyCode;
use bevy::input::mouse::MouseButton;
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::{GameConfig, TouchConfig};
use crate::level::world_to_arena;
use crate::state::GameSet;

/// Pointers beyond this count are ignored.
pub const MAX_POINTERS: usize = 2;

/// Admits the held mouse button as a pointer only after it has been seen released once. The click
/// that pressed START is still held on the first gameplay frames and would otherwise read as a jump.
#[derive(Debug, Default)]
pub struct MouseGate {
    armed: bool,
}

impl MouseGate {
    pub fn admit(&mut self, pressed: bool) -> bool {
        if !pressed {
            self.armed = true;
        }
        self.armed && pressed
    }
}

pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MoveIntent>()
            .add_systems(Update, sample_input.in_set(GameSet::Input));
    }
}

/// The three logical intents the player controller understands.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl MoveIntent {
    pub fn merge(self, other: MoveIntent) -> MoveIntent {
        MoveIntent {
            left: self.left || other.left,
            right: self.right || other.right,
            jump: self.jump || other.jump,
        }
    }
}

pub fn keyboard_intent(keyboard: &ButtonInput<KeyCode>) -> MoveIntent {
    MoveIntent {
        left: keyboard.pressed(KeyCode::ArrowLeft),
        right: keyboard.pressed(KeyCode::ArrowRight),
        jump: keyboard.any_pressed([KeyCode::ArrowUp, KeyCode::Space]),
    }
}

/// Classifies one pointer by its arena x coordinate.
pub fn classify_pointer(x: f32, bands: &TouchConfig) -> MoveIntent {
    if x < bands.left_edge {
        MoveIntent {
            left: true,
            ..default()
        }
    } else if x > bands.right_edge {
        MoveIntent {
            right: true,
            ..default()
        }
    } else {
        MoveIntent {
            jump: true,
            ..default()
        }
    }
}

/// Combines the first [`MAX_POINTERS`] pointer positions (arena space) into one intent.
pub fn pointer_intent(pointers: impl IntoIterator<Item = Vec2>, bands: &TouchConfig) -> MoveIntent {
    pointers
        .into_iter()
        .take(MAX_POINTERS)
        .fold(MoveIntent::default(), |intent, pointer| {
            intent.merge(classify_pointer(pointer.x, bands))
        })
}

fn sample_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    config: Res<GameConfig>,
    mut intent: ResMut<MoveIntent>,
    mut mouse_gate: Local<MouseGate>,
) {
    let mut sampled = keyboard_intent(&keyboard);
    let mouse_held = mouse_gate.admit(mouse.pressed(MouseButton::Left));

    if config.touch.enabled {
        if let Ok((camera, camera_transform)) = cameras.get_single() {
            let mut screen_points: Vec<Vec2> =
                touches.iter().map(|touch| touch.position()).collect();

            if screen_points.len() < MAX_POINTERS && mouse_held {
                if let Some(cursor) = windows.get_single().ok().and_then(Window::cursor_position) {
                    screen_points.push(cursor);
                }
            }

            let arena_size = config.arena_size();
            let pointers = screen_points.into_iter().filter_map(|point| {
                camera
                    .viewport_to_world_2d(camera_transform, point)
                    .map(|world| world_to_arena(world, arena_size))
            });
            sampled = sampled.merge(pointer_intent(pointers, &config.touch));
        }
    }

    if *intent != sampled {
        *intent = sampled;
    }
}
