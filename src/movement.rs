use bevy::prelude::*;

use crate::collision::Body;
use crate::config::GameConfig;
use crate::input::MoveIntent;
use crate::player::Player;
use crate::state::GameSet;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerJumped>()
            .add_systems(Update, drive_player.in_set(GameSet::Movement));
    }
}

/// Arena-space velocity in units per second. Positive y points down.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Deref, DerefMut)]
pub struct Velocity(pub Vec2);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlayerController {
    pub run_speed: f32,
    pub jump_speed: f32,
}

impl PlayerController {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            run_speed: config.player.run_speed,
            jump_speed: config.player.jump_speed,
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            run_speed: 160.0,
            jump_speed: 330.0,
        }
    }
}

/// `Left` is the flipped orientation.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Idle,
    Walking,
}

/// Sent when the grounded player starts a jump.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerJumped;

/// Result of applying one frame of intent to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    pub facing: Facing,
    pub animation: AnimationState,
    pub jumped: bool,
}

/// Maps intents to velocity. Left wins over right; the jump impulse only applies when grounded
/// and leaves vy alone otherwise. Idle keeps the previous facing.
pub fn steer(
    intent: MoveIntent,
    grounded: bool,
    facing: Facing,
    controller: &PlayerController,
    velocity: &mut Vec2,
) -> Steering {
    let (vx, facing, animation) = if intent.left {
        (-controller.run_speed, Facing::Left, AnimationState::Walking)
    } else if intent.right {
        (controller.run_speed, Facing::Right, AnimationState::Walking)
    } else {
        (0.0, facing, AnimationState::Idle)
    };
    velocity.x = vx;

    let jumped = intent.jump && grounded;
    if jumped {
        velocity.y = -controller.jump_speed;
    }

    Steering {
        facing,
        animation,
        jumped,
    }
}

fn drive_player(
    intent: Res<MoveIntent>,
    mut query: Query<
        (
            &PlayerController,
            &Body,
            &mut Velocity,
            &mut Facing,
            &mut AnimationState,
        ),
        With<Player>,
    >,
    mut jumps: EventWriter<PlayerJumped>,
) {
    let Ok((controller, body, mut velocity, mut facing, mut animation)) = query.get_single_mut()
    else {
        return;
    };

    let steering = steer(
        *intent,
        body.touching_down,
        *facing,
        controller,
        &mut velocity.0,
    );

    facing.set_if_neq(steering.facing);
    animation.set_if_neq(steering.animation);

    if steering.jumped {
        jumps.send(PlayerJumped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(left: bool, right: bool, jump: bool) -> MoveIntent {
        MoveIntent { left, right, jump }
    }

    #[test]
    fn left_sets_negative_speed_and_flips() {
        let mut velocity = Vec2::ZERO;
        let steering = steer(
            intent(true, false, false),
            true,
            Facing::Right,
            &PlayerController::default(),
            &mut velocity,
        );

        assert_eq!(velocity.x, -160.0);
        assert_eq!(steering.facing, Facing::Left);
        assert_eq!(steering.animation, AnimationState::Walking);
    }

    #[test]
    fn right_sets_positive_speed() {
        let mut velocity = Vec2::ZERO;
        let steering = steer(
            intent(false, true, false),
            true,
            Facing::Left,
            &PlayerController::default(),
            &mut velocity,
        );

        assert_eq!(velocity.x, 160.0);
        assert_eq!(steering.facing, Facing::Right);
    }

    #[test]
    fn left_wins_when_both_held() {
        let mut velocity = Vec2::ZERO;
        let steering = steer(
            intent(true, true, false),
            true,
            Facing::Right,
            &PlayerController::default(),
            &mut velocity,
        );

        assert_eq!(velocity.x, -160.0);
        assert_eq!(steering.facing, Facing::Left);
    }

    #[test]
    fn no_input_idles_and_keeps_facing() {
        let mut velocity = Vec2::new(160.0, 12.0);
        let steering = steer(
            intent(false, false, false),
            true,
            Facing::Left,
            &PlayerController::default(),
            &mut velocity,
        );

        assert_eq!(velocity, Vec2::new(0.0, 12.0));
        assert_eq!(steering.facing, Facing::Left);
        assert_eq!(steering.animation, AnimationState::Idle);
    }

    #[test]
    fn jump_requires_ground() {
        let controller = PlayerController::default();

        let mut grounded = Vec2::ZERO;
        let steering = steer(intent(false, false, true), true, Facing::Right, &controller, &mut grounded);
        assert!(steering.jumped);
        assert_eq!(grounded.y, -330.0);

        let mut airborne = Vec2::new(0.0, 42.0);
        let steering = steer(intent(false, false, true), false, Facing::Right, &controller, &mut airborne);
        assert!(!steering.jumped);
        assert_eq!(airborne.y, 42.0);
    }

    #[test]
    fn drive_player_emits_jump_event() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(MoveIntent {
                left: false,
                right: true,
                jump: true,
            })
            .add_plugins(MovementPlugin);

        let mut body = Body::from_size(Vec2::new(32.0, 48.0));
        body.touching_down = true;
        let player = app
            .world_mut()
            .spawn((
                Player,
                PlayerController::default(),
                body,
                Velocity::default(),
                Facing::Left,
                AnimationState::Idle,
            ))
            .id();
        app.update();

        let velocity = app.world().get::<Velocity>(player).unwrap();
        assert_eq!(velocity.0, Vec2::new(160.0, -330.0));
        assert_eq!(*app.world().get::<Facing>(player).unwrap(), Facing::Right);
        assert_eq!(app.world().resource::<Events<PlayerJumped>>().len(), 1);
    }
}
