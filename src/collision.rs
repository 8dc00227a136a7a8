//! Kinematic bodies resolved against static platform rectangles.
//!
//! Bodies fall under gravity and are pushed out of platforms one axis at a time (x first, then y).
//! A body landing on a platform reports `touching_down`, which the player controller reads as its
//! grounded predicate on the next frame.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::level::ArenaPosition;
use crate::movement::Velocity;
use crate::state::GameSet;

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StaticBodies>().add_systems(
            Update,
            (
                rebuild_static_bodies.before(GameSet::Physics),
                integrate_bodies.in_set(GameSet::Physics),
            ),
        );
    }
}

/// Longest step the integrator will take. Longer frames (window drags, hitches) are clamped so
/// fast bodies cannot skip through a platform.
const MAX_STEP: f32 = 1.0 / 30.0;

/// Landing speeds whose rebound falls below this settle instead of bouncing.
const REST_SPEED: f32 = 20.0;

/// Static axis-aligned rectangle in arena space. Immutable after spawn.
#[derive(Component, Debug, Clone, Copy)]
pub struct Platform {
    pub rect: Rect,
}

/// Snapshot of every platform rectangle, rebuilt when platforms are added.
#[derive(Resource, Default)]
pub struct StaticBodies {
    pub solids: Vec<Rect>,
}

impl StaticBodies {
    pub fn clear(&mut self) {
        self.solids.clear();
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Body {
    pub half_extents: Vec2,
    /// Fraction of landing speed kept as an upward rebound.
    pub bounce: f32,
    pub collide_world_bounds: bool,
    /// Disabled bodies are skipped by the integrator and by overlap checks.
    pub enabled: bool,
    /// True when the last step ended resting on (or landing on) a platform.
    pub touching_down: bool,
}

impl Body {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
            bounce: 0.0,
            collide_world_bounds: false,
            enabled: true,
            touching_down: false,
        }
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn aabb(&self, center: Vec2) -> Rect {
        Rect::from_center_half_size(center, self.half_extents)
    }
}

/// Strict overlap test: touching edges do not count.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Which sides of the body hit something during a step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Contacts {
    pub down: bool,
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

/// World parameters shared by every body in a step.
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub bounds: Rect,
}

impl StepParams {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            gravity: config.physics.gravity,
            max_fall_speed: config.physics.max_fall_speed,
            bounds: Rect::from_corners(Vec2::ZERO, config.arena_size()),
        }
    }
}

/// Advances one body by `dt` seconds and resolves it against `solids`.
pub fn step_body(
    position: &mut Vec2,
    velocity: &mut Vec2,
    body: &mut Body,
    solids: &[Rect],
    params: &StepParams,
    dt: f32,
) -> Contacts {
    velocity.y = (velocity.y + params.gravity * dt).min(params.max_fall_speed);

    let half = body.half_extents;
    let mut contacts = Contacts::default();

    position.x += velocity.x * dt;
    for solid in solids {
        if !overlaps(body.aabb(*position), *solid) {
            continue;
        }

        if velocity.x > 0.0 {
            position.x = solid.min.x - half.x;
            contacts.right = true;
        } else if velocity.x < 0.0 {
            position.x = solid.max.x + half.x;
            contacts.left = true;
        }
    }
    if contacts.left || contacts.right {
        velocity.x = 0.0;
    }

    position.y += velocity.y * dt;
    for solid in solids {
        if !overlaps(body.aabb(*position), *solid) {
            continue;
        }

        if velocity.y > 0.0 {
            position.y = solid.min.y - half.y;
            contacts.down = true;
        } else if velocity.y < 0.0 {
            position.y = solid.max.y + half.y;
            contacts.up = true;
        }
    }

    if contacts.down {
        let rebound = velocity.y * body.bounce;
        velocity.y = if rebound > REST_SPEED { -rebound } else { 0.0 };
    } else if contacts.up {
        velocity.y = 0.0;
    }

    if body.collide_world_bounds {
        clamp_to_bounds(position, velocity, half, params.bounds);
    }

    body.touching_down = contacts.down;
    contacts
}

/// World bounds block movement but do not count as ground.
fn clamp_to_bounds(position: &mut Vec2, velocity: &mut Vec2, half: Vec2, bounds: Rect) {
    let min = bounds.min + half;
    let max = bounds.max - half;

    if position.x < min.x || position.x > max.x {
        position.x = position.x.clamp(min.x, max.x);
        velocity.x = 0.0;
    }
    if position.y < min.y || position.y > max.y {
        position.y = position.y.clamp(min.y, max.y);
        velocity.y = 0.0;
    }
}

fn rebuild_static_bodies(
    added: Query<(), Added<Platform>>,
    platforms: Query<&Platform>,
    mut statics: ResMut<StaticBodies>,
) {
    if added.is_empty() {
        return;
    }

    statics.clear();
    statics.solids.extend(platforms.iter().map(|platform| platform.rect));

    if statics.solids.is_empty() {
        warn!("No platforms registered; bodies will fall out of the arena.");
    }
}

fn integrate_bodies(
    time: Res<Time>,
    config: Res<GameConfig>,
    statics: Res<StaticBodies>,
    mut query: Query<(&mut ArenaPosition, &mut Velocity, &mut Body)>,
) {
    let dt = time.delta_seconds().min(MAX_STEP);
    if dt <= 0.0 {
        return;
    }

    let params = StepParams::from_config(&config);
    for (mut position, mut velocity, mut body) in &mut query {
        if !body.enabled {
            continue;
        }

        step_body(
            &mut position.0,
            &mut velocity.0,
            &mut body,
            &statics.solids,
            &params,
            dt,
        );
    }
}
