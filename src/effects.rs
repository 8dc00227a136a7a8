//! Visual feedback: a short spark burst on every pickup and the timed celebration (banner plus
//! confetti) when the score threshold is hit.
//!
//! Particles are plain tinted sprites that move in arena space and despawn when their lifetime
//! runs out. The celebration owns a one-shot timer; when it finishes the emitter stops and the
//! banner is removed, while confetti already in flight expires on its own.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::collectible::GameRng;
use crate::config::GameConfig;
use crate::level::{arena_to_world, layer, ArenaPosition};
use crate::score::{CelebrationStarted, GiftCollected};
use crate::state::GameSet;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_pickup_bursts,
                start_celebration,
                animate_banner,
                run_confetti,
                update_particles,
            )
                .chain()
                .in_set(GameSet::Effects),
        );
    }
}

const BURST_SPARKS: usize = 8;
const BURST_SPEED: f32 = 140.0;
const BURST_LIFETIME: f32 = 0.4;
const CONFETTI_LIFETIME: f32 = 3.0;
const BANNER_ENTRANCE: f32 = 0.6;

const CONFETTI_COLORS: [Color; 5] = [
    Color::srgb(1.0, 0.3, 0.3),
    Color::srgb(1.0, 0.85, 0.2),
    Color::srgb(0.3, 0.9, 0.4),
    Color::srgb(0.3, 0.6, 1.0),
    Color::srgb(0.9, 0.4, 1.0),
];

#[derive(Component, Debug)]
pub struct Particle {
    /// Arena-space velocity; positive y points down.
    pub velocity: Vec2,
    pub gravity: f32,
    pub life: Timer,
}

impl Particle {
    pub fn new(velocity: Vec2, gravity: f32, lifetime: f32) -> Self {
        Self {
            velocity,
            gravity,
            life: Timer::from_seconds(lifetime, TimerMode::Once),
        }
    }

    /// Moves the particle and returns its remaining opacity, or `None` once expired.
    pub fn advance(&mut self, position: &mut Vec2, delta: Duration) -> Option<f32> {
        self.life.tick(delta);
        if self.life.finished() {
            return None;
        }

        let dt = delta.as_secs_f32();
        self.velocity.y += self.gravity * dt;
        *position += self.velocity * dt;
        Some(1.0 - self.life.fraction())
    }
}

#[derive(Component)]
pub struct CelebrationBanner {
    pub entrance: Timer,
}

#[derive(Component)]
pub struct ConfettiEmitter {
    pub spawn: Timer,
    pub remaining: Timer,
}

/// Overshooting ease used for the banner's entrance: 0 at t = 0, peaks past 1, settles at 1.
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let t = t.clamp(0.0, 1.0) - 1.0;
    1.0 + C3 * t * t * t + C1 * t * t
}

fn spawn_particle(
    commands: &mut Commands,
    config: &GameConfig,
    position: Vec2,
    particle: Particle,
    color: Color,
    size: f32,
) {
    commands.spawn((
        Name::new("Particle"),
        SpriteBundle {
            sprite: Sprite {
                color,
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            transform: Transform::from_translation(
                arena_to_world(position, config.arena_size()).extend(layer::PARTICLE),
            ),
            ..default()
        },
        ArenaPosition(position),
        particle,
    ));
}

fn spawn_pickup_bursts(
    mut commands: Commands,
    mut events: EventReader<GiftCollected>,
    config: Res<GameConfig>,
    mut rng: ResMut<GameRng>,
) {
    for event in events.read() {
        for spark in 0..BURST_SPARKS {
            let angle = spark as f32 / BURST_SPARKS as f32 * std::f32::consts::TAU
                + rng.gen_range(-0.2..0.2);
            let speed = BURST_SPEED * rng.gen_range(0.6..1.0);
            spawn_particle(
                &mut commands,
                &config,
                event.position,
                Particle::new(Vec2::from_angle(angle) * speed, 0.0, BURST_LIFETIME),
                Color::srgb(1.0, 0.95, 0.6),
                4.0,
            );
        }
    }
}

fn start_celebration(
    mut commands: Commands,
    mut events: EventReader<CelebrationStarted>,
    config: Res<GameConfig>,
) {
    for event in events.read() {
        let celebration = &config.celebration;
        let center = arena_to_world(config.arena_size() * Vec2::new(0.5, 0.4), config.arena_size());

        commands.spawn((
            Name::new("CelebrationBanner"),
            CelebrationBanner {
                entrance: Timer::from_seconds(BANNER_ENTRANCE, TimerMode::Once),
            },
            Text2dBundle {
                text: Text::from_section(
                    celebration.banner_text.clone(),
                    TextStyle {
                        font_size: 64.0,
                        color: Color::srgb(1.0, 0.85, 0.2),
                        ..default()
                    },
                )
                .with_justify(JustifyText::Center),
                transform: Transform::from_translation(center.extend(layer::BANNER))
                    .with_scale(Vec3::ZERO),
                ..default()
            },
        ));

        commands.spawn((
            Name::new("ConfettiEmitter"),
            ConfettiEmitter {
                spawn: Timer::from_seconds(celebration.confetti_interval_secs, TimerMode::Repeating),
                remaining: Timer::from_seconds(celebration.duration_secs, TimerMode::Once),
            },
        ));

        info!(
            "Celebration at score {} for {}s.",
            event.score, celebration.duration_secs
        );
    }
}

fn animate_banner(time: Res<Time>, mut banners: Query<(&mut CelebrationBanner, &mut Transform)>) {
    for (mut banner, mut transform) in &mut banners {
        if banner.entrance.finished() {
            continue;
        }

        banner.entrance.tick(time.delta());
        transform.scale = Vec3::splat(ease_out_back(banner.entrance.fraction()));
    }
}

fn run_confetti(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut rng: ResMut<GameRng>,
    mut emitters: Query<(Entity, &mut ConfettiEmitter)>,
    banners: Query<Entity, With<CelebrationBanner>>,
) {
    let width = config.arena.x;

    for (entity, mut emitter) in &mut emitters {
        emitter.remaining.tick(time.delta());
        if emitter.remaining.finished() {
            commands.entity(entity).despawn_recursive();
            for banner in &banners {
                commands.entity(banner).despawn_recursive();
            }
            info!("Celebration finished.");
            continue;
        }

        emitter.spawn.tick(time.delta());
        for _ in 0..emitter.spawn.times_finished_this_tick() {
            let position = Vec2::new(rng.gen_range(0.0..width), -8.0);
            let velocity = Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(40.0..120.0));
            let color = CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())];
            spawn_particle(
                &mut commands,
                &config,
                position,
                Particle::new(velocity, config.physics.gravity * 0.25, CONFETTI_LIFETIME),
                color,
                6.0,
            );
        }
    }
}

fn update_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Particle, &mut ArenaPosition, &mut Sprite)>,
) {
    for (entity, mut particle, mut position, mut sprite) in &mut particles {
        match particle.advance(&mut position.0, time.delta()) {
            Some(alpha) => sprite.color.set_alpha(alpha),
            None => commands.entity(entity).despawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::time::TimeUpdateStrategy;

    use super::*;

    #[test]
    fn ease_starts_at_zero_and_settles_at_one() {
        assert!(ease_out_back(0.0).abs() < 1e-6);
        assert!((ease_out_back(1.0) - 1.0).abs() < 1e-6);
        assert!(ease_out_back(0.7) > 1.0);
    }

    #[test]
    fn particles_fade_then_expire() {
        let mut particle = Particle::new(Vec2::new(10.0, 0.0), 0.0, 1.0);
        let mut position = Vec2::ZERO;

        let alpha = particle
            .advance(&mut position, Duration::from_millis(500))
            .unwrap();
        assert!((alpha - 0.5).abs() < 1e-4);
        assert!((position.x - 5.0).abs() < 1e-4);

        assert!(particle
            .advance(&mut position, Duration::from_millis(600))
            .is_none());
    }

    fn effects_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GameConfig::default())
            .insert_resource(GameRng::from_seed(Some(3)))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)))
            .add_event::<GiftCollected>()
            .add_event::<CelebrationStarted>()
            .add_plugins(EffectsPlugin);
        app
    }

    fn count<C: Component>(app: &mut App) -> usize {
        let mut query = app.world_mut().query_filtered::<Entity, With<C>>();
        query.iter(app.world()).count()
    }

    #[test]
    fn pickup_spawns_a_burst() {
        let mut app = effects_app();
        app.world_mut().send_event(GiftCollected {
            position: Vec2::new(100.0, 100.0),
            score: 10,
        });
        app.update();

        assert_eq!(count::<Particle>(&mut app), BURST_SPARKS);
    }

    #[test]
    fn celebration_removes_banner_after_its_duration() {
        let mut app = effects_app();
        app.world_mut().send_event(CelebrationStarted { score: 250 });
        app.update();

        assert_eq!(count::<CelebrationBanner>(&mut app), 1);
        assert_eq!(count::<ConfettiEmitter>(&mut app), 1);

        // 250ms per frame; 10s of celebration plus slack.
        for _ in 0..44 {
            app.update();
        }

        assert_eq!(count::<CelebrationBanner>(&mut app), 0);
        assert_eq!(count::<ConfettiEmitter>(&mut app), 0);
    }
}
