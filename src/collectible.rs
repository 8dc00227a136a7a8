//! The gift field: a fixed batch of collectibles spawned in a row across the top of the arena.
//!
//! Gifts are never despawned. Collecting one disables its body and hides it; when the last active
//! gift is taken the whole batch is re-enabled at the top of the arena.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision::Body;
use crate::config::GameConfig;
use crate::level::{arena_to_world, layer, ArenaPosition};
use crate::movement::Velocity;
use crate::state::GameState;

pub struct CollectiblePlugin;

impl Plugin for CollectiblePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, seed_rng)
            .add_systems(OnExit(GameState::Title), spawn_gift_field);
    }
}

/// Shared RNG for cosmetic randomness (gift bounce, variants, particles).
#[derive(Resource, Deref, DerefMut)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

fn seed_rng(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(GameRng::from_seed(config.rng_seed));
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Gift {
    pub spawn_x: f32,
    /// Cosmetic frame in the gift sheet.
    pub variant: u32,
}

/// Rolls the per-gift physical and cosmetic randomness.
pub fn roll_gift(rng: &mut impl Rng, config: &GameConfig, index: usize) -> (Gift, f32) {
    let gifts = &config.gifts;
    let bounce = rng.gen_range(gifts.bounce_min..=gifts.bounce_max);
    let variant = rng.gen_range(0..gifts.variant_count);
    let gift = Gift {
        spawn_x: config.gift_spawn_x(index),
        variant,
    };
    (gift, bounce)
}

pub fn is_active(body: &Body) -> bool {
    body.enabled
}

/// Takes a gift out of play without despawning it.
pub fn deactivate(body: &mut Body, visibility: &mut Visibility) {
    body.enabled = false;
    body.touching_down = false;
    *visibility = Visibility::Hidden;
}

/// Puts a gift back at its spawn column, at rest, at the top of the arena.
pub fn reactivate(
    gift: &Gift,
    spawn_y: f32,
    position: &mut ArenaPosition,
    velocity: &mut Velocity,
    body: &mut Body,
    visibility: &mut Visibility,
) {
    position.0 = Vec2::new(gift.spawn_x, spawn_y);
    velocity.0 = Vec2::ZERO;
    body.enabled = true;
    body.touching_down = false;
    *visibility = Visibility::Inherited;
}

fn spawn_gift_field(
    mut commands: Commands,
    config: Res<GameConfig>,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut rng: ResMut<GameRng>,
) {
    let gifts = &config.gifts;
    let texture: Handle<Image> = asset_server.load(config.textures.gift.clone());
    let layout = layouts.add(TextureAtlasLayout::from_grid(
        Vec2::from(gifts.frame_size).as_uvec2(),
        gifts.variant_count,
        1,
        None,
        None,
    ));
    let size = Vec2::from(gifts.size);

    for index in 0..gifts.count {
        let (gift, bounce) = roll_gift(&mut rng.0, &config, index);
        let position = Vec2::new(gift.spawn_x, gifts.spawn_y);

        commands.spawn((
            Name::new(format!("Gift{index}")),
            gift,
            SpriteBundle {
                texture: texture.clone(),
                sprite: Sprite {
                    custom_size: Some(size),
                    ..default()
                },
                transform: Transform::from_translation(
                    arena_to_world(position, config.arena_size()).extend(layer::GIFT),
                ),
                ..default()
            },
            TextureAtlas {
                layout: layout.clone(),
                index: gift.variant as usize,
            },
            ArenaPosition(position),
            Velocity::default(),
            Body::from_size(size).with_bounce(bounce),
        ));
    }

    info!("Spawned {} gifts.", gifts.count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_configured_ranges() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for index in 0..config.gifts.count {
            let (gift, bounce) = roll_gift(&mut rng, &config, index);
            assert!((0.4..=0.8).contains(&bounce));
            assert!(gift.variant < config.gifts.variant_count);
            assert_eq!(gift.spawn_x, 12.0 + index as f32 * 70.0);
        }
    }

    #[test]
    fn reactivation_resets_to_spawn_column() {
        let gift = Gift {
            spawn_x: 82.0,
            variant: 0,
        };
        let mut position = ArenaPosition(Vec2::new(90.0, 500.0));
        let mut velocity = Velocity(Vec2::new(0.0, 40.0));
        let mut body = Body::from_size(Vec2::splat(24.0));
        let mut visibility = Visibility::default();

        deactivate(&mut body, &mut visibility);
        assert!(!is_active(&body));
        assert_eq!(visibility, Visibility::Hidden);

        reactivate(&gift, 0.0, &mut position, &mut velocity, &mut body, &mut visibility);
        assert!(is_active(&body));
        assert_eq!(position.0, Vec2::new(82.0, 0.0));
        assert_eq!(velocity.0, Vec2::ZERO);
        assert_eq!(visibility, Visibility::Inherited);
    }
}
