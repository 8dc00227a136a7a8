//! Arena orchestration: spawns the backdrop and the static platforms, and maps arena coordinates
//! onto Bevy world space.
//!
//! Gameplay positions live in *arena space* (origin at the top-left corner, y pointing down) so
//! the layout numbers in `GameConfig` read the same as the screen they describe. The camera is
//! centered on the arena, so converting to world space is a flip of the y axis plus a shift by
//! half the arena size. `sync_arena_transforms` performs that mapping once per frame for every
//! entity carrying an `ArenaPosition`.

use bevy::prelude::*;
use bevy::transform::TransformSystem;

use crate::collision::Platform;
use crate::config::GameConfig;
use crate::state::GameState;

/// Registers backdrop/platform spawning and the arena → world transform sync.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_backdrop)
            .add_systems(OnExit(GameState::Title), spawn_platforms)
            .add_systems(
                PostUpdate,
                sync_arena_transforms.before(TransformSystem::TransformPropagate),
            );
    }
}

/// Position of an entity's center in arena space.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Deref, DerefMut)]
pub struct ArenaPosition(pub Vec2);

/// Converts an arena-space point to world space for an arena of `size`.
pub fn arena_to_world(point: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x - size.x * 0.5, size.y * 0.5 - point.y)
}

/// Inverse of [`arena_to_world`].
pub fn world_to_arena(point: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x + size.x * 0.5, size.y * 0.5 - point.y)
}

/// Draw order of the arena layers.
pub mod layer {
    pub const BACKDROP: f32 = 0.0;
    pub const PLATFORM: f32 = 1.0;
    pub const GIFT: f32 = 2.0;
    pub const PLAYER: f32 = 3.0;
    pub const PARTICLE: f32 = 4.0;
    pub const BANNER: f32 = 10.0;
}

/// The sky image stays up for both the title screen and gameplay.
fn spawn_backdrop(mut commands: Commands, config: Res<GameConfig>, asset_server: Res<AssetServer>) {
    commands.spawn((
        Name::new("Backdrop"),
        SpriteBundle {
            texture: asset_server.load(config.textures.sky.clone()),
            sprite: Sprite {
                custom_size: Some(config.arena_size()),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 0.0, layer::BACKDROP),
            ..default()
        },
    ));
}

fn spawn_platforms(mut commands: Commands, config: Res<GameConfig>, asset_server: Res<AssetServer>) {
    let texture: Handle<Image> = asset_server.load(config.textures.platform.clone());

    for (index, layout) in config.platforms.iter().enumerate() {
        let rect = config.platform_rect(layout);
        commands.spawn((
            Name::new(format!("Platform{index}")),
            Platform { rect },
            SpriteBundle {
                texture: texture.clone(),
                sprite: Sprite {
                    custom_size: Some(rect.size()),
                    ..default()
                },
                transform: Transform::from_translation(
                    arena_to_world(rect.center(), config.arena_size()).extend(layer::PLATFORM),
                ),
                ..default()
            },
        ));
    }

    info!("Spawned {} platforms.", config.platforms.len());
}

/// Copies arena positions into world transforms, leaving z (draw order) untouched.
pub fn sync_arena_transforms(
    config: Res<GameConfig>,
    mut query: Query<(&ArenaPosition, &mut Transform), Changed<ArenaPosition>>,
) {
    let size = config.arena_size();
    for (position, mut transform) in &mut query {
        let world = arena_to_world(position.0, size);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_corners_map_to_world_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(arena_to_world(Vec2::ZERO, size), Vec2::new(-400.0, 300.0));
        assert_eq!(arena_to_world(size, size), Vec2::new(400.0, -300.0));
        assert_eq!(arena_to_world(size * 0.5, size), Vec2::ZERO);
    }

    #[test]
    fn world_to_arena_inverts_arena_to_world() {
        let size = Vec2::new(800.0, 600.0);
        let point = Vec2::new(100.0, 450.0);
        assert_eq!(world_to_arena(arena_to_world(point, size), size), point);
    }

    #[test]
    fn sync_moves_transform_and_keeps_depth() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GameConfig::default())
            .add_systems(Update, sync_arena_transforms);

        let entity = app
            .world_mut()
            .spawn((
                ArenaPosition(Vec2::new(100.0, 450.0)),
                Transform::from_xyz(0.0, 0.0, layer::PLAYER),
            ))
            .id();
        app.update();

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert_eq!(transform.translation, Vec3::new(-300.0, -150.0, layer::PLAYER));
    }
}
