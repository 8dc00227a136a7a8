//! Player entity lifecycle and sprite-sheet animation.
//!
//! All memory for components is owned by Bevy's ECS tables; this module merely issues the spawn
//! command once gameplay begins and steps the atlas index to match the motion state.

use bevy::prelude::*;

use crate::collision::Body;
use crate::config::GameConfig;
use crate::level::{arena_to_world, layer, ArenaPosition};
use crate::movement::{AnimationState, Facing, PlayerController, Velocity};
use crate::state::{GameSet, GameState};

/// Registers the systems that create the player entity and animate it.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnExit(GameState::Title), spawn_player)
            .add_systems(Update, animate_player.in_set(GameSet::Effects));
    }
}

/// Marker component used by many systems (collection, animation, input) to identify the player
/// entity. The component itself stores no data and therefore adds zero heap overhead.
#[derive(Component)]
pub struct Player;

/// Frame ranges in the player sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    WalkLeft,
    Idle,
    WalkRight,
}

impl Clip {
    pub fn select(animation: AnimationState, facing: Facing) -> Self {
        match (animation, facing) {
            (AnimationState::Idle, _) => Clip::Idle,
            (AnimationState::Walking, Facing::Left) => Clip::WalkLeft,
            (AnimationState::Walking, Facing::Right) => Clip::WalkRight,
        }
    }

    pub fn first(self) -> usize {
        match self {
            Clip::WalkLeft => 0,
            Clip::Idle => 4,
            Clip::WalkRight => 5,
        }
    }

    pub fn last(self) -> usize {
        match self {
            Clip::WalkLeft => 3,
            Clip::Idle => 4,
            Clip::WalkRight => 8,
        }
    }

    /// Next frame in the loop; frames outside the clip restart it.
    pub fn advance(self, frame: usize) -> usize {
        if frame < self.first() || frame >= self.last() {
            self.first()
        } else {
            frame + 1
        }
    }
}

#[derive(Component)]
pub struct PlayerAnimation {
    pub clip: Clip,
    pub timer: Timer,
}

impl PlayerAnimation {
    pub fn new(frames_per_second: f32) -> Self {
        Self {
            clip: Clip::Idle,
            timer: Timer::from_seconds(1.0 / frames_per_second.max(1.0), TimerMode::Repeating),
        }
    }
}

fn spawn_player(
    mut commands: Commands,
    config: Res<GameConfig>,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    let player = &config.player;
    let frame_size = Vec2::from(player.frame_size);
    let spawn = Vec2::from(player.spawn);

    let layout = layouts.add(TextureAtlasLayout::from_grid(
        frame_size.as_uvec2(),
        player.frame_count,
        1,
        None,
        None,
    ));

    commands.spawn((
        Name::new("Player"),
        Player,
        SpriteBundle {
            texture: asset_server.load(config.textures.player.clone()),
            sprite: Sprite {
                custom_size: Some(frame_size),
                ..default()
            },
            transform: Transform::from_translation(
                arena_to_world(spawn, config.arena_size()).extend(layer::PLAYER),
            ),
            ..default()
        },
        TextureAtlas {
            layout,
            index: Clip::Idle.first(),
        },
        ArenaPosition(spawn),
        Velocity::default(),
        Body::from_size(frame_size)
            .with_bounce(player.bounce)
            .with_world_bounds(),
        PlayerController::from_config(&config),
        Facing::default(),
        AnimationState::default(),
        PlayerAnimation::new(player.frames_per_second),
    ));

    info!("Spawned player at {:?}.", spawn);
}

fn animate_player(
    time: Res<Time>,
    mut query: Query<
        (
            &AnimationState,
            &Facing,
            &mut PlayerAnimation,
            &mut TextureAtlas,
        ),
        With<Player>,
    >,
) {
    for (state, facing, mut animation, mut atlas) in &mut query {
        let clip = Clip::select(*state, *facing);
        if clip != animation.clip {
            animation.clip = clip;
            animation.timer.reset();
            atlas.index = clip.first();
            continue;
        }

        animation.timer.tick(time.delta());
        if animation.timer.just_finished() {
            atlas.index = clip.advance(atlas.index);
        }
    }
}
