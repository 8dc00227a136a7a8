//! Audio cues and background music. Stashes Bevy `Handle<AudioSource>` references so they are kept
//! alive in memory.
//!
//! Bevy's asset system reference-counts handles; when the last handle is dropped, the underlying
//! audio buffer is released. The `AudioHandles` resource keeps every cue alive for the whole run.
//! One-shot cues are spawned as self-despawning audio entities, and only once their source has
//! finished loading: a cue that is not ready is skipped instead of playing late.

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::movement::PlayerJumped;
use crate::score::{CelebrationStarted, FieldRespawned, GiftCollected};
use crate::state::{GameSet, GameState};

/// Registers audio loading, the music start, and the cue players.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(Startup, load_audio_handles)
            .add_systems(OnExit(GameState::Title), start_music)
            .add_systems(Update, play_cues.in_set(GameSet::Effects));
    }
}

/// Resource that stores optional handles to game-wide audio clips. Because each `Handle` is just a
/// cloneable pointer into Bevy's asset storage, this struct is cheap to copy and keeps asset memory
/// alive until explicit replacement.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub jump: Option<Handle<AudioSource>>,
    pub pickup: Option<Handle<AudioSource>>,
    pub celebrate: Option<Handle<AudioSource>>,
    pub spawn: Option<Handle<AudioSource>>,
    pub music: Option<Handle<AudioSource>>,
}

#[derive(Component)]
pub struct BackgroundMusic;

/// Queues every clip named in the config. The server fetches them asynchronously; cues fired before
/// a clip is ready are dropped by [`cue_ready`].
fn load_audio_handles(
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
    mut handles: ResMut<AudioHandles>,
) {
    let sounds = &config.sounds;
    handles.jump = Some(asset_server.load(sounds.jump.clone()));
    handles.pickup = Some(asset_server.load(sounds.pickup.clone()));
    handles.celebrate = Some(asset_server.load(sounds.celebrate.clone()));
    handles.spawn = Some(asset_server.load(sounds.spawn.clone()));
    handles.music = Some(asset_server.load(sounds.music.clone()));

    info!("Queued audio cues from assets/audio/.");
}

/// Returns the handle when its clip is loaded and playable.
pub fn cue_ready<'a>(
    sources: &Assets<AudioSource>,
    handle: &'a Option<Handle<AudioSource>>,
) -> Option<&'a Handle<AudioSource>> {
    handle.as_ref().filter(|handle| sources.contains(handle.id()))
}

/// Music starts with gameplay, i.e. after the click that dismissed the title screen. Playback
/// begins as soon as the clip finishes loading.
fn start_music(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    config: Res<GameConfig>,
    existing: Query<(), With<BackgroundMusic>>,
) {
    if !existing.is_empty() {
        return;
    }

    let Some(source) = handles.music.clone() else {
        warn!("No music handle queued; playing without background music.");
        return;
    };

    commands.spawn((
        Name::new("BackgroundMusic"),
        BackgroundMusic,
        AudioBundle {
            source,
            settings: PlaybackSettings::LOOP.with_volume(Volume::new(config.sounds.music_volume)),
        },
    ));
}

fn play_cue(
    commands: &mut Commands,
    sources: &Assets<AudioSource>,
    handle: &Option<Handle<AudioSource>>,
    name: &'static str,
) {
    let Some(source) = cue_ready(sources, handle) else {
        debug!("Skipping '{}' cue; clip not loaded.", name);
        return;
    };

    commands.spawn((
        Name::new(name),
        AudioBundle {
            source: source.clone(),
            settings: PlaybackSettings::DESPAWN,
        },
    ));
}

fn play_cues(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    sources: Res<Assets<AudioSource>>,
    mut jumps: EventReader<PlayerJumped>,
    mut pickups: EventReader<GiftCollected>,
    mut celebrations: EventReader<CelebrationStarted>,
    mut respawns: EventReader<FieldRespawned>,
) {
    for _ in jumps.read() {
        play_cue(&mut commands, &sources, &handles.jump, "JumpCue");
    }
    for _ in pickups.read() {
        play_cue(&mut commands, &sources, &handles.pickup, "PickupCue");
    }
    for _ in celebrations.read() {
        play_cue(&mut commands, &sources, &handles.celebrate, "CelebrateCue");
    }
    for _ in respawns.read() {
        play_cue(&mut commands, &sources, &handles.spawn, "SpawnCue");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_cues_are_not_ready() {
        let sources = Assets::<AudioSource>::default();
        assert!(cue_ready(&sources, &None).is_none());
        assert!(cue_ready(&sources, &Some(Handle::default())).is_none());
    }

    #[test]
    fn loaded_cues_are_ready() {
        let mut sources = Assets::<AudioSource>::default();
        let handle = sources.add(AudioSource {
            bytes: Vec::new().into(),
        });
        let slot = Some(handle.clone());
        assert_eq!(cue_ready(&sources, &slot), Some(&handle));
    }

    #[test]
    fn pickup_without_loaded_clip_spawns_nothing() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<AudioHandles>()
            .init_resource::<Assets<AudioSource>>()
            .add_event::<PlayerJumped>()
            .add_event::<GiftCollected>()
            .add_event::<CelebrationStarted>()
            .add_event::<FieldRespawned>()
            .add_systems(Update, play_cues);

        app.world_mut().send_event(GiftCollected {
            position: Vec2::ZERO,
            score: 10,
        });
        app.update();

        let mut names = app.world_mut().query::<&Name>();
        assert_eq!(names.iter(app.world()).count(), 0);
    }
}
