//! Game-wide configuration. Every tunable the scene needs (asset paths, platform layout, physics
//! numbers, score rules, sound cues, touch bands) lives in one `GameConfig` resource so the
//! gameplay systems never hard-code layout data.
//!
//! Native builds look for an optional RON override at `assets/config/game.ron`; a missing or
//! invalid file falls back to the built-in defaults with a warning. Web builds always use the
//! defaults.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Location of the optional configuration override, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/config/game.ron";

/// Loads the configuration once at plugin build time and stores it as a resource.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if app.world().contains_resource::<GameConfig>() {
            return;
        }

        app.insert_resource(startup_config());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn startup_config() -> GameConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        info!("No config override at '{}'; using built-in defaults.", CONFIG_PATH);
        return GameConfig::default();
    }

    match load_config(path) {
        Ok(config) => {
            info!("Loaded game config from '{}'.", CONFIG_PATH);
            config
        }
        Err(err) => {
            warn!("Ignoring '{}' ({}); using built-in defaults.", CONFIG_PATH, err);
            GameConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn startup_config() -> GameConfig {
    GameConfig::default()
}

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reads and validates a RON configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GameConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    GameConfig::from_ron_str(&contents)
}

/// A 2D point in arena space. Kept separate from `Vec2` so the RON file reads `(x: .., y: ..)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    /// Arena size in logical units. The arena origin is the top-left corner, y grows downward.
    pub arena: Point,
    pub textures: TexturePaths,
    pub sounds: SoundCues,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub platform_size: Point,
    pub platforms: Vec<PlatformLayout>,
    pub gifts: GiftConfig,
    pub celebration: CelebrationConfig,
    pub touch: TouchConfig,
    /// Fixed RNG seed. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Gift Catcher".to_owned(),
            arena: Point::new(800.0, 600.0),
            textures: TexturePaths::default(),
            sounds: SoundCues::default(),
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            platform_size: Point::new(400.0, 32.0),
            platforms: vec![
                PlatformLayout::scaled(400.0, 568.0, 2.0),
                PlatformLayout::new(600.0, 400.0),
                PlatformLayout::new(50.0, 250.0),
                PlatformLayout::new(750.0, 220.0),
            ],
            gifts: GiftConfig::default(),
            celebration: CelebrationConfig::default(),
            touch: TouchConfig::default(),
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena.x <= 0.0 || self.arena.y <= 0.0 {
            return Err(ConfigError::Invalid("arena size must be positive".into()));
        }
        if self.platforms.is_empty() {
            return Err(ConfigError::Invalid("at least one platform is required".into()));
        }
        if self.gifts.count == 0 {
            return Err(ConfigError::Invalid("gift count must be non-zero".into()));
        }
        if self.gifts.variant_count == 0 {
            return Err(ConfigError::Invalid("gift variant count must be non-zero".into()));
        }
        if !(self.gifts.bounce_min <= self.gifts.bounce_max) {
            return Err(ConfigError::Invalid(format!(
                "gift bounce range is inverted ({} > {})",
                self.gifts.bounce_min, self.gifts.bounce_max
            )));
        }
        if !(self.celebration.duration_secs > 0.0) {
            return Err(ConfigError::Invalid("celebration duration must be positive".into()));
        }
        // A zero repeat interval makes the confetti timer report u32::MAX finishes per tick.
        if !(self.celebration.confetti_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "confetti interval must be positive (got {})",
                self.celebration.confetti_interval_secs
            )));
        }
        if self.touch.left_edge > self.touch.right_edge {
            return Err(ConfigError::Invalid(format!(
                "touch bands are inverted ({} > {})",
                self.touch.left_edge, self.touch.right_edge
            )));
        }
        Ok(())
    }

    pub fn arena_size(&self) -> Vec2 {
        self.arena.into()
    }

    /// Arena-space rectangle covered by a platform layout entry.
    pub fn platform_rect(&self, layout: &PlatformLayout) -> Rect {
        let size = Vec2::from(self.platform_size) * Vec2::from(layout.scale);
        Rect::from_center_size(layout.center.into(), size)
    }

    /// Spawn x of the gift at `index`: `start_x + index * step_x`.
    pub fn gift_spawn_x(&self, index: usize) -> f32 {
        self.gifts.start_x + index as f32 * self.gifts.step_x
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub sky: String,
    pub platform: String,
    pub gift: String,
    pub player: String,
    pub button: String,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            sky: "textures/sky.png".to_owned(),
            platform: "textures/platform.png".to_owned(),
            gift: "textures/gift.png".to_owned(),
            player: "textures/dude.png".to_owned(),
            button: "textures/button.png".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundCues {
    pub pickup: String,
    pub jump: String,
    pub celebrate: String,
    pub spawn: String,
    pub music: String,
    pub music_volume: f32,
}

impl Default for SoundCues {
    fn default() -> Self {
        Self {
            pickup: "audio/pickup.ogg".to_owned(),
            jump: "audio/jump.ogg".to_owned(),
            celebrate: "audio/celebrate.ogg".to_owned(),
            spawn: "audio/spawn.ogg".to_owned(),
            music: "audio/music.ogg".to_owned(),
            music_volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in units/s².
    pub gravity: f32,
    pub max_fall_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 300.0,
            max_fall_speed: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Point,
    /// Sprite sheet frame size; also the collision box.
    pub frame_size: Point,
    pub frame_count: u32,
    pub bounce: f32,
    pub run_speed: f32,
    /// Upward impulse magnitude. Applied as a negative vy since y grows downward.
    pub jump_speed: f32,
    pub frames_per_second: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Point::new(100.0, 450.0),
            frame_size: Point::new(32.0, 48.0),
            frame_count: 9,
            bounce: 0.2,
            run_speed: 160.0,
            jump_speed: 330.0,
            frames_per_second: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformLayout {
    pub center: Point,
    pub scale: Point,
}

impl PlatformLayout {
    pub const fn new(x: f32, y: f32) -> Self {
        Self::scaled(x, y, 1.0)
    }

    pub const fn scaled(x: f32, y: f32, scale: f32) -> Self {
        Self {
            center: Point::new(x, y),
            scale: Point::new(scale, scale),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftConfig {
    pub count: usize,
    pub start_x: f32,
    pub step_x: f32,
    pub spawn_y: f32,
    pub bounce_min: f32,
    pub bounce_max: f32,
    /// Number of cosmetic frames in the gift sheet, laid out in one row.
    pub variant_count: u32,
    pub frame_size: Point,
    /// Rendered and collision size.
    pub size: Point,
    pub points: u32,
}

impl Default for GiftConfig {
    fn default() -> Self {
        Self {
            count: 12,
            start_x: 12.0,
            step_x: 70.0,
            spawn_y: 0.0,
            bounce_min: 0.4,
            bounce_max: 0.8,
            variant_count: 5,
            frame_size: Point::new(32.0, 32.0),
            size: Point::new(24.0, 24.0),
            points: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelebrationConfig {
    pub threshold: u32,
    pub duration_secs: f32,
    pub banner_text: String,
    /// Seconds between confetti spawns while the celebration runs.
    pub confetti_interval_secs: f32,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            threshold: 250,
            duration_secs: 10.0,
            banner_text: "Congratulations!".to_owned(),
            confetti_interval_secs: 0.05,
        }
    }
}

/// Horizontal pointer bands: `x < left_edge` moves left, `x > right_edge` moves right, anything
/// in between jumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub enabled: bool,
    pub left_edge: f32,
    pub right_edge: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            left_edge: 200.0,
            right_edge: 600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gifts.count, 12);
        assert_eq!(config.celebration.threshold, 250);
    }

    #[test]
    fn gift_spawn_positions_step_by_seventy() {
        let config = GameConfig::default();
        assert_eq!(config.gift_spawn_x(0), 12.0);
        assert_eq!(config.gift_spawn_x(1), 82.0);
        assert_eq!(config.gift_spawn_x(11), 782.0);
    }

    #[test]
    fn ground_platform_is_scaled() {
        let config = GameConfig::default();
        let ground = config.platform_rect(&config.platforms[0]);
        assert_eq!(ground.min, Vec2::new(0.0, 536.0));
        assert_eq!(ground.max, Vec2::new(800.0, 600.0));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GameConfig::from_ron_str("(celebration: (threshold: 100))").unwrap();
        assert_eq!(config.celebration.threshold, 100);
        assert_eq!(config.celebration.duration_secs, 10.0);
        assert_eq!(config.gifts.count, 12);
    }

    #[test]
    fn rejects_inverted_touch_bands() {
        let err = GameConfig::from_ron_str("(touch: (left_edge: 700.0, right_edge: 100.0))")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_confetti_interval() {
        for interval in ["0.0", "-0.5"] {
            let ron = format!("(celebration: (confetti_interval_secs: {interval}))");
            let err = GameConfig::from_ron_str(&ron).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
        }
    }

    #[test]
    fn rejects_nan_bounce_bounds() {
        let mut config = GameConfig::default();
        config.gifts.bounce_max = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_ron() {
        let err = GameConfig::from_ron_str("(gifts: (count: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_override_file_parses() {
        let contents = include_str!("../assets/config/game.ron");
        let config = GameConfig::from_ron_str(contents).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
