//! Screen-space UI: the title screen with its START button, the score readout, and the pause
//! overlay.
//!
//! UI entities are part of Bevy's ECS; once despawned, all associated style/text components are
//! dropped automatically.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::score::ScoreBoard;
use crate::state::{GameSet, GameState};

/// Registers title, HUD, and pause overlay systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Title), spawn_title_screen)
            .add_systems(Update, press_start.run_if(in_state(GameState::Title)))
            .add_systems(
                OnExit(GameState::Title),
                (despawn_title_screen, spawn_score_text),
            )
            .add_systems(Update, refresh_score_text.in_set(GameSet::Effects))
            .add_systems(OnEnter(GameState::Paused), spawn_pause_menu)
            .add_systems(OnExit(GameState::Paused), despawn_pause_menu);
    }
}

#[derive(Component)]
struct TitleScreen;

#[derive(Component)]
pub struct StartButton;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
struct PauseMenu;

/// Full-screen transparent node holding the centered START button.
fn spawn_title_screen(
    mut commands: Commands,
    config: Res<GameConfig>,
    asset_server: Res<AssetServer>,
) {
    commands
        .spawn((
            TitleScreen,
            Name::new("TitleScreen"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    row_gap: Val::Px(32.0),
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                config.title.clone(),
                TextStyle {
                    font_size: 56.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));

            parent
                .spawn((
                    StartButton,
                    Name::new("StartButton"),
                    ButtonBundle {
                        style: Style {
                            width: Val::Px(240.0),
                            height: Val::Px(80.0),
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                        image: UiImage::new(asset_server.load(config.textures.button.clone())),
                        ..default()
                    },
                ))
                .with_children(|button| {
                    button.spawn(TextBundle::from_section(
                        "START",
                        TextStyle {
                            font_size: 32.0,
                            color: Color::BLACK,
                            ..default()
                        },
                    ));
                });
        });
}

/// A click or tap on START begins gameplay. The transition itself (and the one-shot setup hanging
/// off `OnExit(GameState::Title)`) is applied by Bevy at the start of the next frame.
fn press_start(
    buttons: Query<&Interaction, (Changed<Interaction>, With<StartButton>)>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if buttons
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed)
    {
        next_state.set(GameState::Playing);
    }
}

fn despawn_title_screen(mut commands: Commands, query: Query<Entity, With<TitleScreen>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn spawn_score_text(mut commands: Commands, board: Res<ScoreBoard>) {
    commands.spawn((
        ScoreText,
        Name::new("ScoreText"),
        TextBundle::from_section(
            board.label(),
            TextStyle {
                font_size: 32.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(16.0),
            ..default()
        }),
    ));
}

fn refresh_score_text(board: Res<ScoreBoard>, mut texts: Query<&mut Text, With<ScoreText>>) {
    if !board.is_changed() {
        return;
    }

    for mut text in &mut texts {
        if let Some(section) = text.sections.first_mut() {
            section.value = board.label();
        }
    }
}

/// Spawns a full-screen UI node with centered text. Nodes live in the `Ui` world and are rendered
/// by the UI camera automatically.
fn spawn_pause_menu(mut commands: Commands) {
    commands
        .spawn((
            PauseMenu,
            Name::new("PauseMenu"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Paused\nPress ESC to resume",
                TextStyle {
                    font_size: 36.0,
                    color: Color::srgba(0.9, 0.9, 0.9, 1.0),
                    ..default()
                },
            ));
        });
}

/// Removes the pause menu overlay on state exit.
fn despawn_pause_menu(mut commands: Commands, query: Query<Entity, With<PauseMenu>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
