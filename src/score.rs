//! Score tracking and the collection event.
//!
//! `collect_gifts` is the only writer of the score. Everything a pickup sets off (sound, burst,
//! celebration banner, respawn cue) hangs off the events it sends, so the collection step itself
//! stays a synchronous state mutation within one frame.

use bevy::prelude::*;

use crate::collectible::{deactivate, is_active, reactivate, Gift};
use crate::collision::{overlaps, Body};
use crate::config::GameConfig;
use crate::level::ArenaPosition;
use crate::movement::Velocity;
use crate::player::Player;
use crate::state::GameSet;

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScoreBoard>()
            .add_event::<GiftCollected>()
            .add_event::<CelebrationStarted>()
            .add_event::<FieldRespawned>()
            .add_systems(Update, collect_gifts.in_set(GameSet::Collection));
    }
}

#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    pub score: u32,
    pub celebrated: bool,
}

/// Outcome of a single award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub score: u32,
    pub celebrate: bool,
}

impl ScoreBoard {
    /// Adds `points`. `celebrate` is true the first time the score lands exactly on `threshold`.
    pub fn award(&mut self, points: u32, threshold: u32) -> Award {
        self.score = self.score.saturating_add(points);

        let celebrate = !self.celebrated && self.score == threshold;
        if celebrate {
            self.celebrated = true;
        }

        Award {
            score: self.score,
            celebrate,
        }
    }

    pub fn label(&self) -> String {
        format!("Score: {}", self.score)
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GiftCollected {
    /// Arena position of the gift when it was taken.
    pub position: Vec2,
    pub score: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CelebrationStarted {
    pub score: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct FieldRespawned {
    pub count: usize,
}

type GiftQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Gift,
        &'static mut ArenaPosition,
        &'static mut Velocity,
        &'static mut Body,
        &'static mut Visibility,
    ),
    Without<Player>,
>;

fn collect_gifts(
    config: Res<GameConfig>,
    mut board: ResMut<ScoreBoard>,
    player: Query<(&ArenaPosition, &Body), With<Player>>,
    mut gifts: GiftQuery,
    mut collected: EventWriter<GiftCollected>,
    mut celebrations: EventWriter<CelebrationStarted>,
    mut respawns: EventWriter<FieldRespawned>,
) {
    let Ok((player_position, player_body)) = player.get_single() else {
        return;
    };
    let player_box = player_body.aabb(player_position.0);

    let touched: Vec<Entity> = gifts
        .iter()
        .filter(|(_, _, position, _, body, _)| {
            is_active(body) && overlaps(player_box, body.aabb(position.0))
        })
        .map(|(entity, ..)| entity)
        .collect();

    for entity in touched {
        let Ok((_, _, position, _, mut body, mut visibility)) = gifts.get_mut(entity) else {
            continue;
        };
        let taken_at = position.0;
        deactivate(&mut body, &mut visibility);

        let award = board.award(config.gifts.points, config.celebration.threshold);
        collected.send(GiftCollected {
            position: taken_at,
            score: award.score,
        });

        if award.celebrate {
            info!("Score reached {}; starting celebration.", award.score);
            celebrations.send(CelebrationStarted { score: award.score });
        }

        let remaining = gifts.iter().filter(|(.., body, _)| is_active(body)).count();
        if remaining == 0 {
            let mut count = 0;
            for (_, gift, mut position, mut velocity, mut body, mut visibility) in &mut gifts {
                reactivate(
                    gift,
                    config.gifts.spawn_y,
                    &mut position,
                    &mut velocity,
                    &mut body,
                    &mut visibility,
                );
                count += 1;
            }

            debug!("All gifts collected; respawned {}.", count);
            respawns.send(FieldRespawned { count });
            // An empty field means every touched gift was already taken; overlaps with the
            // respawned batch are picked up next frame.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_award_adds_exactly_the_points() {
        let mut board = ScoreBoard::default();
        for expected in (10..=300).step_by(10) {
            let award = board.award(10, 250);
            assert_eq!(award.score, expected);
        }
    }

    #[test]
    fn celebration_fires_once_at_threshold() {
        let mut board = ScoreBoard::default();
        let fired: Vec<u32> = (0..40)
            .map(|_| board.award(10, 250))
            .filter(|award| award.celebrate)
            .map(|award| award.score)
            .collect();

        assert_eq!(fired, vec![250]);
    }

    #[test]
    fn label_tracks_score() {
        let mut board = ScoreBoard::default();
        board.award(10, 250);
        assert_eq!(board.label(), "Score: 10");
    }

    const PLAYER_AT: Vec2 = Vec2::new(100.0, 450.0);

    fn collection_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GameConfig::default())
            .add_plugins(ScorePlugin);

        app.world_mut().spawn((
            Player,
            ArenaPosition(PLAYER_AT),
            Body::from_size(Vec2::new(32.0, 48.0)),
        ));
        app
    }

    /// Spawns the full field of 12 gifts; the first `overlapping` sit on the player, the rest are
    /// parked far away.
    fn spawn_field(app: &mut App, overlapping: usize) -> Vec<Entity> {
        let config = GameConfig::default();
        (0..config.gifts.count)
            .map(|index| {
                let position = if index < overlapping {
                    PLAYER_AT
                } else {
                    Vec2::new(config.gift_spawn_x(index), 100.0)
                };
                app.world_mut()
                    .spawn((
                        Gift {
                            spawn_x: config.gift_spawn_x(index),
                            variant: 0,
                        },
                        ArenaPosition(position),
                        Velocity::default(),
                        Body::from_size(Vec2::splat(24.0)),
                        Visibility::default(),
                    ))
                    .id()
            })
            .collect()
    }

    fn active_count(app: &mut App) -> usize {
        let mut query = app.world_mut().query::<(&Gift, &Body)>();
        query
            .iter(app.world())
            .filter(|(_, body)| is_active(body))
            .count()
    }

    fn move_gift(app: &mut App, gift: Entity, to: Vec2) {
        app.world_mut().get_mut::<ArenaPosition>(gift).unwrap().0 = to;
    }

    #[test]
    fn overlap_collects_and_hides_gift() {
        let mut app = collection_app();
        let gifts = spawn_field(&mut app, 1);
        app.update();

        assert_eq!(app.world().resource::<ScoreBoard>().score, 10);
        assert_eq!(active_count(&mut app), 11);
        assert_eq!(
            *app.world().get::<Visibility>(gifts[0]).unwrap(),
            Visibility::Hidden
        );
        assert_eq!(app.world().resource::<Events<GiftCollected>>().len(), 1);

        // A hidden gift is never collected twice.
        app.update();
        assert_eq!(app.world().resource::<ScoreBoard>().score, 10);
    }

    #[test]
    fn last_gift_respawns_whole_field_in_same_step() {
        let mut app = collection_app();
        let gifts = spawn_field(&mut app, 0);
        for gift in &gifts[1..] {
            app.world_mut().get_mut::<Body>(*gift).unwrap().enabled = false;
        }
        move_gift(&mut app, gifts[0], PLAYER_AT);
        assert_eq!(active_count(&mut app), 1);

        app.update();

        assert_eq!(active_count(&mut app), 12);
        let config = GameConfig::default();
        for (index, gift) in gifts.iter().enumerate() {
            let position = app.world().get::<ArenaPosition>(*gift).unwrap();
            assert_eq!(position.0, Vec2::new(config.gift_spawn_x(index), 0.0));
        }
        assert_eq!(app.world().resource::<Events<FieldRespawned>>().len(), 1);
    }

    #[test]
    fn respawned_gift_under_player_is_taken_next_frame() {
        let mut app = collection_app();
        spawn_field(&mut app, 12);
        app.update();

        assert_eq!(app.world().resource::<ScoreBoard>().score, 120);
        assert_eq!(app.world().resource::<Events<FieldRespawned>>().len(), 1);
        assert_eq!(active_count(&mut app), 12);

        // Pressed against the top of the arena, right under the second spawn column.
        let mut player = app.world_mut().query_filtered::<&mut ArenaPosition, With<Player>>();
        player.single_mut(app.world_mut()).0 = Vec2::new(82.0, 20.0);
        app.update();

        assert_eq!(app.world().resource::<ScoreBoard>().score, 130);
        assert_eq!(active_count(&mut app), 11);
    }

    #[test]
    fn twenty_five_pickups_respawn_twice_and_celebrate_once() {
        let mut app = collection_app();
        let gifts = spawn_field(&mut app, 0);
        let mut respawns = 0;
        let mut celebrations = 0;

        for pickup in 0..25 {
            let gift = gifts[pickup % gifts.len()];
            move_gift(&mut app, gift, PLAYER_AT);
            app.update();

            // Park the collected gift away from the player again once it is back in play.
            move_gift(&mut app, gift, Vec2::new(700.0, 0.0));

            respawns += app
                .world_mut()
                .resource_mut::<Events<FieldRespawned>>()
                .drain()
                .count();
            celebrations += app
                .world_mut()
                .resource_mut::<Events<CelebrationStarted>>()
                .drain()
                .count();

            let score = app.world().resource::<ScoreBoard>().score;
            assert_eq!(score, (pickup as u32 + 1) * 10);
            if pickup == 11 {
                assert_eq!(score, 120);
                assert_eq!(respawns, 1);
            }
        }

        assert_eq!(respawns, 2);
        assert_eq!(celebrations, 1);
        assert_eq!(app.world().resource::<ScoreBoard>().score, 250);
    }
}
