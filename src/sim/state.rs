//! Top-level game state
//!
//! Owns the clock, the world and everything that feeds actors into it. The
//! host drives it one tick at a time through [`tick`](super::tick::tick) and
//! reads back [`Sprite`]s to draw.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::actor::{Actor, ActorId, ImageDetails};
use super::effects::StarField;
use super::geometry::{Dimensions, Point};
use super::level::{Level, LevelManager, SpinnerWave, SplitterWave, Wave};
use super::player::Player;
use super::scheduler::{Clock, SimClock};
use super::world::World;
use crate::audio::AudioPlayer;
use crate::config::SimConfig;
use crate::error::SimResult;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    Playing,
    /// Clock stopped, nothing moves
    Paused,
    /// The player was destroyed
    GameOver,
    /// Every level cleared
    Won,
}

/// What the renderer needs to draw one actor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    pub id: ActorId,
    pub location: Point,
    pub image: ImageDetails,
    pub z_index: i32,
}

pub struct GameState {
    pub config: SimConfig,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) clock: SimClock,
    pub(crate) world: World,
    pub(crate) levels: LevelManager,
    pub(crate) stars: StarField,
    pub(crate) player: Rc<RefCell<Player>>,
}

impl GameState {
    /// Distance of the player's start position from the bottom edge
    const PLAYER_START_OFFSET: f32 = 50.0;

    pub fn new(config: SimConfig, audio: Rc<dyn AudioPlayer>) -> SimResult<Self> {
        config.validate()?;
        log::info!(
            "New game: {}x{} world, {} level(s), seed {}",
            config.world_width,
            config.world_height,
            config.levels,
            config.seed
        );

        let clock = SimClock::new();
        let dimensions = Dimensions::new(config.world_width, config.world_height);
        let mut world = World::new(dimensions, clock.clone(), audio, config.seed);

        let levels = (0..config.levels)
            .map(|_| {
                let waves: Vec<Box<dyn Wave>> = vec![
                    Box::new(SplitterWave::new(&world, config.splitters_per_wave)?),
                    Box::new(SpinnerWave::new(
                        &world,
                        config.spinners_per_wave,
                        config.bombers_per_wave,
                    )?),
                ];
                Ok(Level::new(waves))
            })
            .collect::<SimResult<Vec<_>>>()?;
        let levels = LevelManager::new(levels)?;

        let stars = StarField::new(&world)?;
        let start = Point::new(
            dimensions.width / 2.0,
            dimensions.height - Self::PLAYER_START_OFFSET,
        );
        let player = Player::new(&world, start);
        let player = world.add_actor(player);

        Ok(Self {
            config,
            phase: GamePhase::Playing,
            time_ticks: 0,
            clock,
            world,
            levels,
            stars,
            player,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn level_manager(&self) -> &LevelManager {
        &self.levels
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn score(&self) -> u64 {
        self.world.score()
    }

    pub fn player_health(&self) -> u32 {
        self.player.borrow().health()
    }

    pub fn player_location(&self) -> Point {
        self.player.borrow().coordinates()
    }

    /// Every live actor, back to front
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites: Vec<Sprite> = self
            .world
            .actors()
            .iter()
            .map(|a| a.borrow())
            .filter(|a| a.is_active())
            .map(|a| Sprite {
                id: a.id(),
                location: a.coordinates(),
                image: a.image_details(),
                z_index: a.z_index(),
            })
            .collect();
        sprites.sort_by_key(|s| (s.z_index, s.id));
        sprites
    }
}
