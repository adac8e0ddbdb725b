//! Fixed timestep simulation tick
//!
//! One call advances the clock by `tick_ms` and runs everything that lives in
//! simulation time, in a fixed order.

use super::actor::Actor;
use super::geometry::Direction;
use super::state::{GamePhase, GameState};
use crate::error::SimResult;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steer the player this tick
    pub direction: Option<Direction>,
    /// Fire if the gun is loaded
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) -> SimResult<()> {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return Ok(());
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    state.clock.advance(state.config.tick_ms);
    state.time_ticks += 1;

    {
        let mut player = state.player.borrow_mut();
        if let Some(direction) = input.direction {
            player.steer(direction);
        }
        if input.fire {
            player.request_fire();
        }
    }

    state.stars.tick(&mut state.world)?;
    state.levels.tick(&mut state.world)?;
    state.world.tick_actors()?;

    let reaped = state.world.reap_inactive();
    if reaped > 0 {
        log::trace!("tick {}: reaped {} actor(s)", state.time_ticks, reaped);
    }

    if !state.player.borrow().is_active() {
        log::info!(
            "Game over at tick {} with score {}",
            state.time_ticks,
            state.world.score()
        );
        state.phase = GamePhase::GameOver;
    } else if !state.levels.is_active() {
        log::info!(
            "Game won at tick {} with score {}",
            state.time_ticks,
            state.world.score()
        );
        state.phase = GamePhase::Won;
    }
    Ok(())
}

impl GameState {
    pub fn tick(&mut self, input: &TickInput) -> SimResult<()> {
        tick(self, input)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::audio::NullAudio;
    use crate::config::SimConfig;
    use crate::sim::geometry::Point;
    use crate::sim::level::LevelState;
    use crate::sim::player::Player;
    use crate::sim::testing::{RecordingAudio, StubActor};

    fn new_game(config: SimConfig) -> GameState {
        GameState::new(config, Rc::new(NullAudio)).unwrap()
    }

    /// Weave left and right, firing every few ticks
    fn scripted_input(t: u64) -> TickInput {
        let direction = match (t / 40) % 4 {
            0 => Some(Direction::Left),
            2 => Some(Direction::Right),
            _ => None,
        };
        TickInput {
            direction,
            fire: t % 5 == 0,
            pause: false,
        }
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut state = new_game(SimConfig::default());
        state.tick(&TickInput::default()).unwrap();
        state.tick(&TickInput::default()).unwrap();
        assert_eq!(state.time_ticks, 2);
        assert_eq!(state.now_ms(), 32);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = new_game(SimConfig::default());
        state.tick(&TickInput::default()).unwrap();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        state.tick(&pause).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused ticks do nothing
        let before = state.now_ms();
        state.tick(&TickInput::default()).unwrap();
        assert_eq!(state.now_ms(), before);
        assert_eq!(state.time_ticks, 1);

        // Unpausing ticks straight away
        state.tick(&pause).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_steering_and_firing() {
        let mut state = new_game(SimConfig::default());
        let start = state.player_location();
        state
            .tick(&TickInput {
                direction: Some(Direction::Right),
                fire: true,
                pause: false,
            })
            .unwrap();

        assert_eq!(state.player_location(), start.right(Player::SPEED));
        let bullets: Vec<_> = state
            .sprites()
            .into_iter()
            .filter(|s| s.image.name == "bullet")
            .collect();
        assert_eq!(bullets.len(), 1);

        // The bullet starts moving on the next tick
        let fired_at = bullets[0].location;
        state.tick(&TickInput::default()).unwrap();
        let bullet = state
            .sprites()
            .into_iter()
            .find(|s| s.image.name == "bullet")
            .unwrap();
        assert_eq!(bullet.location, fired_at.up(10.0));
    }

    #[test]
    fn test_level_intro_then_splitters() {
        let mut state = new_game(SimConfig::default());
        // 2s before the text shows, 4s shown, 2s after
        let intro_ticks = 8000 / state.config.tick_ms + 1;
        for _ in 0..intro_ticks {
            state.tick(&TickInput::default()).unwrap();
        }
        assert_eq!(state.level_manager().state(), LevelState::Play);

        state.tick(&TickInput::default()).unwrap();
        assert_eq!(state.world().active_enemies().len(), 1);
    }

    #[test]
    fn test_intro_sound() {
        let audio = Rc::new(RecordingAudio::default());
        let mut state = GameState::new(SimConfig::default(), audio.clone()).unwrap();
        for _ in 0..(2000 / state.config.tick_ms + 1) {
            state.tick(&TickInput::default()).unwrap();
        }
        assert!(audio.played().contains(&"level_start".to_string()));
    }

    #[test]
    fn test_game_over_when_player_destroyed() {
        let mut state = new_game(SimConfig::default());
        let attacker = StubActor::enemy(Point::new(0.0, 0.0));
        state
            .player
            .borrow_mut()
            .hit_by(&attacker, Player::INITIAL_HEALTH);

        state.tick(&TickInput::default()).unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);

        // Game over is final
        let before = state.time_ticks;
        state.tick(&TickInput::default()).unwrap();
        assert_eq!(state.time_ticks, before);
    }

    #[test]
    fn test_win_with_empty_waves() {
        let mut state = new_game(SimConfig {
            levels: 1,
            splitters_per_wave: 0,
            spinners_per_wave: 0,
            ..SimConfig::default()
        });
        let mut ticks = 0;
        while state.phase == GamePhase::Playing && ticks < 5000 {
            state.tick(&TickInput::default()).unwrap();
            ticks += 1;
        }
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_determinism() {
        let config = SimConfig {
            seed: 12345,
            ..SimConfig::default()
        };
        let mut a = new_game(config.clone());
        let mut b = new_game(config);

        for t in 0..1500 {
            let input = scripted_input(t);
            a.tick(&input).unwrap();
            b.tick(&input).unwrap();
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score(), b.score());
        assert_eq!(a.player_health(), b.player_health());
        assert_eq!(a.player_location(), b.player_location());

        assert_eq!(a.sprites(), b.sprites());
    }
}
