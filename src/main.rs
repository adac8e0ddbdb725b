//! Blaster headless runner
//!
//! Plays a scripted session against the simulation and logs the outcome.
//! Usage: `blaster [config.json]`. Set `RUST_LOG=info` (or `debug`) to see
//! what happens along the way.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use serde::Serialize;

    use blaster::sim::{Direction, GamePhase, GameState, TickInput};
    use blaster::{LoggingAudio, SimConfig, SimError, SimResult};

    /// Ten minutes of simulated time at the default tick
    const MAX_TICKS: u64 = 37_500;

    #[derive(Debug, Serialize)]
    struct Summary {
        phase: GamePhase,
        ticks: u64,
        sim_ms: u64,
        score: u64,
        level: usize,
        player_health: u32,
    }

    fn load_config() -> SimResult<SimConfig> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    SimError::configuration(format!("cannot read config '{path}': {e}"))
                })?;
                SimConfig::from_json(&json)
            }
            None => Ok(SimConfig::default()),
        }
    }

    /// Chase the nearest enemy sideways and keep the trigger held
    fn autopilot(state: &GameState) -> TickInput {
        let me = state.player_location();
        let target = state
            .world()
            .active_enemies()
            .iter()
            .map(|e| e.borrow().coordinates())
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));

        let direction = target.and_then(|t| {
            if t.x < me.x - 5.0 {
                Some(Direction::Left)
            } else if t.x > me.x + 5.0 {
                Some(Direction::Right)
            } else {
                None
            }
        });

        TickInput {
            direction,
            fire: target.is_some(),
            pause: false,
        }
    }

    pub fn run() -> SimResult<()> {
        let config = load_config()?;
        let mut state = GameState::new(config, Rc::new(LoggingAudio))?;

        while state.phase == GamePhase::Playing && state.time_ticks < MAX_TICKS {
            let input = autopilot(&state);
            state.tick(&input)?;
        }

        let summary = Summary {
            phase: state.phase,
            ticks: state.time_ticks,
            sim_ms: state.now_ms(),
            score: state.score(),
            level: state.level_manager().current_level(),
            player_health: state.player_health(),
        };
        log::info!("Session over: {:?}", summary);
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Could not serialize summary: {}", e),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Blaster (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("Simulation failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on the web; the host drives GameState itself
}
