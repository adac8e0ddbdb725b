//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the tick-driven `SimClock` only
//! - Seeded RNG only
//! - Stable iteration order (world insertion order)
//! - No rendering or platform dependencies

pub mod actor;
pub mod collision;
pub mod effects;
pub mod enemies;
pub mod geometry;
pub mod level;
pub mod path;
pub mod player;
pub mod scheduler;
pub mod shots;
pub mod state;
pub mod tick;
pub mod world;

#[cfg(test)]
pub mod testing;

pub use actor::{Actor, ActorCore, ActorId, ActorKind, ActorRef, ExplosionProperties, ImageDetails};
pub use collision::{HitArbiter, HitResult};
pub use effects::{Explosion, Star, StarField};
pub use enemies::{Bomber, Side, Spinner, Splitter, SplitterFragment};
pub use geometry::{Bounds, Dimensions, Direction, Point, Rect};
pub use level::{Level, LevelManager, LevelState, SpinnerWave, SplitterWave, TextInterlude, Wave};
pub use path::{
    LinePath, Path, PathAction, PathCache, PathCursor, PathEntry, PathKey, PathTemplate,
    ScheduledAction, SplinePath, translate_path,
};
pub use player::Player;
pub use scheduler::{Clock, ClockHandle, Scheduler, SimClock};
pub use shots::{Bullet, Grenade, Shrapnel};
pub use state::{GamePhase, GameState, Sprite};
pub use tick::{TickInput, tick};
pub use world::World;
