//! The player's ship

use super::actor::{Actor, ActorCore, ActorKind, ExplosionProperties, ImageDetails};
use super::collision::HitArbiter;
use super::effects::Explosion;
use super::geometry::{Bounds, Direction, Point};
use super::scheduler::Scheduler;
use super::shots::Bullet;
use super::world::World;
use crate::error::SimResult;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerOp {
    Reloaded,
}

pub struct Player {
    core: ActorCore,
    scheduler: Scheduler<PlayerOp>,
    health: u32,
    /// Clock time until which hits are refused
    invulnerable_until: u64,
    loaded: bool,
    fire_requested: bool,
    steering: Option<Direction>,
    /// Sprite frame: 0 level, 1 banking left, 2 banking right
    current_frame: usize,
}

impl Player {
    pub const INITIAL_HEALTH: u32 = 3;
    pub const SPEED: f32 = 5.0;
    pub const RAM_DAMAGE: u32 = 5;
    pub const RELOAD_MS: i64 = 250;
    pub const INVULNERABLE_MS: u64 = 1000;
    /// Bullets appear this far above the ship's origin
    const MUZZLE_OFFSET: f32 = 20.0;

    pub fn new(world: &World, location: Point) -> Self {
        log::debug!("Player at {}", location);
        Self {
            core: ActorCore::new(location),
            scheduler: Scheduler::new(world.clock_handle()),
            health: Self::INITIAL_HEALTH,
            invulnerable_until: 0,
            loaded: true,
            fire_requested: false,
            steering: None,
            current_frame: 0,
        }
    }

    pub fn explosion_properties() -> ExplosionProperties {
        ExplosionProperties {
            image_name: "player_explosion",
            number_of_frames: 6,
            frame_width: 100,
            scale: 1.0,
            sound_name: "player_explosion",
        }
    }

    /// Steer for the next tick only
    pub fn steer(&mut self, direction: Direction) {
        self.steering = Some(direction);
    }

    /// Fire on the next tick if the gun is loaded
    pub fn request_fire(&mut self) {
        self.fire_requested = true;
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_invulnerable(&self) -> bool {
        self.scheduler.now_ms() < self.invulnerable_until
    }

    fn fire(&mut self, world: &mut World) -> SimResult<()> {
        world.add_actor(Bullet::new(self.core.location.up(Self::MUZZLE_OFFSET)));
        self.loaded = false;
        self.scheduler
            .schedule_operation("reload", Self::RELOAD_MS, PlayerOp::Reloaded)
    }
}

impl Actor for Player {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Player
    }

    /// Hull plus wings
    fn collision_mask(&self) -> Vec<Bounds> {
        vec![
            Bounds::new(-10.0, 10.0, -15.0, 15.0),
            Bounds::new(-25.0, 25.0, 5.0, 12.0),
        ]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        Self::RAM_DAMAGE
    }

    fn hit_by(&mut self, attacker: &dyn Actor, damage: u32) -> bool {
        if !self.core.is_active() || self.is_invulnerable() {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        self.invulnerable_until = self.scheduler.now_ms() + Self::INVULNERABLE_MS;
        log::debug!(
            "Player hit by {:?} for {}, health now {}",
            attacker.id(),
            damage,
            self.health
        );
        true
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("player", 3, 50, self.current_frame)
    }

    fn z_index(&self) -> i32 {
        5
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                PlayerOp::Reloaded => self.loaded = true,
            }
        }

        if self.health == 0 {
            log::info!("Player destroyed at {}", self.core.location);
            let explosion = Explosion::new(world, Self::explosion_properties(), self.core.location);
            world.add_actor(explosion);
            self.core.deactivate();
            return Ok(());
        }

        self.current_frame = match self.steering.take() {
            Some(direction) => {
                self.core
                    .move_within(direction, Self::SPEED, world.dimensions());
                match direction {
                    Direction::Left => 1,
                    Direction::Right => 2,
                    Direction::Up | Direction::Down => 0,
                }
            }
            None => 0,
        };

        if std::mem::take(&mut self.fire_requested) && self.loaded {
            self.fire(world)?;
        }

        for enemy in world.active_enemies() {
            HitArbiter::ram_shared(self, &enemy);
        }
        Ok(())
    }
}
