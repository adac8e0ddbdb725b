//! Non-combat actors: explosions and the scrolling star field

use rand::Rng;

use super::actor::{Actor, ActorCore, ActorKind, ExplosionProperties, ImageDetails};
use super::geometry::{Direction, Point};
use super::scheduler::Scheduler;
use super::world::World;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExplosionOp {
    AdvanceFrame,
}

/// One-shot explosion animation
pub struct Explosion {
    core: ActorCore,
    properties: ExplosionProperties,
    scheduler: Scheduler<ExplosionOp>,
    current_frame: usize,
    first_tick: bool,
}

impl Explosion {
    pub const FRAME_INTERVAL_MS: i64 = 80;

    pub fn new(world: &World, properties: ExplosionProperties, location: Point) -> Self {
        log::debug!("Explosion '{}' at {}", properties.image_name, location);
        Self {
            core: ActorCore::new(location),
            properties,
            scheduler: Scheduler::new(world.clock_handle()),
            current_frame: 0,
            first_tick: true,
        }
    }

    pub fn scale(&self) -> f32 {
        self.properties.scale
    }
}

impl Actor for Explosion {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Explosion
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new(
            self.properties.image_name,
            self.properties.number_of_frames,
            self.properties.frame_width,
            self.current_frame,
        )
    }

    fn z_index(&self) -> i32 {
        10
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.first_tick {
            world.audio().play(self.properties.sound_name);
            self.scheduler
                .schedule_recurring("advanceFrame", Self::FRAME_INTERVAL_MS, ExplosionOp::AdvanceFrame)?;
            self.first_tick = false;
        }

        while let Some(op) = self.scheduler.next_due() {
            match op {
                ExplosionOp::AdvanceFrame => {
                    self.current_frame += 1;
                    if self.current_frame >= self.properties.number_of_frames {
                        // Hold the last frame for the renderer
                        self.current_frame = self.properties.number_of_frames - 1;
                        self.core.deactivate();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Blow up an enemy: explosion in its place, points on the board, gone
pub fn destroy_enemy(
    world: &mut World,
    core: &mut ActorCore,
    properties: ExplosionProperties,
    score: u64,
) {
    let explosion = Explosion::new(world, properties, core.location);
    world.add_actor(explosion);
    world.add_score(score);
    core.deactivate();
}

/// Background star drifting down the screen
pub struct Star {
    core: ActorCore,
}

impl Star {
    pub fn new(location: Point) -> Self {
        Self {
            core: ActorCore::new(location),
        }
    }
}

impl Actor for Star {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Scenery
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("star", 1, 3, 0)
    }

    fn z_index(&self) -> i32 {
        -10
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        self.core.move_in(Direction::Down, 1.0);
        if self.core.location.y > world.dimensions().height {
            self.core.deactivate();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StarFieldOp {
    AddStar,
}

/// Keeps the background full of stars
pub struct StarField {
    scheduler: Scheduler<StarFieldOp>,
    first_tick: bool,
}

impl StarField {
    /// Chance per row, in percent, of a star when the field is first filled
    const INITIAL_DENSITY: u32 = 5;
    const MARGIN: f32 = 10.0;

    pub fn new(world: &World) -> SimResult<Self> {
        let width = world.dimensions().width;
        if width <= 2.0 * Self::MARGIN {
            return Err(SimError::configuration(format!(
                "world width {width} leaves no room for stars"
            )));
        }
        log::debug!("StarField");
        Ok(Self {
            scheduler: Scheduler::new(world.clock_handle()),
            first_tick: true,
        })
    }

    pub fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.first_tick {
            self.fill(world);
            self.schedule_next_star(world)?;
            self.first_tick = false;
        }

        while let Some(op) = self.scheduler.next_due() {
            match op {
                StarFieldOp::AddStar => {
                    let x = Self::random_x(world);
                    world.add_actor(Star::new(Point::new(x, 0.0)));
                    self.schedule_next_star(world)?;
                }
            }
        }
        Ok(())
    }

    fn fill(&self, world: &mut World) {
        let height = world.dimensions().height as u32;
        for y in 0..height {
            if world.rng().random_range(0..100) < Self::INITIAL_DENSITY {
                let x = Self::random_x(world);
                world.add_actor(Star::new(Point::new(x, y as f32)));
            }
        }
    }

    fn schedule_next_star(&mut self, world: &mut World) -> SimResult<()> {
        let delay = world.rng().random_range(500..1000);
        self.scheduler.schedule_operation("addStar", delay, StarFieldOp::AddStar)
    }

    fn random_x(world: &mut World) -> f32 {
        let width = world.dimensions().width;
        world.rng().random_range(Self::MARGIN..width - Self::MARGIN).floor()
    }
}
