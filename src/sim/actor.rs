//! The contract every simulated entity implements
//!
//! Actors live in the [`World`](super::world::World) as shared
//! `Rc<RefCell<dyn Actor>>` handles. Each tick an actor runs its own scheduled
//! operations, moves, tries to hit the opposing side and finally deactivates
//! or spawns successors. Once inactive, an actor is never reactivated and must
//! not cause further damage or spawns.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Dimensions, Direction, Point};
use super::world::World;
use crate::error::SimResult;

/// Shared handle to a live actor
pub type ActorRef = Rc<RefCell<dyn Actor>>;

/// Actor identity, handed out by the [`World`] in the order actors join it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl ActorId {
    /// Carried until the actor is added to a world
    pub const UNASSIGNED: ActorId = ActorId(0);
}

/// Which side of the fight an actor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Enemy,
    Shot,
    Explosion,
    /// Background decoration, never collides
    Scenery,
}

/// Sprite sheet lookup for the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDetails {
    pub name: &'static str,
    pub number_of_frames: usize,
    pub frame_width: u32,
    pub current_frame: usize,
}

impl ImageDetails {
    pub const fn new(
        name: &'static str,
        number_of_frames: usize,
        frame_width: u32,
        current_frame: usize,
    ) -> Self {
        Self {
            name,
            number_of_frames,
            frame_width,
            current_frame,
        }
    }
}

/// How an enemy blows up
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExplosionProperties {
    pub image_name: &'static str,
    pub number_of_frames: usize,
    pub frame_width: u32,
    pub scale: f32,
    pub sound_name: &'static str,
}

pub trait Actor {
    fn core(&self) -> &ActorCore;

    fn core_mut(&mut self) -> &mut ActorCore;

    fn kind(&self) -> ActorKind;

    fn tick(&mut self, world: &mut World) -> SimResult<()>;

    fn collision_mask(&self) -> Vec<Bounds> {
        Vec::new()
    }

    /// Damage this actor deals to `target` on a hit
    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        0
    }

    /// Apply a hit. Returns whether the hit was accepted.
    fn hit_by(&mut self, _attacker: &dyn Actor, _damage: u32) -> bool {
        false
    }

    fn image_details(&self) -> ImageDetails;

    fn z_index(&self) -> i32 {
        0
    }

    fn id(&self) -> ActorId {
        self.core().id
    }

    fn is_active(&self) -> bool {
        self.core().active
    }

    fn coordinates(&self) -> Point {
        self.core().location
    }
}

/// State every actor carries
#[derive(Debug, Clone)]
pub struct ActorCore {
    pub id: ActorId,
    pub location: Point,
    active: bool,
}

impl ActorCore {
    pub fn new(location: Point) -> Self {
        Self {
            id: ActorId::UNASSIGNED,
            location,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// One-way switch to inactive
    pub fn deactivate(&mut self) {
        if self.active {
            log::trace!("deactivating actor {:?} at {}", self.id, self.location);
        }
        self.active = false;
    }

    pub fn move_in(&mut self, direction: Direction, count: f32) {
        self.location = direction.step(self.location, count);
    }

    /// Move, but keep the origin inside the world
    pub fn move_within(&mut self, direction: Direction, count: f32, dims: Dimensions) {
        let p = direction.step(self.location, count);
        self.location = Point::new(p.x.clamp(0.0, dims.width), p.y.clamp(0.0, dims.height));
    }
}

/// Animation frame cycling through a fixed sequence of sprite indices
#[derive(Debug, Clone)]
pub struct FrameCycle {
    frames: &'static [usize],
    position: usize,
}

impl FrameCycle {
    pub const fn new(frames: &'static [usize]) -> Self {
        Self {
            frames,
            position: 0,
        }
    }

    pub fn advance(&mut self) {
        self.position = (self.position + 1) % self.frames.len();
    }

    pub fn current(&self) -> usize {
        self.frames[self.position]
    }
}

/// Wrap a concrete actor as a shared handle
pub fn share<A: Actor + 'static>(actor: A) -> Rc<RefCell<A>> {
    Rc::new(RefCell::new(actor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::StubActor;

    #[test]
    fn test_actor_starts_active_at_coordinates() {
        let actor = StubActor::enemy(Point::new(12.0, 23.0));
        assert!(actor.is_active());
        assert_eq!(actor.coordinates(), Point::new(12.0, 23.0));
    }

    #[test]
    fn test_actor_id_unassigned_outside_world() {
        let actor = StubActor::enemy(Point::new(1.0, 2.0));
        assert_eq!(actor.id(), ActorId::UNASSIGNED);
    }

    #[test]
    fn test_hit_by_defaults_to_rejecting() {
        struct Rock(ActorCore);
        impl Actor for Rock {
            fn core(&self) -> &ActorCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut ActorCore {
                &mut self.0
            }
            fn kind(&self) -> ActorKind {
                ActorKind::Scenery
            }
            fn tick(&mut self, _world: &mut World) -> SimResult<()> {
                Ok(())
            }
            fn image_details(&self) -> ImageDetails {
                ImageDetails::new("rock", 1, 10, 0)
            }
        }
        let mut rock = Rock(ActorCore::new(Point::new(1.0, 2.0)));
        let shot = StubActor::shot(Point::new(1.0, 2.0));
        assert!(!rock.hit_by(&shot, 1));
    }

    #[test]
    fn test_deactivate_is_one_way() {
        let mut core = ActorCore::new(Point::new(0.0, 0.0));
        core.deactivate();
        core.deactivate();
        assert!(!core.is_active());
    }

    #[test]
    fn test_move_in_directions() {
        let mut core = ActorCore::new(Point::new(100.0, 100.0));
        core.move_in(Direction::Up, 1.0);
        assert!(core.location.y < 100.0);
        core.move_in(Direction::Right, 5.0);
        assert!(core.location.x > 100.0);
    }

    #[test]
    fn test_move_within_clamps() {
        let mut core = ActorCore::new(Point::new(2.0, 2.0));
        core.move_within(Direction::Left, 10.0, Dimensions::new(480.0, 640.0));
        assert_eq!(core.location, Point::new(0.0, 2.0));
    }

    #[test]
    fn test_frame_cycle_wraps() {
        const FRAMES: [usize; 4] = [0, 1, 2, 1];
        let mut cycle = FrameCycle::new(&FRAMES);
        let seen: Vec<usize> = (0..5)
            .map(|_| {
                let f = cycle.current();
                cycle.advance();
                f
            })
            .collect();
        assert_eq!(seen, vec![0, 1, 2, 1, 0]);
    }
}
