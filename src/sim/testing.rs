//! Test doubles: configurable stub actors, a recording audio sink and a
//! ready-made world.

use std::cell::RefCell;
use std::rc::Rc;

use super::actor::{Actor, ActorCore, ActorKind, ImageDetails};
use super::geometry::{Bounds, Dimensions, Point};
use super::scheduler::SimClock;
use super::world::World;
use crate::audio::AudioPlayer;
use crate::error::SimResult;

/// Audio sink that remembers every sound played
#[derive(Debug, Default)]
pub struct RecordingAudio {
    played: RefCell<Vec<String>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<String> {
        self.played.borrow().clone()
    }
}

impl AudioPlayer for RecordingAudio {
    fn play(&self, sound: &str) {
        self.played.borrow_mut().push(sound.to_string());
    }
}

/// 480x640 world with a fresh clock and a recording audio sink
pub fn test_world() -> (World, SimClock, Rc<RecordingAudio>) {
    let clock = SimClock::new();
    let audio = Rc::new(RecordingAudio::default());
    let world = World::new(Dimensions::new(480.0, 640.0), clock.clone(), audio.clone(), 42);
    (world, clock, audio)
}

/// Actor with scriptable hit handling that records what hit it
pub struct StubActor {
    core: ActorCore,
    kind: ActorKind,
    mask: Vec<Bounds>,
    damage: u32,
    accept_hits: bool,
    hits: Vec<u32>,
    hit_calls: usize,
    ticks: usize,
}

impl StubActor {
    fn new(kind: ActorKind, location: Point) -> Self {
        Self {
            core: ActorCore::new(location),
            kind,
            mask: vec![Bounds::new(-5.0, 5.0, -5.0, 5.0)],
            damage: 1,
            accept_hits: true,
            hits: Vec::new(),
            hit_calls: 0,
            ticks: 0,
        }
    }

    pub fn enemy(location: Point) -> Self {
        Self::new(ActorKind::Enemy, location)
    }

    pub fn player(location: Point) -> Self {
        Self::new(ActorKind::Player, location)
    }

    pub fn shot(location: Point) -> Self {
        Self::new(ActorKind::Shot, location)
    }

    pub fn with_mask(mut self, mask: Vec<Bounds>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn refuse_hits(mut self) -> Self {
        self.accept_hits = false;
        self
    }

    /// Damage values of accepted hits, in order
    pub fn hits(&self) -> Vec<u32> {
        self.hits.clone()
    }

    /// Times `hit_by` was called, accepted or not
    pub fn hit_calls(&self) -> usize {
        self.hit_calls
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn deactivate(&mut self) {
        self.core.deactivate();
    }
}

impl Actor for StubActor {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        self.kind
    }

    fn tick(&mut self, _world: &mut World) -> SimResult<()> {
        self.ticks += 1;
        Ok(())
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        self.mask.clone()
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        self.damage
    }

    fn hit_by(&mut self, _attacker: &dyn Actor, damage: u32) -> bool {
        self.hit_calls += 1;
        if self.accept_hits {
            self.hits.push(damage);
        }
        self.accept_hits
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("stub", 1, 10, 0)
    }
}
