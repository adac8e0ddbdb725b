//! The live actor set and the collaborators actors reach through it
//!
//! Mutation discipline: actors added during a tick are appended and first
//! tick on the next world tick; inactive actors are reaped only after every
//! actor has ticked. Ids come from a per-world counter, so two worlds fed the
//! same inputs hand out the same ids.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorId, ActorKind, ActorRef, share};
use super::geometry::Dimensions;
use super::path::PathCache;
use super::scheduler::{ClockHandle, SimClock};
use crate::audio::AudioPlayer;
use crate::error::SimResult;

/// Running score
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCounter {
    current: u64,
}

impl ScoreCounter {
    pub fn add(&mut self, points: u64) {
        self.current += points;
    }

    pub fn current(&self) -> u64 {
        self.current
    }
}

pub struct World {
    dimensions: Dimensions,
    actors: Vec<ActorRef>,
    score: ScoreCounter,
    clock: SimClock,
    audio: Rc<dyn AudioPlayer>,
    paths: PathCache,
    rng: Pcg32,
    next_id: u64,
}

impl World {
    pub fn new(dimensions: Dimensions, clock: SimClock, audio: Rc<dyn AudioPlayer>, seed: u64) -> Self {
        Self {
            dimensions,
            actors: Vec::new(),
            score: ScoreCounter::default(),
            clock,
            audio,
            paths: PathCache::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Clock handle for a new scheduler
    pub fn clock_handle(&self) -> ClockHandle {
        self.clock.handle()
    }

    pub fn audio(&self) -> &dyn AudioPlayer {
        &*self.audio
    }

    pub fn paths(&mut self) -> &mut PathCache {
        &mut self.paths
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn score(&self) -> u64 {
        self.score.current()
    }

    pub fn add_score(&mut self, points: u64) {
        self.score.add(points);
    }

    /// Allocate a new actor id
    pub fn next_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Give the actor its id and append it; it starts ticking on the next
    /// world tick
    pub fn add_actor<A: Actor + 'static>(&mut self, mut actor: A) -> Rc<RefCell<A>> {
        actor.core_mut().id = self.next_actor_id();
        let shared = share(actor);
        let handle: ActorRef = shared.clone();
        self.actors.push(handle);
        shared
    }

    pub fn actors(&self) -> &[ActorRef] {
        &self.actors
    }

    /// Active actors of `kind`, oldest first. The actor currently ticking is
    /// mutably borrowed and never listed.
    pub fn active_of_kind(&self, kind: ActorKind) -> Vec<ActorRef> {
        self.actors
            .iter()
            .filter(|a| {
                a.try_borrow()
                    .map(|a| a.is_active() && a.kind() == kind)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn active_enemies(&self) -> Vec<ActorRef> {
        self.active_of_kind(ActorKind::Enemy)
    }

    pub fn active_explosions(&self) -> Vec<ActorRef> {
        self.active_of_kind(ActorKind::Explosion)
    }

    /// The active player, if there is one
    pub fn player(&self) -> Option<ActorRef> {
        self.active_of_kind(ActorKind::Player).into_iter().next()
    }

    /// Tick every actor that was active when the tick started
    pub fn tick_actors(&mut self) -> SimResult<()> {
        let live: Vec<ActorRef> = self
            .actors
            .iter()
            .filter(|a| a.borrow().is_active())
            .cloned()
            .collect();

        for actor in live {
            // Deactivated earlier this tick by someone else
            if !actor.borrow().is_active() {
                continue;
            }
            actor.borrow_mut().tick(self)?;
        }
        Ok(())
    }

    /// Drop inactive actors. Returns how many were removed.
    pub fn reap_inactive(&mut self) -> usize {
        let before = self.actors.len();
        self.actors.retain(|a| a.borrow().is_active());
        before - self.actors.len()
    }
}
