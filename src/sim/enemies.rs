//! Enemies
//!
//! Splitters and spinners fly spline routes that are realized once per
//! archetype into the world's [`PathCache`](super::path::PathCache) and
//! re-anchored at the enemy's current location whenever it starts a new
//! route. Bombers just cross the screen.

use std::rc::Rc;

use rand::Rng;

use super::actor::{Actor, ActorCore, ActorKind, ExplosionProperties, FrameCycle, ImageDetails};
use super::collision::HitArbiter;
use super::effects::destroy_enemy;
use super::geometry::{Bounds, Direction, Point};
use super::path::{
    LinePath, Path, PathCursor, PathEntry, PathKey, PathTemplate, ScheduledAction, SplinePath,
};
use super::scheduler::Scheduler;
use super::shots::{Grenade, Shrapnel};
use super::world::World;
use crate::error::SimResult;

/// Realize a spline route into the cache if it is not there yet
fn cached_spline(
    world: &mut World,
    key: PathKey,
    points: &[(f32, f32)],
    fire_at: &[f32],
    steps: usize,
) -> SimResult<Rc<[PathEntry]>> {
    world.paths().get_or_insert_with(key, || {
        let template = PathTemplate::new(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            fire_at.iter().map(|&f| ScheduledAction::fire(f)).collect(),
        );
        SplinePath::new(template).get_path(steps)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitterRoute {
    Intro,
    FloatAround,
    FlyRight,
    FlyLeft,
    FlyUp,
    FlyDown,
    DiveRight,
    DiveLeft,
}

impl SplitterRoute {
    fn key(self) -> PathKey {
        let route = match self {
            SplitterRoute::Intro => "intro",
            SplitterRoute::FloatAround => "float_around",
            SplitterRoute::FlyRight => "fly_right",
            SplitterRoute::FlyLeft => "fly_left",
            SplitterRoute::FlyUp => "fly_up",
            SplitterRoute::FlyDown => "fly_down",
            SplitterRoute::DiveRight => "dive_right",
            SplitterRoute::DiveLeft => "dive_left",
        };
        PathKey::new(Splitter::ARCHETYPE, route)
    }

    fn template(self, world: &mut World) -> SimResult<Rc<[PathEntry]>> {
        let key = self.key();
        match self {
            SplitterRoute::Intro => cached_spline(
                world,
                key,
                &[
                    (0.0, 0.0),
                    (100.0, 50.0),
                    (200.0, 100.0),
                    (50.0, 150.0),
                    (-150.0, 200.0),
                    (-200.0, 250.0),
                    (-50.0, 300.0),
                    (50.0, 350.0),
                    (150.0, 400.0),
                    (100.0, 350.0),
                    (0.0, 200.0),
                    (-100.0, 150.0),
                    (-60.0, 175.0),
                    (-30.0, 150.0),
                    (0.0, 150.0),
                ],
                &[0.25, 0.50, 0.70],
                150,
            ),
            SplitterRoute::FloatAround => cached_spline(
                world,
                key,
                &[(0.0, 0.0), (40.0, 40.0), (0.0, 80.0), (-40.0, 40.0), (0.0, 0.0)],
                &[],
                50,
            ),
            SplitterRoute::FlyRight => cached_spline(
                world,
                key,
                &[(0.0, 0.0), (75.0, 50.0), (150.0, -75.0), (200.0, 50.0), (250.0, 0.0)],
                &[0.5],
                50,
            ),
            SplitterRoute::FlyLeft => cached_spline(
                world,
                key,
                &[(0.0, 0.0), (-75.0, -50.0), (-150.0, 75.0), (-200.0, -50.0), (-250.0, 0.0)],
                &[0.5],
                50,
            ),
            SplitterRoute::FlyUp => cached_spline(
                world,
                key,
                &[(0.0, 0.0), (-50.0, -50.0), (50.0, -100.0), (0.0, -150.0)],
                &[0.5],
                50,
            ),
            SplitterRoute::FlyDown => cached_spline(
                world,
                key,
                &[(0.0, 0.0), (-50.0, 50.0), (50.0, 100.0), (0.0, 150.0)],
                &[0.5],
                50,
            ),
            // 0.65 is the bottom of the dive
            SplitterRoute::DiveRight => cached_spline(
                world,
                key,
                &[
                    (0.0, 0.0),
                    (-40.0, 30.0),
                    (30.0, 120.0),
                    (120.0, 200.0),
                    (160.0, 200.0),
                    (180.0, 120.0),
                    (200.0, 30.0),
                ],
                &[0.20, 0.40, 0.65],
                60,
            ),
            SplitterRoute::DiveLeft => cached_spline(
                world,
                key,
                &[
                    (0.0, 0.0),
                    (40.0, 30.0),
                    (-30.0, 120.0),
                    (-120.0, 200.0),
                    (-160.0, 200.0),
                    (-180.0, 120.0),
                    (-200.0, 30.0),
                ],
                &[0.20, 0.40, 0.65],
                60,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SplitterOp {
    AdvanceFrame,
}

/// Saucer that weaves down the screen dropping shrapnel and splits in two
/// when destroyed
pub struct Splitter {
    core: ActorCore,
    scheduler: Scheduler<SplitterOp>,
    frames: FrameCycle,
    route: SplitterRoute,
    path: PathCursor,
    health: u32,
}

impl Splitter {
    pub const ARCHETYPE: &'static str = "splitter";
    pub const INITIAL_HEALTH: u32 = 1;
    pub const SCORE: u64 = 10;
    pub const FRAGMENT_OFFSET: f32 = 40.0;
    const FRAME_INTERVAL_MS: i64 = 100;
    const FRAME_SEQUENCE: [usize; 10] = [0, 1, 2, 3, 4, 5, 4, 3, 2, 1];

    pub fn new(world: &mut World, location: Point) -> SimResult<Self> {
        log::debug!("Splitter at {}", location);
        let route = SplitterRoute::Intro;
        let template = route.template(world)?;
        let mut scheduler = Scheduler::new(world.clock_handle());
        scheduler.schedule_operation("advanceFrame", Self::FRAME_INTERVAL_MS, SplitterOp::AdvanceFrame)?;

        Ok(Self {
            core: ActorCore::new(location),
            scheduler,
            frames: FrameCycle::new(&Self::FRAME_SEQUENCE),
            route,
            path: PathCursor::anchored(route.key(), &template, location),
            health: Self::INITIAL_HEALTH,
        })
    }

    pub fn explosion_properties() -> ExplosionProperties {
        ExplosionProperties {
            image_name: "saucer_explosion",
            number_of_frames: 4,
            frame_width: 80,
            scale: 0.8,
            sound_name: "saucer_explosion",
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    /// After floating, dart somewhere; after anything else, float
    fn next_route(&self, world: &mut World) -> SplitterRoute {
        if self.route != SplitterRoute::FloatAround {
            return SplitterRoute::FloatAround;
        }

        let dims = world.dimensions();
        let on_left = self.core.location.x < dims.width / 2.0;
        let on_top = self.core.location.y < dims.height / 2.0;
        let rng = world.rng();

        if rng.random_bool(0.5) {
            if on_left {
                SplitterRoute::FlyRight
            } else {
                SplitterRoute::FlyLeft
            }
        } else if !on_top {
            SplitterRoute::FlyUp
        } else if rng.random_bool(0.5) {
            SplitterRoute::FlyDown
        } else if on_left {
            SplitterRoute::DiveRight
        } else {
            SplitterRoute::DiveLeft
        }
    }

    fn follow_path(&mut self, world: &mut World) -> SimResult<()> {
        if self.path.is_finished() {
            let next = self.next_route(world);
            let template = next.template(world)?;
            log::trace!("Splitter {:?} switching to {:?}", self.core.id, next);
            self.route = next;
            self.path = PathCursor::anchored(next.key(), &template, self.core.location);
        }

        match self.path.advance()? {
            PathEntry::Move(p) => self.core.location = p,
            PathEntry::Fire => self.drop_bomb(world),
        }
        Ok(())
    }

    fn drop_bomb(&self, world: &mut World) {
        world.add_actor(Shrapnel::new(self.core.location, 267.0));
        world.add_actor(Shrapnel::new(self.core.location, 273.0));
    }

    fn split(&mut self, world: &mut World) -> SimResult<()> {
        let left = SplitterFragment::new(
            world,
            Side::Left,
            self.core.location.left(Self::FRAGMENT_OFFSET),
        )?;
        world.add_actor(left);
        let right = SplitterFragment::new(
            world,
            Side::Right,
            self.core.location.right(Self::FRAGMENT_OFFSET),
        )?;
        world.add_actor(right);
        destroy_enemy(world, &mut self.core, Self::explosion_properties(), Self::SCORE);
        Ok(())
    }
}

impl Actor for Splitter {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-40.0, 40.0, -20.0, 20.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        5
    }

    fn hit_by(&mut self, _attacker: &dyn Actor, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        true
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("splitter", 6, 100, self.frames.current())
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                SplitterOp::AdvanceFrame => {
                    self.frames.advance();
                    self.scheduler.schedule_operation(
                        "advanceFrame",
                        Self::FRAME_INTERVAL_MS,
                        SplitterOp::AdvanceFrame,
                    )?;
                }
            }
        }

        // Killed by someone else's tick since we last moved
        if self.health == 0 {
            return self.split(world);
        }

        self.follow_path(world)?;

        if let Some(player) = world.player() {
            HitArbiter::ram_shared(self, &player);
        }
        Ok(())
    }
}

/// Which way a fragment breaks off or a spinner leans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Half a splitter: drifts away from the split, then floats in place
pub struct SplitterFragment {
    core: ActorCore,
    side: Side,
    scheduler: Scheduler<SplitterOp>,
    frames: FrameCycle,
    path: PathCursor,
    drifting: bool,
    health: u32,
}

impl SplitterFragment {
    pub const ARCHETYPE: &'static str = "splitter_fragment";
    pub const INITIAL_HEALTH: u32 = 2;
    pub const SCORE: u64 = 5;
    const DRIFT_DISTANCE: f32 = 60.0;
    const DRIFT_STEPS: usize = 20;
    const FRAME_INTERVAL_MS: i64 = 100;
    const FRAME_SEQUENCE: [usize; 6] = [0, 1, 2, 3, 2, 1];

    pub fn new(world: &mut World, side: Side, location: Point) -> SimResult<Self> {
        log::debug!("SplitterFragment {:?} at {}", side, location);
        let key = Self::drift_key(side);
        let template = world.paths().get_or_insert_with(key, || {
            let dx = match side {
                Side::Left => -Self::DRIFT_DISTANCE,
                Side::Right => Self::DRIFT_DISTANCE,
            };
            LinePath::new(Point::new(0.0, 0.0), Point::new(dx, 0.0), vec![]).get_path(Self::DRIFT_STEPS)
        })?;

        let mut scheduler = Scheduler::new(world.clock_handle());
        scheduler.schedule_operation("advanceFrame", Self::FRAME_INTERVAL_MS, SplitterOp::AdvanceFrame)?;

        Ok(Self {
            core: ActorCore::new(location),
            side,
            scheduler,
            frames: FrameCycle::new(&Self::FRAME_SEQUENCE),
            path: PathCursor::anchored(key, &template, location),
            drifting: true,
            health: Self::INITIAL_HEALTH,
        })
    }

    fn drift_key(side: Side) -> PathKey {
        match side {
            Side::Left => PathKey::new(Self::ARCHETYPE, "drift_left"),
            Side::Right => PathKey::new(Self::ARCHETYPE, "drift_right"),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn explosion_properties() -> ExplosionProperties {
        ExplosionProperties {
            image_name: "saucer_explosion",
            number_of_frames: 4,
            frame_width: 80,
            scale: 0.5,
            sound_name: "saucer_explosion",
        }
    }

    fn follow_path(&mut self, world: &mut World) -> SimResult<()> {
        if self.path.is_finished() {
            let key = PathKey::new(Self::ARCHETYPE, "float");
            let template = cached_spline(
                world,
                key,
                &[(0.0, 0.0), (20.0, 20.0), (0.0, 40.0), (-20.0, 20.0), (0.0, 0.0)],
                &[],
                40,
            )?;
            self.drifting = false;
            self.path = PathCursor::anchored(key, &template, self.core.location);
        }

        if let PathEntry::Move(p) = self.path.advance()? {
            self.core.location = p;
        }
        Ok(())
    }

    pub fn is_drifting(&self) -> bool {
        self.drifting
    }
}

impl Actor for SplitterFragment {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-20.0, 20.0, -15.0, 15.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        3
    }

    fn hit_by(&mut self, _attacker: &dyn Actor, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        true
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("splitter_fragment", 4, 50, self.frames.current())
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                SplitterOp::AdvanceFrame => {
                    self.frames.advance();
                    self.scheduler.schedule_operation(
                        "advanceFrame",
                        Self::FRAME_INTERVAL_MS,
                        SplitterOp::AdvanceFrame,
                    )?;
                }
            }
        }

        if self.health == 0 {
            destroy_enemy(world, &mut self.core, Self::explosion_properties(), Self::SCORE);
            return Ok(());
        }

        self.follow_path(world)?;

        if let Some(player) = world.player() {
            HitArbiter::ram_shared(self, &player);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpinnerOp {
    Spin,
}

/// Small saucer looping down and back up, leaning to one side
pub struct Spinner {
    core: ActorCore,
    bias: Side,
    scheduler: Scheduler<SpinnerOp>,
    current_frame: usize,
    path: PathCursor,
    health: u32,
}

impl Spinner {
    pub const ARCHETYPE: &'static str = "spinner";
    pub const INITIAL_HEALTH: u32 = 1;
    pub const SCORE: u64 = 20;
    const FRAMES: usize = 8;
    const SPIN_INTERVAL_MS: i64 = 50;
    const LOOP_STEPS: usize = 200;
    /// Left-leaning loop; the right one is its mirror image
    const LOOP: [(f32, f32); 9] = [
        (0.0, 0.0),
        (-60.0, 100.0),
        (-130.0, 220.0),
        (-60.0, 330.0),
        (40.0, 300.0),
        (20.0, 200.0),
        (-40.0, 120.0),
        (-20.0, 40.0),
        (0.0, 0.0),
    ];

    pub fn new(world: &mut World, bias: Side, location: Point) -> SimResult<Self> {
        log::debug!("Spinner {:?} at {}", bias, location);
        let key = Self::loop_key(bias);
        let template = Self::loop_template(world, bias)?;
        let mut scheduler = Scheduler::new(world.clock_handle());
        scheduler.schedule_recurring("spin", Self::SPIN_INTERVAL_MS, SpinnerOp::Spin)?;

        Ok(Self {
            core: ActorCore::new(location),
            bias,
            scheduler,
            current_frame: 0,
            path: PathCursor::anchored(key, &template, location),
            health: Self::INITIAL_HEALTH,
        })
    }

    fn loop_key(bias: Side) -> PathKey {
        match bias {
            Side::Left => PathKey::new(Self::ARCHETYPE, "loop_left"),
            Side::Right => PathKey::new(Self::ARCHETYPE, "loop_right"),
        }
    }

    fn loop_template(world: &mut World, bias: Side) -> SimResult<Rc<[PathEntry]>> {
        let mirror = match bias {
            Side::Left => 1.0,
            Side::Right => -1.0,
        };
        let points: Vec<(f32, f32)> = Self::LOOP.iter().map(|&(x, y)| (x * mirror, y)).collect();
        cached_spline(world, Self::loop_key(bias), &points, &[0.3, 0.6], Self::LOOP_STEPS)
    }

    pub fn bias(&self) -> Side {
        self.bias
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn explosion_properties() -> ExplosionProperties {
        ExplosionProperties {
            image_name: "saucer_explosion",
            number_of_frames: 4,
            frame_width: 80,
            scale: 0.4,
            sound_name: "saucer_explosion",
        }
    }

    fn follow_path(&mut self, world: &mut World) -> SimResult<()> {
        if self.path.is_finished() {
            let template = Self::loop_template(world, self.bias)?;
            self.path = PathCursor::anchored(Self::loop_key(self.bias), &template, self.core.location);
        }

        match self.path.advance()? {
            PathEntry::Move(p) => self.core.location = p,
            PathEntry::Fire => {
                world.add_actor(Shrapnel::new(self.core.location, 270.0));
            }
        }
        Ok(())
    }
}

impl Actor for Spinner {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-15.0, 15.0, -15.0, 15.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        3
    }

    fn hit_by(&mut self, _attacker: &dyn Actor, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        true
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("spinner", Self::FRAMES, 40, self.current_frame)
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                SpinnerOp::Spin => self.current_frame = (self.current_frame + 1) % Self::FRAMES,
            }
        }

        if self.health == 0 {
            destroy_enemy(world, &mut self.core, Self::explosion_properties(), Self::SCORE);
            return Ok(());
        }

        self.follow_path(world)?;

        if let Some(player) = world.player() {
            HitArbiter::ram_shared(self, &player);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BomberOp {
    AdvanceFrame,
    DropGrenade,
}

/// Heavy ship that crosses the screen once at a fixed height, lobbing
/// grenades while it is over the playfield
pub struct Bomber {
    core: ActorCore,
    scheduler: Scheduler<BomberOp>,
    frames: FrameCycle,
    health: u32,
}

impl Bomber {
    pub const INITIAL_HEALTH: u32 = 3;
    pub const SCORE: u64 = 50;
    pub const SPEED: f32 = 2.0;
    pub const GRENADE_INTERVAL_MS: i64 = 1500;
    /// Enters and leaves fully off screen
    const HALF_WIDTH: f32 = 40.0;
    /// Grenades leave from the bomb bay, below the origin
    const BAY_OFFSET: f32 = 20.0;
    const FRAME_INTERVAL_MS: i64 = 120;
    const FRAME_SEQUENCE: [usize; 4] = [0, 1, 2, 1];

    /// Bomber entering from the left edge at height `y`
    pub fn new(world: &World, y: f32) -> SimResult<Self> {
        let location = Point::new(-Self::HALF_WIDTH, y);
        log::debug!("Bomber at {}", location);
        let mut scheduler = Scheduler::new(world.clock_handle());
        scheduler.schedule_recurring("advanceFrame", Self::FRAME_INTERVAL_MS, BomberOp::AdvanceFrame)?;
        scheduler.schedule_recurring("dropGrenade", Self::GRENADE_INTERVAL_MS, BomberOp::DropGrenade)?;

        Ok(Self {
            core: ActorCore::new(location),
            scheduler,
            frames: FrameCycle::new(&Self::FRAME_SEQUENCE),
            health: Self::INITIAL_HEALTH,
        })
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn explosion_properties() -> ExplosionProperties {
        ExplosionProperties {
            image_name: "bomber_explosion",
            number_of_frames: 6,
            frame_width: 120,
            scale: 1.0,
            sound_name: "bomber_explosion",
        }
    }

    fn drop_grenade(&self, world: &mut World) {
        let x = self.core.location.x;
        if (0.0..=world.dimensions().width).contains(&x) {
            world.add_actor(Grenade::new(self.core.location.down(Self::BAY_OFFSET)));
        }
    }
}

impl Actor for Bomber {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![
            Bounds::new(-40.0, 40.0, -10.0, 10.0),
            Bounds::new(-10.0, 10.0, -20.0, 20.0),
        ]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        5
    }

    fn hit_by(&mut self, _attacker: &dyn Actor, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        true
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("bomber", 3, 100, self.frames.current())
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                BomberOp::AdvanceFrame => self.frames.advance(),
                BomberOp::DropGrenade => self.drop_grenade(world),
            }
        }

        if self.health == 0 {
            destroy_enemy(world, &mut self.core, Self::explosion_properties(), Self::SCORE);
            return Ok(());
        }

        self.core.move_in(Direction::Right, Self::SPEED);
        if self.core.location.x > world.dimensions().width + Self::HALF_WIDTH {
            log::debug!("Bomber {:?} flew off", self.core.id);
            self.core.deactivate();
            return Ok(());
        }

        if let Some(player) = world.player() {
            HitArbiter::ram_shared(self, &player);
        }
        Ok(())
    }
}
