//! Level sequencing: waves of enemies, levels of waves and the manager that
//! walks the player through them with text interludes in between.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use super::actor::Actor;
use super::enemies::{Bomber, Side, Spinner, Splitter};
use super::geometry::Point;
use super::scheduler::Scheduler;
use super::world::World;
use crate::error::{SimError, SimResult};

/// A group of enemies deployed over time
pub trait Wave {
    fn tick(&mut self, world: &mut World) -> SimResult<()>;

    /// True while the wave still has work to do or anything of it is on screen
    fn is_active(&self, world: &World) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WaveOp {
    AllowDeploy,
}

/// Splitters dropped in from the top, a few at a time
pub struct SplitterWave {
    scheduler: Scheduler<WaveOp>,
    left_to_deploy: usize,
    deploy_allowed: bool,
}

impl SplitterWave {
    pub const MAX_ACTIVE: usize = 3;
    pub const DEPLOY_SPACING_MS: i64 = 1000;
    /// Keep spawn points this far from the side edges
    pub const EDGE_MARGIN: f32 = 150.0;
    pub const SPAWN_Y: f32 = -20.0;

    pub fn new(world: &World, count: usize) -> SimResult<Self> {
        let width = world.dimensions().width;
        if width <= 2.0 * Self::EDGE_MARGIN {
            return Err(SimError::configuration(format!(
                "world width {width} leaves no room to deploy splitters"
            )));
        }
        log::debug!("SplitterWave of {}", count);
        Ok(Self {
            scheduler: Scheduler::new(world.clock_handle()),
            left_to_deploy: count,
            deploy_allowed: true,
        })
    }

    pub fn left_to_deploy(&self) -> usize {
        self.left_to_deploy
    }

    fn deploy(&mut self, world: &mut World) -> SimResult<()> {
        let width = world.dimensions().width;
        let x = world
            .rng()
            .random_range(Self::EDGE_MARGIN..width - Self::EDGE_MARGIN)
            .floor();
        let splitter = Splitter::new(world, Point::new(x, Self::SPAWN_Y))?;
        world.add_actor(splitter);

        self.left_to_deploy -= 1;
        self.deploy_allowed = false;
        self.scheduler
            .schedule_operation("allowDeploy", Self::DEPLOY_SPACING_MS, WaveOp::AllowDeploy)
    }
}

impl Wave for SplitterWave {
    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        while let Some(op) = self.scheduler.next_due() {
            match op {
                WaveOp::AllowDeploy => self.deploy_allowed = true,
            }
        }

        if self.left_to_deploy > 0
            && self.deploy_allowed
            && world.active_enemies().len() < Self::MAX_ACTIVE
        {
            self.deploy(world)?;
        }
        Ok(())
    }

    fn is_active(&self, world: &World) -> bool {
        self.left_to_deploy > 0
            || !world.active_enemies().is_empty()
            || !world.active_explosions().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpinnerWaveOp {
    DeploySpinners,
    DeployBomber,
}

/// Spinner pairs dropped from the top center, plus a bomber now and then
/// while enemies are still about so the player cannot hang back forever
pub struct SpinnerWave {
    scheduler: Scheduler<SpinnerWaveOp>,
    spinners_left: usize,
    bombers_left: usize,
    current_bomber: Option<Rc<RefCell<Bomber>>>,
}

impl SpinnerWave {
    pub const PAIR_SPACING_MS: i64 = 250;
    pub const BOMBER_DELAY_MS: i64 = 10_000;
    /// Each spinner of a pair starts this far from the center line
    pub const PAIR_OFFSET: f32 = 40.0;
    pub const SPAWN_Y: f32 = -20.0;
    /// Bombers fly between this height and the middle of the screen
    pub const BOMBER_MIN_Y: f32 = 50.0;

    pub fn new(world: &World, spinners: usize, bombers: usize) -> SimResult<Self> {
        let height = world.dimensions().height;
        if height / 2.0 <= Self::BOMBER_MIN_Y {
            return Err(SimError::configuration(format!(
                "world height {height} leaves no room for bombers"
            )));
        }
        log::debug!("SpinnerWave of {} spinners, {} bombers", spinners, bombers);
        Ok(Self {
            scheduler: Scheduler::new(world.clock_handle()),
            spinners_left: spinners,
            bombers_left: bombers,
            current_bomber: None,
        })
    }

    pub fn spinners_left(&self) -> usize {
        self.spinners_left
    }

    pub fn bombers_left(&self) -> usize {
        self.bombers_left
    }

    fn bomber_in_flight(&self) -> bool {
        self.current_bomber
            .as_ref()
            .is_some_and(|bomber| bomber.borrow().is_active())
    }

    fn deploy_spinners(&mut self, world: &mut World) -> SimResult<()> {
        let center = world.dimensions().width / 2.0;
        let left = Spinner::new(world, Side::Left, Point::new(center - Self::PAIR_OFFSET, Self::SPAWN_Y))?;
        world.add_actor(left);
        let right = Spinner::new(world, Side::Right, Point::new(center + Self::PAIR_OFFSET, Self::SPAWN_Y))?;
        world.add_actor(right);
        self.spinners_left = self.spinners_left.saturating_sub(2);
        Ok(())
    }

    fn deploy_bomber(&mut self, world: &mut World) -> SimResult<()> {
        let height = world.dimensions().height;
        let y = world
            .rng()
            .random_range(Self::BOMBER_MIN_Y..height / 2.0)
            .floor();
        let bomber = Bomber::new(world, y)?;
        self.current_bomber = Some(world.add_actor(bomber));
        self.bombers_left -= 1;
        Ok(())
    }
}

impl Wave for SpinnerWave {
    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.spinners_left > 0 && !self.scheduler.is_pending("deploySpinners") {
            self.scheduler.schedule_operation(
                "deploySpinners",
                Self::PAIR_SPACING_MS,
                SpinnerWaveOp::DeploySpinners,
            )?;
        }

        if self.bombers_left > 0
            && !self.bomber_in_flight()
            && !world.active_enemies().is_empty()
            && !self.scheduler.is_pending("deployBomber")
        {
            self.scheduler.schedule_operation(
                "deployBomber",
                Self::BOMBER_DELAY_MS,
                SpinnerWaveOp::DeployBomber,
            )?;
        }

        while let Some(op) = self.scheduler.next_due() {
            match op {
                SpinnerWaveOp::DeploySpinners => self.deploy_spinners(world)?,
                SpinnerWaveOp::DeployBomber => self.deploy_bomber(world)?,
            }
        }
        Ok(())
    }

    fn is_active(&self, world: &World) -> bool {
        self.spinners_left > 0
            || !world.active_enemies().is_empty()
            || !world.active_explosions().is_empty()
    }
}

/// Waves played one after another
pub struct Level {
    waves: Vec<Box<dyn Wave>>,
    current: usize,
}

impl Level {
    pub fn new(waves: Vec<Box<dyn Wave>>) -> Self {
        Self { waves, current: 0 }
    }

    pub fn tick(&mut self, world: &mut World) -> SimResult<()> {
        let Some(wave) = self.waves.get_mut(self.current) else {
            return Ok(());
        };
        wave.tick(world)?;
        if !wave.is_active(world) {
            self.current += 1;
            log::info!("wave {} of {} cleared", self.current, self.waves.len());
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.current < self.waves.len()
    }
}

/// How long a text interlude spends in each phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterludeTimings {
    pub before_visible_ms: i64,
    pub visible_ms: i64,
    pub after_visible_ms: i64,
}

impl Default for InterludeTimings {
    fn default() -> Self {
        Self {
            before_visible_ms: 2000,
            visible_ms: 4000,
            after_visible_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InterludeOp {
    Show,
    Hide,
    Finish,
}

/// Centered text that appears for a while, with a sound when it shows
pub struct TextInterlude {
    text: String,
    location: Point,
    sound: &'static str,
    timings: InterludeTimings,
    scheduler: Scheduler<InterludeOp>,
    started: bool,
    visible: bool,
    active: bool,
}

impl TextInterlude {
    pub fn new(
        world: &World,
        text: impl Into<String>,
        sound: &'static str,
        timings: InterludeTimings,
    ) -> Self {
        Self {
            text: text.into(),
            location: world.dimensions().center(),
            sound,
            timings,
            scheduler: Scheduler::new(world.clock_handle()),
            started: false,
            visible: false,
            active: true,
        }
    }

    pub fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if !self.started {
            self.scheduler
                .schedule_operation("show", self.timings.before_visible_ms, InterludeOp::Show)?;
            self.started = true;
        }

        while let Some(op) = self.scheduler.next_due() {
            match op {
                InterludeOp::Show => {
                    self.visible = true;
                    world.audio().play(self.sound);
                    self.scheduler
                        .schedule_operation("hide", self.timings.visible_ms, InterludeOp::Hide)?;
                }
                InterludeOp::Hide => {
                    self.visible = false;
                    self.scheduler.schedule_operation(
                        "finish",
                        self.timings.after_visible_ms,
                        InterludeOp::Finish,
                    )?;
                }
                InterludeOp::Finish => self.active = false,
            }
        }
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Intro,
    Play,
    Win,
}

/// Walks through the levels: intro text, play, next level, and finally
/// the congratulations text
pub struct LevelManager {
    levels: Vec<Level>,
    current_level: usize,
    state: LevelState,
    interlude: Option<TextInterlude>,
    timings: InterludeTimings,
    active: bool,
}

impl LevelManager {
    pub fn new(levels: Vec<Level>) -> SimResult<Self> {
        if levels.is_empty() {
            return Err(SimError::configuration("a game needs at least one level"));
        }
        log::debug!("LevelManager with {} level(s)", levels.len());
        Ok(Self {
            levels,
            current_level: 0,
            state: LevelState::Intro,
            interlude: None,
            timings: InterludeTimings::default(),
            active: true,
        })
    }

    pub fn with_timings(mut self, timings: InterludeTimings) -> Self {
        self.timings = timings;
        self
    }

    /// 1-based number of the level being introduced or played
    pub fn current_level(&self) -> usize {
        self.current_level + 1
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The interlude on screen, if any
    pub fn interlude(&self) -> Option<&TextInterlude> {
        self.interlude.as_ref()
    }

    pub fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if !self.active {
            return Ok(());
        }

        match self.state {
            LevelState::Intro => {
                let text = format!("Level {}", self.current_level());
                if self.run_interlude(world, text, "level_start")? {
                    log::info!("level {} starting", self.current_level());
                    self.state = LevelState::Play;
                }
            }
            LevelState::Play => self.tick_level(world)?,
            LevelState::Win => {
                if self.run_interlude(world, "CONGRATULATIONS!".to_string(), "congratulations")? {
                    log::info!("all levels complete");
                    self.active = false;
                }
            }
        }
        Ok(())
    }

    /// Tick the interlude, creating it first if needed. Returns true once it
    /// has run its course.
    fn run_interlude(&mut self, world: &mut World, text: String, sound: &'static str) -> SimResult<bool> {
        let timings = self.timings;
        let interlude = self
            .interlude
            .get_or_insert_with(|| TextInterlude::new(world, text, sound, timings));
        interlude.tick(world)?;
        if interlude.is_active() {
            return Ok(false);
        }
        self.interlude = None;
        Ok(true)
    }

    fn tick_level(&mut self, world: &mut World) -> SimResult<()> {
        let count = self.levels.len();
        let level = self.levels.get_mut(self.current_level).ok_or_else(|| {
            SimError::invariant(format!(
                "level index {} out of range for {} level(s)",
                self.current_level, count
            ))
        })?;

        level.tick(world)?;
        if level.is_active() {
            return Ok(());
        }

        if self.current_level + 1 < count {
            self.current_level += 1;
            self.state = LevelState::Intro;
            log::info!("advancing to level {}", self.current_level());
        } else {
            self.state = LevelState::Win;
        }
        Ok(())
    }
}
