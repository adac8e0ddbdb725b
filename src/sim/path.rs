//! Path templates and interpolation
//!
//! A template is a handful of control points in local space (origin at the
//! actor's spawn point) plus timed actions at fractional positions. Realizing
//! it produces one `PathEntry` per tick: the actor consumes one entry each
//! tick, moving on `Move` and firing on `Fire`.
//!
//! Interpolation is deterministic, so realized paths are cached per archetype
//! in a [`PathCache`] and re-anchored with [`translate_path`] for each spawn.

use std::rc::Rc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::error::{SimError, SimResult};

/// What an entry of a realized path asks the actor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathAction {
    Move,
    Fire,
}

/// An action placed at a fractional position along a template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// Position along the path, 0.0 = start, 1.0 = end
    pub fraction: f32,
    pub action: PathAction,
}

impl ScheduledAction {
    pub const fn new(fraction: f32, action: PathAction) -> Self {
        Self { fraction, action }
    }

    pub const fn fire(fraction: f32) -> Self {
        Self::new(fraction, PathAction::Fire)
    }
}

/// One realized step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathEntry {
    Move(Point),
    /// Fire from wherever the actor currently is
    Fire,
}

impl PathEntry {
    pub fn action(&self) -> PathAction {
        match self {
            PathEntry::Move(_) => PathAction::Move,
            PathEntry::Fire => PathAction::Fire,
        }
    }

    pub fn location(&self) -> Option<Point> {
        match self {
            PathEntry::Move(p) => Some(*p),
            PathEntry::Fire => None,
        }
    }
}

/// Control points plus timed actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTemplate {
    pub points: Vec<Point>,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

impl PathTemplate {
    pub fn new(points: Vec<Point>, actions: Vec<ScheduledAction>) -> Self {
        Self { points, actions }
    }

    fn validate(&self, step_count: usize) -> SimResult<()> {
        if step_count == 0 {
            return Err(SimError::configuration("path step count must be at least 1"));
        }
        if self.points.len() < 2 {
            return Err(SimError::configuration(format!(
                "path template needs at least 2 control points, got {}",
                self.points.len()
            )));
        }
        if let Some(bad) = self
            .actions
            .iter()
            .find(|a| !(0.0..=1.0).contains(&a.fraction))
        {
            return Err(SimError::configuration(format!(
                "scheduled action fraction {} outside [0, 1]",
                bad.fraction
            )));
        }
        Ok(())
    }
}

/// Something that can be realized into a per-tick path
pub trait Path {
    fn get_path(&self, step_count: usize) -> SimResult<Vec<PathEntry>>;
}

/// Straight line from the first to the last point of a template
#[derive(Debug, Clone)]
pub struct LinePath {
    template: PathTemplate,
}

impl LinePath {
    pub fn new(start: Point, end: Point, actions: Vec<ScheduledAction>) -> Self {
        Self {
            template: PathTemplate::new(vec![start, end], actions),
        }
    }

    pub fn from_template(template: PathTemplate) -> Self {
        Self { template }
    }
}

impl Path for LinePath {
    fn get_path(&self, step_count: usize) -> SimResult<Vec<PathEntry>> {
        self.template.validate(step_count)?;

        let start = Vec2::from(self.template.points[0]);
        let end = Vec2::from(self.template.points[self.template.points.len() - 1]);
        let lo = start.min(end);
        let hi = start.max(end);

        let points = (0..=step_count).map(|i| {
            if i == step_count {
                return end;
            }
            let t = i as f32 / step_count as f32;
            // Clamp away float drift so no step leaves the start/end box
            start.lerp(end, t).clamp(lo, hi)
        });

        Ok(insert_actions(points, &self.template.actions, step_count))
    }
}

/// Catmull-Rom curve through every control point
///
/// The whole template is parameterized by a single t in [0, 1], so each
/// segment gets an equal share of the steps regardless of its length.
/// End segments reuse the end point as their missing neighbour, which makes
/// two or three point templates well defined.
#[derive(Debug, Clone)]
pub struct SplinePath {
    template: PathTemplate,
}

impl SplinePath {
    pub fn new(template: PathTemplate) -> Self {
        Self { template }
    }

    fn point_at(points: &[Vec2], t: f32) -> Vec2 {
        let segments = points.len() - 1;
        let s = t * segments as f32;
        let i = (s.floor() as usize).min(segments - 1);
        let u = s - i as f32;

        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(segments)];

        catmull_rom(p0, p1, p2, p3, u)
    }
}

impl Path for SplinePath {
    fn get_path(&self, step_count: usize) -> SimResult<Vec<PathEntry>> {
        self.template.validate(step_count)?;

        let control: Vec<Vec2> = self.template.points.iter().map(|p| Vec2::from(*p)).collect();
        let last = control[control.len() - 1];

        let points = (0..=step_count).map(|i| {
            if i == step_count {
                return last;
            }
            Self::point_at(&control, i as f32 / step_count as f32)
        });

        Ok(insert_actions(points, &self.template.actions, step_count))
    }
}

/// Uniform Catmull-Rom between `p1` (u = 0) and `p2` (u = 1)
#[inline]
fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, u: f32) -> Vec2 {
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

/// Build the move entries and splice in scheduled actions.
///
/// Actions go in fraction order; equal fractions keep caller order. Each
/// insertion shifts everything after it by one.
fn insert_actions(
    points: impl Iterator<Item = Vec2>,
    actions: &[ScheduledAction],
    step_count: usize,
) -> Vec<PathEntry> {
    let mut path: Vec<PathEntry> = Vec::with_capacity(step_count + 1 + actions.len());
    path.extend(points.map(|p| PathEntry::Move(p.into())));

    let mut ordered: Vec<&ScheduledAction> = actions.iter().collect();
    // sort_by is stable
    ordered.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));

    for (inserted, action) in ordered.into_iter().enumerate() {
        let base = ((action.fraction * step_count as f32).round() as usize).min(step_count);
        let index = base + inserted;
        let entry = match action.action {
            PathAction::Fire => PathEntry::Fire,
            // Dwell: repeat the next position so the actor holds still for a tick
            PathAction::Move => path[index..]
                .iter()
                .find_map(|e| e.location())
                .map(PathEntry::Move)
                .unwrap_or(PathEntry::Fire),
        };
        path.insert(index, entry);
    }

    path
}

/// Shift every move entry by (dx, dy); fire entries pass through
pub fn translate_path(path: &[PathEntry], dx: f32, dy: f32) -> Vec<PathEntry> {
    path.iter()
        .map(|entry| match entry {
            PathEntry::Move(p) => PathEntry::Move(p.translate(dx, dy)),
            PathEntry::Fire => PathEntry::Fire,
        })
        .collect()
}

/// Cache key: which archetype, which of its routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub archetype: &'static str,
    pub route: &'static str,
}

impl PathKey {
    pub const fn new(archetype: &'static str, route: &'static str) -> Self {
        Self { archetype, route }
    }
}

/// Realized paths shared by every instance of an archetype
#[derive(Debug, Default)]
pub struct PathCache {
    paths: FxHashMap<PathKey, Rc<[PathEntry]>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached path for `key`, computing it on first use
    pub fn get_or_insert_with<F>(&mut self, key: PathKey, compute: F) -> SimResult<Rc<[PathEntry]>>
    where
        F: FnOnce() -> SimResult<Vec<PathEntry>>,
    {
        if let Some(path) = self.paths.get(&key) {
            return Ok(Rc::clone(path));
        }
        let path: Rc<[PathEntry]> = compute()?.into();
        log::debug!(
            "cached path {}/{} ({} entries)",
            key.archetype,
            key.route,
            path.len()
        );
        self.paths.insert(key, Rc::clone(&path));
        Ok(path)
    }

    pub fn get(&self, key: &PathKey) -> Option<Rc<[PathEntry]>> {
        self.paths.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A realized path anchored in world space, consumed one entry per tick
#[derive(Debug, Clone)]
pub struct PathCursor {
    key: PathKey,
    entries: Vec<PathEntry>,
    position: usize,
}

impl PathCursor {
    /// Anchor a cached template at `origin`
    pub fn anchored(key: PathKey, template: &[PathEntry], origin: Point) -> Self {
        Self {
            key,
            entries: translate_path(template, origin.x, origin.y),
            position: 0,
        }
    }

    pub fn key(&self) -> PathKey {
        self.key
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.entries.len()
    }

    /// Take the next entry
    pub fn advance(&mut self) -> SimResult<PathEntry> {
        let entry = self.entries.get(self.position).copied().ok_or_else(|| {
            SimError::invariant(format!(
                "path {}/{} advanced past its end ({} entries)",
                self.key.archetype,
                self.key.route,
                self.entries.len()
            ))
        })?;
        self.position += 1;
        Ok(entry)
    }
}
