//! Projectiles
//!
//! Shots move in one-pixel sub-steps and check for hits after every sub-step,
//! so fast shots cannot tunnel through thin targets. A shot is single use: it
//! deactivates on the first target it touches, even when that target refuses
//! the hit, and when it leaves the world.

use glam::Vec2;

use super::actor::{Actor, ActorCore, ActorKind, ActorRef, ImageDetails};
use super::collision::{HitArbiter, HitResult};
use super::geometry::{Bounds, Direction, Point};
use super::world::World;
use crate::error::SimResult;

/// Try `targets` in order and strike the first one in contact.
///
/// Returns true when the shot touched something and is spent.
fn strike_first(shot: &dyn Actor, targets: &[ActorRef]) -> bool {
    for target in targets {
        if !HitArbiter::in_contact_shared(shot, target) {
            continue;
        }
        if HitArbiter::attempt_to_hit_shared(shot, target) == HitResult::Miss {
            log::debug!("shot {:?} absorbed by {:?}", shot.id(), target.borrow().id());
        }
        return true;
    }
    false
}

/// Player shot travelling straight up
pub struct Bullet {
    core: ActorCore,
    current_frame: usize,
    first_tick: bool,
}

impl Bullet {
    pub const SPEED: usize = 10;
    pub const DAMAGE: u32 = 1;
    const FRAMES: usize = 4;

    pub fn new(location: Point) -> Self {
        log::debug!("Bullet at {}", location);
        Self {
            core: ActorCore::new(location),
            current_frame: 0,
            first_tick: true,
        }
    }
}

impl Actor for Bullet {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Shot
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-2.0, 2.0, -5.0, 5.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        Self::DAMAGE
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("bullet", Self::FRAMES, 5, self.current_frame)
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.first_tick {
            world.audio().play("laser");
            self.first_tick = false;
        }

        self.current_frame = (self.current_frame + 1) % Self::FRAMES;

        for _ in 0..Self::SPEED {
            self.core.move_in(Direction::Up, 1.0);

            if self.core.location.y < 0.0 {
                self.core.deactivate();
            } else if strike_first(&*self, &world.active_enemies()) {
                self.core.deactivate();
            }

            if !self.core.is_active() {
                break;
            }
        }
        Ok(())
    }
}

/// Enemy shot that falls, then bursts into shrapnel
pub struct Grenade {
    core: ActorCore,
    current_frame: usize,
    travelled: f32,
    first_tick: bool,
}

impl Grenade {
    pub const SPEED: usize = 4;
    pub const DAMAGE: u32 = 3;
    /// Distance fallen before bursting
    pub const FUSE_DISTANCE: f32 = 200.0;
    const FRAMES: usize = 4;
    const SHRAPNEL_PIECES: usize = 8;

    pub fn new(location: Point) -> Self {
        log::debug!("Grenade at {}", location);
        Self {
            core: ActorCore::new(location),
            current_frame: 0,
            travelled: 0.0,
            first_tick: true,
        }
    }

    fn burst(&mut self, world: &mut World) {
        log::debug!("Grenade {:?} bursting at {}", self.core.id, self.core.location);
        let step = 360.0 / Self::SHRAPNEL_PIECES as f32;
        for i in 0..Self::SHRAPNEL_PIECES {
            world.add_actor(Shrapnel::new(self.core.location, i as f32 * step));
        }
        self.core.deactivate();
    }
}

impl Actor for Grenade {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Shot
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-4.0, 4.0, -4.0, 4.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        Self::DAMAGE
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("grenade", Self::FRAMES, 9, self.current_frame)
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.first_tick {
            world.audio().play("grenade");
            self.first_tick = false;
        }

        self.current_frame = (self.current_frame + 1) % Self::FRAMES;

        for _ in 0..Self::SPEED {
            self.core.move_in(Direction::Down, 1.0);
            self.travelled += 1.0;

            if self.core.location.y > world.dimensions().height {
                self.core.deactivate();
            } else if let Some(player) = world.player() {
                if strike_first(&*self, &[player]) {
                    self.core.deactivate();
                }
            }

            if !self.core.is_active() {
                break;
            }
        }

        if self.core.is_active() && self.travelled >= Self::FUSE_DISTANCE {
            self.burst(world);
        }
        Ok(())
    }
}

/// Fragment flying along a fixed heading
pub struct Shrapnel {
    core: ActorCore,
    /// Unrounded position
    exact: Vec2,
    /// Unit step per sub-step, screen space
    heading: Vec2,
    current_frame: usize,
    first_tick: bool,
}

impl Shrapnel {
    pub const SPEED: usize = 10;
    pub const DAMAGE: u32 = 1;
    const FRAMES: usize = 4;

    /// `trajectory` is in degrees, counter-clockwise from the +x axis as seen
    /// on screen (270 falls straight down)
    pub fn new(location: Point, trajectory: f32) -> Self {
        let radians = trajectory.to_radians();
        Self {
            core: ActorCore::new(location),
            exact: Vec2::from(location),
            // Screen y grows downwards
            heading: Vec2::new(radians.cos(), -radians.sin()),
            current_frame: 0,
            first_tick: true,
        }
    }

    fn step(&mut self) {
        self.exact += self.heading;
        self.core.location = Point::new(self.exact.x.round(), self.exact.y.round());
    }
}

impl Actor for Shrapnel {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Shot
    }

    fn collision_mask(&self) -> Vec<Bounds> {
        vec![Bounds::new(-5.0, 5.0, -5.0, 5.0)]
    }

    fn damage_against(&self, _target: &dyn Actor) -> u32 {
        Self::DAMAGE
    }

    fn image_details(&self) -> ImageDetails {
        ImageDetails::new("bomb", Self::FRAMES, 11, self.current_frame)
    }

    fn tick(&mut self, world: &mut World) -> SimResult<()> {
        if self.first_tick {
            world.audio().play("bomb_drop");
            self.first_tick = false;
        }

        self.current_frame = (self.current_frame + 1) % Self::FRAMES;

        for _ in 0..Self::SPEED {
            self.step();

            if !world.dimensions().contains(self.core.location) {
                self.core.deactivate();
            } else if let Some(player) = world.player() {
                if strike_first(&*self, &[player]) {
                    self.core.deactivate();
                }
            }

            if !self.core.is_active() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::{StubActor, test_world};

    #[test]
    fn test_bullet_moves_straight_up() {
        let (mut world, _clock, _audio) = test_world();
        let mut bullet = Bullet::new(Point::new(5.0, 100.0));
        bullet.tick(&mut world).unwrap();
        assert_eq!(bullet.coordinates().x, 5.0);
        assert!(bullet.coordinates().y < 100.0);
    }

    #[test]
    fn test_bullet_animates_and_recycles_frames() {
        let (mut world, _clock, _audio) = test_world();
        let mut bullet = Bullet::new(Point::new(5.0, 600.0));
        assert_eq!(bullet.image_details().current_frame, 0);
        bullet.tick(&mut world).unwrap();
        assert_eq!(bullet.image_details().current_frame, 1);

        let frames = bullet.image_details().number_of_frames;
        for _ in 1..frames {
            bullet.tick(&mut world).unwrap();
        }
        assert_eq!(bullet.image_details().current_frame, 0);
    }

    #[test]
    fn test_bullet_stays_active_inside_world() {
        let (mut world, _clock, _audio) = test_world();
        let mut bullet = Bullet::new(Point::new(5.0, 10.0));
        bullet.tick(&mut world).unwrap();
        assert!(bullet.is_active());
    }

    #[test]
    fn test_bullet_leaves_world() {
        let (mut world, _clock, _audio) = test_world();
        let mut bullet = Bullet::new(Point::new(5.0, 0.0));
        bullet.tick(&mut world).unwrap();
        assert!(!bullet.is_active());
    }

    #[test]
    fn test_bullet_hits_enemy_once_with_damage_one() {
        let (mut world, _clock, _audio) = test_world();
        let enemy = world.add_actor(StubActor::enemy(Point::new(10.0, 10.0)));
        let bullet = world.add_actor(Bullet::new(Point::new(10.0, 10.0)));

        world.tick_actors().unwrap();

        assert!(!bullet.borrow().is_active());
        assert_eq!(enemy.borrow().hits(), vec![1]);
        assert_eq!(enemy.borrow().hit_calls(), 1);

        // Spent bullets do nothing more
        world.tick_actors().unwrap();
        assert_eq!(enemy.borrow().hit_calls(), 1);
    }

    #[test]
    fn test_bullet_misses_distant_enemy() {
        let (mut world, _clock, _audio) = test_world();
        let enemy = world.add_actor(StubActor::enemy(Point::new(100.0, 100.0)));
        let mut bullet = Bullet::new(Point::new(10.0, 10.0));
        bullet.tick(&mut world).unwrap();
        assert!(enemy.borrow().hits().is_empty());
        assert!(bullet.is_active());
    }

    #[test]
    fn test_bullet_spent_on_refused_hit() {
        let (mut world, _clock, _audio) = test_world();
        world.add_actor(StubActor::enemy(Point::new(10.0, 10.0)).refuse_hits());
        let mut bullet = Bullet::new(Point::new(10.0, 10.0));
        bullet.tick(&mut world).unwrap();
        assert!(!bullet.is_active());
    }

    #[test]
    fn test_bullet_hits_only_one_of_two_targets() {
        let (mut world, _clock, _audio) = test_world();
        let first = world.add_actor(StubActor::enemy(Point::new(10.0, 10.0)));
        let second = world.add_actor(StubActor::enemy(Point::new(10.0, 10.0)));
        let mut bullet = Bullet::new(Point::new(10.0, 10.0));
        bullet.tick(&mut world).unwrap();
        // Oldest target wins the tie
        assert_eq!(first.borrow().hit_calls(), 1);
        assert_eq!(second.borrow().hit_calls(), 0);
    }

    #[test]
    fn test_bullet_sub_steps_into_thin_target() {
        let (mut world, _clock, _audio) = test_world();
        // One pixel tall target 6px above the bullet mask top
        let thin = world.add_actor(
            StubActor::enemy(Point::new(50.0, 89.0)).with_mask(vec![Bounds::new(-10.0, 10.0, 0.0, 0.0)]),
        );
        let mut bullet = Bullet::new(Point::new(50.0, 100.0));
        bullet.tick(&mut world).unwrap();
        assert_eq!(thin.borrow().hits(), vec![1]);
        // Stopped at first contact: top of mask touches y=89
        assert_eq!(bullet.coordinates().y, 94.0);
    }

    #[test]
    fn test_bullet_plays_sound_on_first_tick_only() {
        let (mut world, _clock, audio) = test_world();
        let mut bullet = Bullet::new(Point::new(5.0, 600.0));
        bullet.tick(&mut world).unwrap();
        bullet.tick(&mut world).unwrap();
        assert_eq!(audio.played(), vec!["laser".to_string()]);
    }

    #[test]
    fn test_grenade_falls_straight_down() {
        let (mut world, _clock, _audio) = test_world();
        let mut grenade = Grenade::new(Point::new(5.0, 10.0));
        grenade.tick(&mut world).unwrap();
        assert_eq!(grenade.coordinates().x, 5.0);
        assert!(grenade.coordinates().y > 10.0);
        assert!(grenade.is_active());
    }

    #[test]
    fn test_grenade_bursts_after_fuse_distance() {
        let (mut world, _clock, _audio) = test_world();
        let mut grenade = Grenade::new(Point::new(5.0, 10.0));
        while grenade.coordinates().y < 210.0 {
            grenade.tick(&mut world).unwrap();
        }
        assert!(!grenade.is_active());
        let shrapnel = world
            .actors()
            .iter()
            .filter(|a| a.borrow().image_details().name == "bomb")
            .count();
        assert_eq!(shrapnel, 8);
    }

    #[test]
    fn test_grenade_leaves_world() {
        let (mut world, _clock, _audio) = test_world();
        let height = world.dimensions().height;
        let mut grenade = Grenade::new(Point::new(5.0, height));
        grenade.tick(&mut world).unwrap();
        assert!(!grenade.is_active());
        // Left the world, did not burst
        assert!(world.actors().is_empty());
    }

    #[test]
    fn test_grenade_hits_player_for_three() {
        let (mut world, _clock, _audio) = test_world();
        let player = world.add_actor(StubActor::player(Point::new(10.0, 10.0)));
        let mut grenade = Grenade::new(Point::new(10.0, 10.0));
        grenade.tick(&mut world).unwrap();
        assert_eq!(player.borrow().hits(), vec![3]);
        assert!(!grenade.is_active());
    }

    #[test]
    fn test_grenade_ignores_distant_player_and_lives_without_one() {
        let (mut world, _clock, _audio) = test_world();
        let mut grenade = Grenade::new(Point::new(10.0, 10.0));
        grenade.tick(&mut world).unwrap();
        assert!(grenade.is_active());

        let player = world.add_actor(StubActor::player(Point::new(100.0, 100.0)));
        grenade.tick(&mut world).unwrap();
        assert!(player.borrow().hits().is_empty());
        assert!(grenade.is_active());
    }

    #[test]
    fn test_grenade_spent_on_refused_hit() {
        let (mut world, _clock, _audio) = test_world();
        world.add_actor(StubActor::player(Point::new(10.0, 10.0)).refuse_hits());
        let mut grenade = Grenade::new(Point::new(10.0, 10.0));
        grenade.tick(&mut world).unwrap();
        assert!(!grenade.is_active());
    }

    #[test]
    fn test_shrapnel_heading() {
        let (mut world, _clock, audio) = test_world();
        let mut down = Shrapnel::new(Point::new(100.0, 100.0), 270.0);
        down.tick(&mut world).unwrap();
        assert_eq!(down.coordinates(), Point::new(100.0, 110.0));

        let mut right = Shrapnel::new(Point::new(100.0, 100.0), 0.0);
        right.tick(&mut world).unwrap();
        assert_eq!(right.coordinates(), Point::new(110.0, 100.0));
        assert_eq!(audio.played(), vec!["bomb_drop".to_string(), "bomb_drop".to_string()]);
    }

    #[test]
    fn test_shrapnel_deactivates_outside_world() {
        let (mut world, _clock, _audio) = test_world();
        let mut up = Shrapnel::new(Point::new(100.0, 3.0), 90.0);
        up.tick(&mut world).unwrap();
        assert!(!up.is_active());
    }

    #[test]
    fn test_shrapnel_hits_player_once() {
        let (mut world, _clock, _audio) = test_world();
        let player = world.add_actor(StubActor::player(Point::new(100.0, 105.0)));
        let mut piece = Shrapnel::new(Point::new(100.0, 100.0), 270.0);
        piece.tick(&mut world).unwrap();
        assert_eq!(player.borrow().hits(), vec![1]);
        assert!(!piece.is_active());
    }
}
