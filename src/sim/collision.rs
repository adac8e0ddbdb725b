//! Hit arbitration between actors
//!
//! An attack connects when any region of the attacker's collision mask
//! overlaps any region of the target's, both placed at their actors' current
//! locations. The target decides whether to accept the hit (invulnerability
//! windows reject). A plain hit never touches the attacker: single-use
//! attackers such as shots deactivate themselves after a hit. A ram is the
//! ship-on-ship case, where a landed hit also hurts the attacker.

use super::actor::{Actor, ActorRef};
use super::geometry::masks_overlap;

/// Outcome of one hit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Overlapping, and the target accepted the damage
    Hit,
    /// No overlap, an inactive party, or the target refused the hit
    Miss,
}

pub struct HitArbiter;

impl HitArbiter {
    /// True if both actors are active and their masks overlap
    pub fn in_contact(attacker: &dyn Actor, target: &dyn Actor) -> bool {
        attacker.is_active()
            && target.is_active()
            && masks_overlap(
                &attacker.collision_mask(),
                attacker.coordinates(),
                &target.collision_mask(),
                target.coordinates(),
            )
    }

    /// Test overlap and, on contact, call `target.hit_by` exactly once
    pub fn attempt_to_hit(attacker: &dyn Actor, target: &mut dyn Actor) -> HitResult {
        if !Self::in_contact(attacker, target) {
            return HitResult::Miss;
        }

        let damage = attacker.damage_against(target);
        if target.hit_by(attacker, damage) {
            log::debug!(
                "{:?} hit {:?} for {} at {}",
                attacker.id(),
                target.id(),
                damage,
                target.coordinates()
            );
            HitResult::Hit
        } else {
            HitResult::Miss
        }
    }

    /// Same as [`attempt_to_hit`](Self::attempt_to_hit) against a shared
    /// handle. A target that is already borrowed (the actor currently
    /// ticking) cannot be hit and counts as a miss.
    pub fn attempt_to_hit_shared(attacker: &dyn Actor, target: &ActorRef) -> HitResult {
        match target.try_borrow_mut() {
            Ok(mut target) => Self::attempt_to_hit(attacker, &mut *target),
            Err(_) => HitResult::Miss,
        }
    }

    /// Ship-on-ship collision. When the attacker lands a hit, the target
    /// strikes back in the same moment with its own `damage_against`, so
    /// both sides take damage whichever of them is ticking.
    pub fn ram(attacker: &mut dyn Actor, target: &mut dyn Actor) -> HitResult {
        let result = Self::attempt_to_hit(&*attacker, &mut *target);
        if result == HitResult::Hit {
            let recoil = target.damage_against(&*attacker);
            attacker.hit_by(&*target, recoil);
        }
        result
    }

    /// [`ram`](Self::ram) against a shared handle; a borrowed target misses
    pub fn ram_shared(attacker: &mut dyn Actor, target: &ActorRef) -> HitResult {
        match target.try_borrow_mut() {
            Ok(mut target) => Self::ram(attacker, &mut *target),
            Err(_) => HitResult::Miss,
        }
    }

    /// Contact test against a shared handle
    pub fn in_contact_shared(attacker: &dyn Actor, target: &ActorRef) -> bool {
        target
            .try_borrow()
            .map(|target| Self::in_contact(attacker, &*target))
            .unwrap_or(false)
    }
}
