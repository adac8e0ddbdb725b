//! Simulation clock and per-owner operation scheduler
//!
//! Time here is simulation time only: the clock advances when the game ticks,
//! never with the wall clock. That keeps replays and tests deterministic.
//!
//! A `Scheduler` holds named operations for one owner (an actor, a wave, the
//! level manager). Operations are plain values, usually a small `Copy` enum
//! owned by the actor. Owners pull due operations one at a time with
//! `next_due` and run them with a `match`; `execute_due_operations` drains the
//! whole batch at once:
//!
//! ```
//! use blaster::sim::{Scheduler, SimClock};
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! enum Op { Blink }
//!
//! let clock = SimClock::new();
//! let mut scheduler = Scheduler::new(clock.handle());
//! scheduler.schedule_operation("blink", 100, Op::Blink).unwrap();
//! clock.advance(100);
//! assert_eq!(scheduler.execute_due_operations(), vec![Op::Blink]);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{SimError, SimResult};

/// Source of the current simulation time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Shared handle to a clock
pub type ClockHandle = Rc<dyn Clock>;

/// The tick-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    /// Type-erased handle for schedulers
    pub fn handle(&self) -> ClockHandle {
        Rc::new(self.clone())
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
struct ScheduledOperation<Op> {
    name: &'static str,
    fire_at: u64,
    /// Re-arm interval for recurring operations
    every: Option<u64>,
    seq: u64,
    op: Op,
}

/// Named delayed and recurring operations for a single owner
pub struct Scheduler<Op> {
    clock: ClockHandle,
    /// Kept in insertion order (ascending `seq`)
    pending: Vec<ScheduledOperation<Op>>,
    next_seq: u64,
    /// Operations inserted at or after this `seq` are held for the next batch
    batch_end: Option<u64>,
}

impl<Op: Clone> Scheduler<Op> {
    pub fn new(clock: ClockHandle) -> Self {
        Self {
            clock,
            pending: Vec::new(),
            next_seq: 0,
            batch_end: None,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Run `op` once, `delay_ms` from now.
    ///
    /// Replaces any pending operation with the same name. A zero delay is due
    /// straight away and fires on the next `execute_due_operations` call.
    pub fn schedule_operation(&mut self, name: &'static str, delay_ms: i64, op: Op) -> SimResult<()> {
        if delay_ms < 0 {
            return Err(SimError::configuration(format!(
                "operation '{name}' scheduled with negative delay {delay_ms}ms"
            )));
        }
        self.insert(name, delay_ms as u64, None, op);
        Ok(())
    }

    /// Run `op` every `interval_ms`, starting one interval from now
    pub fn schedule_recurring(&mut self, name: &'static str, interval_ms: i64, op: Op) -> SimResult<()> {
        if interval_ms <= 0 {
            return Err(SimError::configuration(format!(
                "recurring operation '{name}' needs a positive interval, got {interval_ms}ms"
            )));
        }
        self.insert(name, interval_ms as u64, Some(interval_ms as u64), op);
        Ok(())
    }

    fn insert(&mut self, name: &'static str, delay: u64, every: Option<u64>, op: Op) {
        self.cancel(name);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(ScheduledOperation {
            name,
            fire_at: self.clock.now_ms() + delay,
            every,
            seq,
            op,
        });
    }

    /// Drop a pending operation. Returns whether one was pending.
    pub fn cancel(&mut self, name: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.name != name);
        self.pending.len() != before
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.iter().any(|p| p.name == name)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the oldest operation due by now.
    ///
    /// A batch runs until this returns `None`. Operations scheduled while a
    /// batch is being drained, zero-delay ones included, wait for the next
    /// batch. Anything not handed out yet stays pending, so an owner that
    /// returns early with `?` loses nothing.
    pub fn next_due(&mut self) -> Option<Op> {
        let now = self.clock.now_ms();
        let cutoff = *self.batch_end.get_or_insert(self.next_seq);
        let Some(index) = self
            .pending
            .iter()
            .position(|p| p.seq < cutoff && p.fire_at <= now)
        else {
            self.batch_end = None;
            return None;
        };

        let op = self.pending[index].op.clone();
        match self.pending[index].every {
            // Stays in place so it keeps firing until caught up
            Some(every) => self.pending[index].fire_at += every,
            None => {
                self.pending.remove(index);
            }
        }
        Some(op)
    }

    /// Remove every operation due by now and return them in insertion order.
    ///
    /// One-shot operations are gone afterwards. A recurring operation appears
    /// once per interval that elapsed and stays pending at its next fire time.
    pub fn execute_due_operations(&mut self) -> Vec<Op> {
        let due: Vec<Op> = std::iter::from_fn(|| self.next_due()).collect();
        if !due.is_empty() {
            log::trace!(
                "scheduler fired {} operation(s) at {}ms",
                due.len(),
                self.clock.now_ms()
            );
        }
        due
    }
}

impl<Op> std::fmt::Debug for Scheduler<Op> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now_ms", &self.clock.now_ms())
            .field(
                "pending",
                &self
                    .pending
                    .iter()
                    .map(|p| (p.name, p.fire_at, p.seq))
                    .collect::<Vec<_>>(),
            )
            .field("batch_end", &self.batch_end)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Op {
        A,
        B,
        C,
    }

    fn setup() -> (SimClock, Scheduler<Op>) {
        let clock = SimClock::new();
        let scheduler = Scheduler::new(clock.handle());
        (clock, scheduler)
    }

    #[test]
    fn test_nothing_fires_before_due() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("a", 100, Op::A).unwrap();
        clock.advance(99);
        assert!(scheduler.execute_due_operations().is_empty());
        clock.advance(1);
        assert_eq!(scheduler.execute_due_operations(), vec![Op::A]);
        // Consumed
        assert!(scheduler.execute_due_operations().is_empty());
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[test]
    fn test_same_name_replaces_pending() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("op", 100, Op::A).unwrap();
        scheduler.schedule_operation("op", 100, Op::B).unwrap();
        assert_eq!(scheduler.pending_len(), 1);
        clock.advance(500);
        assert_eq!(scheduler.execute_due_operations(), vec![Op::B]);
    }

    #[test]
    fn test_due_operations_in_insertion_order() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("c", 300, Op::C).unwrap();
        scheduler.schedule_operation("a", 100, Op::A).unwrap();
        scheduler.schedule_operation("b", 200, Op::B).unwrap();
        clock.advance(1000);
        assert_eq!(scheduler.execute_due_operations(), vec![Op::C, Op::A, Op::B]);
    }

    #[test]
    fn test_replacement_moves_to_back() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("a", 10, Op::A).unwrap();
        scheduler.schedule_operation("b", 10, Op::B).unwrap();
        scheduler.schedule_operation("a", 10, Op::A).unwrap();
        clock.advance(10);
        assert_eq!(scheduler.execute_due_operations(), vec![Op::B, Op::A]);
    }

    #[test]
    fn test_self_rearming_operation() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("tick", 250, Op::A).unwrap();
        let mut fired = 0;
        // 1000ms in 50ms ticks, owner re-arms after every fire
        for _ in 0..20 {
            clock.advance(50);
            for op in scheduler.execute_due_operations() {
                assert_eq!(op, Op::A);
                fired += 1;
                scheduler.schedule_operation("tick", 250, Op::A).unwrap();
            }
        }
        assert_eq!(fired, 4);
    }

    #[test]
    fn test_recurring_fires_once_per_elapsed_interval() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_recurring("pulse", 250, Op::A).unwrap();
        for _ in 0..3 {
            clock.advance(1000);
            assert_eq!(scheduler.execute_due_operations(), vec![Op::A; 4]);
        }
        assert!(scheduler.is_pending("pulse"));
    }

    #[test]
    fn test_zero_delay_fires_on_next_call() {
        let (_clock, mut scheduler) = setup();
        scheduler.schedule_operation("now", 0, Op::A).unwrap();
        assert_eq!(scheduler.execute_due_operations(), vec![Op::A]);
    }

    #[test]
    fn test_rescheduling_while_running_waits_for_next_call() {
        let (_clock, mut scheduler) = setup();
        scheduler.schedule_operation("loop", 0, Op::A).unwrap();
        let due = scheduler.execute_due_operations();
        assert_eq!(due.len(), 1);
        scheduler.schedule_operation("loop", 0, Op::A).unwrap();
        // Not in the batch already handed out; due on the next call
        assert_eq!(scheduler.execute_due_operations(), vec![Op::A]);
    }

    #[test]
    fn test_next_due_holds_back_operations_added_mid_batch() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("a", 10, Op::A).unwrap();
        scheduler.schedule_operation("b", 10, Op::B).unwrap();
        clock.advance(10);

        assert_eq!(scheduler.next_due(), Some(Op::A));
        scheduler.schedule_operation("c", 0, Op::C).unwrap();
        assert_eq!(scheduler.next_due(), Some(Op::B));
        assert_eq!(scheduler.next_due(), None);
        assert_eq!(scheduler.next_due(), Some(Op::C));
        assert_eq!(scheduler.next_due(), None);
    }

    /// Runs due operations like an actor does, failing on `Op::A`
    fn run_owner(scheduler: &mut Scheduler<Op>, ran: &mut Vec<Op>) -> SimResult<()> {
        while let Some(op) = scheduler.next_due() {
            if op == Op::A {
                return Err(SimError::invariant("handler failed"));
            }
            ran.push(op);
        }
        Ok(())
    }

    #[test]
    fn test_failed_handler_leaves_rest_of_batch_pending() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("a", 10, Op::A).unwrap();
        scheduler.schedule_operation("b", 10, Op::B).unwrap();
        scheduler.schedule_operation("c", 10, Op::C).unwrap();
        clock.advance(10);

        let mut ran = Vec::new();
        assert!(run_owner(&mut scheduler, &mut ran).is_err());
        assert!(ran.is_empty());
        assert_eq!(scheduler.pending_len(), 2);

        run_owner(&mut scheduler, &mut ran).unwrap();
        assert_eq!(ran, vec![Op::B, Op::C]);
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[test]
    fn test_negative_delay_rejected() {
        let (_clock, mut scheduler) = setup();
        assert!(matches!(
            scheduler.schedule_operation("bad", -1, Op::A),
            Err(SimError::Configuration(_))
        ));
        assert!(matches!(
            scheduler.schedule_recurring("bad", 0, Op::A),
            Err(SimError::Configuration(_))
        ));
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[test]
    fn test_cancel() {
        let (clock, mut scheduler) = setup();
        scheduler.schedule_operation("a", 10, Op::A).unwrap();
        assert!(scheduler.cancel("a"));
        assert!(!scheduler.cancel("a"));
        clock.advance(10);
        assert!(scheduler.execute_due_operations().is_empty());
    }

    #[test]
    fn test_schedulers_share_clock() {
        let clock = SimClock::new();
        let mut first: Scheduler<Op> = Scheduler::new(clock.handle());
        let mut second: Scheduler<Op> = Scheduler::new(clock.handle());
        first.schedule_operation("a", 100, Op::A).unwrap();
        second.schedule_operation("b", 200, Op::B).unwrap();
        clock.advance(150);
        assert_eq!(first.execute_due_operations(), vec![Op::A]);
        assert!(second.execute_due_operations().is_empty());
        clock.advance(50);
        assert_eq!(second.execute_due_operations(), vec![Op::B]);
    }
}
