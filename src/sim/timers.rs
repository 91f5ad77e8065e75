//! Deterministic timer calendar
//!
//! Delayed and repeating callbacks as plain data. The session advances the
//! calendar by simulation time and dispatches whatever came due, so nothing
//! runs outside the single update step and a paused session simply stops
//! advancing it.

use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Enemy fire-rate tick (repeating)
    EnemyFire,
    /// Warning finished, take the shot if the enemy is still around
    AimedShot { enemy_id: u32 },
    /// Death blink finished, remove the enemy
    EnemyBlinkDone { enemy_id: u32 },
    /// Announcement over, spawn the next wave
    WaveTransitionDone,
    /// Player hit state machine moves to its next state
    PlayerCondition,
    HitTextExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    due_ms: f64,
    /// Repeat interval for `every` timers
    interval_ms: Option<f64>,
    /// Time left when paused
    paused_remaining: Option<f64>,
    event: TimerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_handle: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation time in ms
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn insert(&mut self, delay_ms: f64, interval_ms: Option<f64>, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + delay_ms.max(0.0),
            interval_ms,
            paused_remaining: None,
            event,
        });
        handle
    }

    /// Fire once after `delay_ms`
    pub fn after(&mut self, delay_ms: f64, event: TimerEvent) -> TimerHandle {
        self.insert(delay_ms, None, event)
    }

    /// Fire every `interval_ms`, first time one interval from now
    pub fn every(&mut self, interval_ms: f64, event: TimerEvent) -> TimerHandle {
        // Zero intervals would fire forever within one advance
        let interval_ms = interval_ms.max(1.0);
        self.insert(interval_ms, Some(interval_ms), event)
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Freeze or resume a single timer, keeping its remaining time
    pub fn set_paused(&mut self, handle: TimerHandle, paused: bool) {
        let now = self.now_ms;
        if let Some(timer) = self.timers.iter_mut().find(|t| t.handle == handle) {
            match (paused, timer.paused_remaining) {
                (true, None) => timer.paused_remaining = Some((timer.due_ms - now).max(0.0)),
                (false, Some(remaining)) => {
                    timer.due_ms = now + remaining;
                    timer.paused_remaining = None;
                }
                _ => {}
            }
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn is_paused(&self, handle: TimerHandle) -> bool {
        self.timers
            .iter()
            .any(|t| t.handle == handle && t.paused_remaining.is_some())
    }

    /// Number of scheduled timers (paused ones included)
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Move the clock forward without firing anything
    pub fn advance_clock(&mut self, dt_ms: f64) {
        self.now_ms += dt_ms.max(0.0);
    }

    /// Take the earliest due timer (ties broken by creation order),
    /// rescheduling repeats. A timer cancelled or paused between calls never
    /// comes out.
    pub fn pop_due(&mut self) -> Option<TimerEvent> {
        let now = self.now_ms;
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.paused_remaining.is_none() && t.due_ms <= now)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.handle.cmp(&b.handle)))
            .map(|(i, _)| i)?;

        let event = self.timers[idx].event;
        match self.timers[idx].interval_ms {
            Some(interval) => self.timers[idx].due_ms += interval,
            None => {
                self.timers.remove(idx);
            }
        }
        Some(event)
    }

    /// Advance time and collect everything that came due, in due order
    pub fn advance(&mut self, dt_ms: f64) -> Vec<TimerEvent> {
        self.advance_clock(dt_ms);
        std::iter::from_fn(|| self.pop_due()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_fires_once() {
        let mut s = Scheduler::new();
        let h = s.after(100.0, TimerEvent::WaveTransitionDone);
        assert!(s.advance(99.0).is_empty());
        assert_eq!(s.advance(1.0), vec![TimerEvent::WaveTransitionDone]);
        assert!(!s.is_pending(h));
        assert!(s.advance(1000.0).is_empty());
    }

    #[test]
    fn test_every_repeats() {
        let mut s = Scheduler::new();
        s.every(250.0, TimerEvent::EnemyFire);
        assert_eq!(s.advance(1000.0).len(), 4);
        assert_eq!(s.advance(249.0).len(), 0);
        assert_eq!(s.advance(1.0).len(), 1);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let h = s.after(10.0, TimerEvent::HitTextExpired);
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(s.advance(100.0).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut s = Scheduler::new();
        s.after(30.0, TimerEvent::AimedShot { enemy_id: 1 });
        s.after(10.0, TimerEvent::EnemyBlinkDone { enemy_id: 2 });
        s.after(10.0, TimerEvent::PlayerCondition);
        let fired = s.advance(50.0);
        assert_eq!(
            fired,
            vec![
                TimerEvent::EnemyBlinkDone { enemy_id: 2 },
                TimerEvent::PlayerCondition,
                TimerEvent::AimedShot { enemy_id: 1 },
            ]
        );
    }

    #[test]
    fn test_pause_keeps_remaining_time() {
        let mut s = Scheduler::new();
        let h = s.every(1000.0, TimerEvent::EnemyFire);
        s.advance(600.0);
        s.set_paused(h, true);
        assert!(s.is_paused(h));
        assert!(s.advance(5000.0).is_empty());
        s.set_paused(h, false);
        assert!(s.advance(399.0).is_empty());
        assert_eq!(s.advance(1.0), vec![TimerEvent::EnemyFire]);
    }

    #[test]
    fn test_cancel_while_dispatching() {
        let mut s = Scheduler::new();
        s.after(100.0, TimerEvent::WaveTransitionDone);
        let fire = s.every(100.0, TimerEvent::EnemyFire);
        s.advance_clock(100.0);

        assert_eq!(s.pop_due(), Some(TimerEvent::WaveTransitionDone));
        // Handler replaces the fire timer before the old one is dispatched
        assert!(s.cancel(fire));
        let replacement = s.every(80.0, TimerEvent::EnemyFire);
        assert_eq!(s.pop_due(), None);
        assert!(s.is_pending(replacement));
        assert_eq!(s.advance(80.0), vec![TimerEvent::EnemyFire]);
    }

    #[test]
    fn test_clear() {
        let mut s = Scheduler::new();
        s.every(10.0, TimerEvent::EnemyFire);
        s.after(10.0, TimerEvent::WaveTransitionDone);
        s.clear();
        assert_eq!(s.pending(), 0);
        assert!(s.advance(100.0).is_empty());
    }
}
