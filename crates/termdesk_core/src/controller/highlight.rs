//! Transient row highlight after a successful mutation.
//!
//! Each highlight is a timed fade keyed by record id: alpha starts at 1.0 and
//! drops by 0.1 every step until it reaches 0.0, after which the effect ends
//! and the row returns to its normal background. Time is passed in by the
//! caller, so the effect never owns a timer thread.
//!
//! # Invariants
//! - At most one running effect per id; starting again restarts the fade.
//! - Cancelling an effect is immediate and idempotent.

use crate::model::contract_term::ContractTermId;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_STEP: Duration = Duration::from_millis(200);
const MIN_STEP: Duration = Duration::from_millis(1);
const FADE_STEPS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Highlights {
    step: Duration,
    running: BTreeMap<ContractTermId, Instant>,
}

impl Default for Highlights {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

impl Highlights {
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(MIN_STEP),
            running: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Time from start until the effect ends.
    pub fn total_duration(&self) -> Duration {
        self.step * (FADE_STEPS + 1)
    }

    /// Starts (or restarts) the fade for `id`.
    pub fn start(&mut self, id: ContractTermId, now: Instant) {
        self.running.insert(id, now);
    }

    /// Stops the fade for `id`. Returns whether one was running.
    pub fn cancel(&mut self, id: ContractTermId) -> bool {
        self.running.remove(&id).is_some()
    }

    /// Background alpha for `id` at `now`, or `None` when no fade applies.
    pub fn alpha(&self, id: ContractTermId, now: Instant) -> Option<f32> {
        let started_at = self.running.get(&id)?;
        let steps = self.steps_elapsed(*started_at, now);
        if steps > u128::from(FADE_STEPS) {
            return None;
        }
        let remaining = FADE_STEPS - steps as u32;
        Some(remaining as f32 / FADE_STEPS as f32)
    }

    pub fn is_active(&self, id: ContractTermId, now: Instant) -> bool {
        self.alpha(id, now).is_some()
    }

    /// Drops finished effects and returns their ids.
    pub fn sweep(&mut self, now: Instant) -> Vec<ContractTermId> {
        let finished: Vec<ContractTermId> = self
            .running
            .iter()
            .filter(|(_, started_at)| {
                self.steps_elapsed(**started_at, now) > u128::from(FADE_STEPS)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &finished {
            self.running.remove(id);
        }
        finished
    }

    /// Ids with an effect registered, finished or not.
    pub fn ids(&self) -> impl Iterator<Item = ContractTermId> + '_ {
        self.running.keys().copied()
    }

    fn steps_elapsed(&self, started_at: Instant, now: Instant) -> u128 {
        now.saturating_duration_since(started_at).as_nanos() / self.step.as_nanos()
    }
}

#[cfg(test)]
mod tests {
    use super::{Highlights, DEFAULT_STEP};
    use std::time::{Duration, Instant};

    #[test]
    fn fades_in_tenths_every_step() {
        let mut highlights = Highlights::default();
        let t0 = Instant::now();
        highlights.start(7, t0);

        assert_eq!(highlights.alpha(7, t0), Some(1.0));
        assert_eq!(highlights.alpha(7, t0 + DEFAULT_STEP), Some(0.9));
        assert_eq!(highlights.alpha(7, t0 + DEFAULT_STEP * 5), Some(0.5));
        assert_eq!(highlights.alpha(7, t0 + DEFAULT_STEP * 10), Some(0.0));
        assert_eq!(highlights.alpha(7, t0 + DEFAULT_STEP * 11), None);
        assert_eq!(highlights.total_duration(), Duration::from_millis(2200));
    }

    #[test]
    fn restart_resets_the_fade() {
        let mut highlights = Highlights::default();
        let t0 = Instant::now();
        highlights.start(1, t0);
        highlights.start(1, t0 + DEFAULT_STEP * 8);
        assert_eq!(highlights.alpha(1, t0 + DEFAULT_STEP * 9), Some(0.9));
    }

    #[test]
    fn cancel_and_sweep_remove_effects() {
        let mut highlights = Highlights::new(Duration::from_millis(10));
        let t0 = Instant::now();
        highlights.start(1, t0);
        highlights.start(2, t0);

        assert!(highlights.cancel(1));
        assert!(!highlights.cancel(1));
        assert_eq!(highlights.alpha(1, t0), None);

        assert!(highlights.sweep(t0 + Duration::from_millis(50)).is_empty());
        assert_eq!(highlights.sweep(t0 + Duration::from_millis(200)), vec![2]);
        assert_eq!(highlights.ids().count(), 0);
    }
}
