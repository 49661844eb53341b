//! Per-tag fade engine.
//!
//! Every [`FadeController::start_fade`] call spawns an independent ramp task
//! that walks the tag's CC value towards a target in fixed steps. Tasks are
//! never cancelled directly. Each call bumps the Fade Record's generation
//! before spawning; a running ramp polls the generation before every send
//! and stops as soon as it no longer owns the record.
//!
//! # Ordering
//!
//! A stale ramp that already passed its poll point may still deliver one
//! send after the newer ramp started. The newer ramp's steady state always
//! wins.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::constants::{CC_MAX, FADE_IN_DURATION, FADE_OUT_DURATION, FADE_STEP};
use crate::traits::CcSink;
use crate::types::FadeKey;

/// Step size and ramp durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeSettings {
    /// Value increment per step. Must be non-zero.
    pub step_size: u8,
    /// Duration of a ramp whose target is [`CC_MAX`].
    pub fade_in: Duration,
    /// Duration of a ramp towards any other target.
    pub fade_out: Duration,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            step_size: FADE_STEP,
            fade_in: FADE_IN_DURATION,
            fade_out: FADE_OUT_DURATION,
        }
    }
}

impl FadeSettings {
    /// Total ramp duration for `target`.
    pub fn duration_for(&self, target: u8) -> Duration {
        if target == CC_MAX {
            self.fade_in
        } else {
            self.fade_out
        }
    }
}

/// The stepped trajectory from one value to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadePlan {
    pub start: u8,
    pub target: u8,
    pub steps: u32,
    pub step_time: Duration,
    step_size: u8,
}

impl FadePlan {
    /// Plan a ramp from `start` to `target`.
    ///
    /// Returns `None` when the distance is below one step (including
    /// `start == target`): the target is then sent directly.
    pub fn new(start: u8, target: u8, settings: &FadeSettings) -> Option<Self> {
        let step_size = settings.step_size.max(1);
        let steps = u32::from(start.abs_diff(target) / step_size);
        if steps == 0 {
            return None;
        }
        Some(Self {
            start,
            target,
            steps,
            step_time: settings.duration_for(target) / steps,
            step_size,
        })
    }

    fn ascending(&self) -> bool {
        self.target > self.start
    }

    /// Value sent at step `i` (`0..=steps`), clamped to the 7-bit range.
    pub fn value_at(&self, i: u32) -> u8 {
        let delta = i64::from(i) * i64::from(self.step_size);
        let delta = if self.ascending() { delta } else { -delta };
        (i64::from(self.start) + delta).clamp(0, i64::from(CC_MAX)) as u8
    }

    /// Every stepped value, in send order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=self.steps).map(|i| self.value_at(i))
    }

    /// Wall time of the full ramp: one pause after each of `steps + 1` sends.
    pub fn total_time(&self) -> Duration {
        self.step_time * (self.steps + 1)
    }
}

/// How a ramp task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// The ramp ran to the end and the record now holds `value`.
    Completed { value: u8 },
    /// Distance below one step: `value` was sent once.
    Immediate { value: u8 },
    /// A newer fade took the record over; `last_sent` is this task's final
    /// write, if any.
    Superseded { last_sent: Option<u8> },
}

/// Current and target value of one Fade Record.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeState {
    pub current: u8,
    pub target: u8,
}

/// Mutable per-tag fade state, shared between the controller and its ramps.
#[derive(Debug, Default)]
pub(crate) struct FadeRecord {
    current: AtomicU8,
    target: AtomicU8,
    generation: AtomicU64,
}

impl FadeRecord {
    /// Publish a new target. Returns the generation that now owns the record.
    fn retarget(&self, target: u8) -> u64 {
        self.target.store(target, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn owned_by(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn current(&self) -> u8 {
        self.current.load(Ordering::Acquire)
    }

    pub(crate) fn set_current(&self, value: u8) {
        self.current.store(value, Ordering::Release);
    }

    fn state(&self) -> FadeState {
        FadeState {
            current: self.current(),
            target: self.target.load(Ordering::Acquire),
        }
    }
}

/// Owns every Fade Record and launches ramp tasks against a [`CcSink`].
///
/// Records are created lazily and live as long as the controller.
pub struct FadeController {
    sink: Arc<dyn CcSink>,
    settings: FadeSettings,
    records: DashMap<FadeKey, Arc<FadeRecord>>,
}

impl FadeController {
    pub fn new(sink: Arc<dyn CcSink>) -> Self {
        Self::with_settings(sink, FadeSettings::default())
    }

    pub fn with_settings(sink: Arc<dyn CcSink>, settings: FadeSettings) -> Self {
        Self {
            sink,
            settings,
            records: DashMap::new(),
        }
    }

    /// Ramp the CC behind `key` towards `target` on a detached task.
    ///
    /// The new target supersedes any ramp already running for `key` before
    /// this returns. Must be called within a tokio runtime. Dropping the
    /// returned handle leaves the ramp running.
    pub fn start_fade(&self, key: FadeKey, cc: u8, target: u8) -> JoinHandle<FadeOutcome> {
        let target = target.min(CC_MAX);
        let record = self.record(&key);
        let generation = record.retarget(target);
        debug!(%key, cc, target, generation, "fade: start");

        let ramp = Ramp {
            key,
            cc,
            target,
            generation,
            record,
            sink: Arc::clone(&self.sink),
            settings: self.settings,
        };
        tokio::spawn(ramp.run())
    }

    /// Current and target value of `key`, if it ever faded.
    pub fn state(&self, key: &FadeKey) -> Option<FadeState> {
        self.records.get(key).map(|r| r.state())
    }

    /// State of every record.
    pub fn snapshot(&self) -> BTreeMap<FadeKey, FadeState> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().state()))
            .collect()
    }

    pub(crate) fn record(&self, key: &FadeKey) -> Arc<FadeRecord> {
        let record = self.records.entry(key.clone()).or_default();
        Arc::clone(record.value())
    }
}

/// One ramp task's view of its record.
struct Ramp {
    key: FadeKey,
    cc: u8,
    target: u8,
    generation: u64,
    record: Arc<FadeRecord>,
    sink: Arc<dyn CcSink>,
    settings: FadeSettings,
}

impl Ramp {
    async fn run(self) -> FadeOutcome {
        let start = self.record.current();

        let Some(plan) = FadePlan::new(start, self.target, &self.settings) else {
            if !self.owns_record() {
                return FadeOutcome::Superseded { last_sent: None };
            }
            self.emit(self.target);
            debug!(key = %self.key, cc = self.cc, value = self.target, "fade: immediate");
            return FadeOutcome::Immediate { value: self.target };
        };

        trace!(
            key = %self.key,
            from = start,
            to = self.target,
            steps = plan.steps,
            duration = ?plan.total_time(),
            "fade: planned"
        );
        let mut last_sent = None;
        for value in plan.values() {
            if !self.owns_record() {
                return FadeOutcome::Superseded { last_sent };
            }
            self.emit(value);
            last_sent = Some(value);
            tokio::time::sleep(plan.step_time).await;
        }

        if !self.owns_record() {
            return FadeOutcome::Superseded { last_sent };
        }
        // Step rounding can stop short of the target (126 vs 127).
        if last_sent != Some(self.target) {
            self.emit(self.target);
        }
        self.record.set_current(self.target);
        debug!(key = %self.key, cc = self.cc, value = self.target, steps = plan.steps, "fade: complete");
        FadeOutcome::Completed { value: self.target }
    }

    fn owns_record(&self) -> bool {
        let owned = self.record.owned_by(self.generation);
        if !owned {
            debug!(key = %self.key, cc = self.cc, target = self.target, "fade: superseded");
        }
        owned
    }

    fn emit(&self, value: u8) {
        self.sink.send(self.cc, value);
        self.record.set_current(value);
        trace!(key = %self.key, cc = self.cc, value, "fade: step");
    }
}
