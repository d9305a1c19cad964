//! Spaced-repetition scheduling with a mistake-pool side track.
//!
//! Each record moves along two independent axes:
//!
//! - **Review stage** `0..=N`: every correct answer pushes the next review
//!   further out along the interval table; a wrong answer drops the record back
//!   to stage 0 and makes it due immediately.
//! - **Mistake pool**: a wrong answer puts the record in the pool; it leaves only
//!   after a streak of consecutive correct answers.
//!
//! There is no terminal state. A mastered record can always fall back in.

use crate::defaults::{DAY_MS, MISTAKE_GRADUATION_STREAK, REVIEW_INTERVALS_DAYS};
use crate::error::{Result, RouteDrillError};
use crate::record::AddressRecord;
use tracing::debug;

/// Review intervals in days, indexed by stage.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTable {
    days: Vec<f64>,
}

impl IntervalTable {
    /// Build a table; intervals must be non-empty, finite and positive.
    pub fn new(days: Vec<f64>) -> Result<Self> {
        if days.is_empty() {
            return Err(RouteDrillError::ConfigInvalidValue {
                key: "review.intervals_days".to_string(),
                message: "must contain at least one interval".to_string(),
            });
        }
        if let Some(bad) = days.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(RouteDrillError::ConfigInvalidValue {
                key: "review.intervals_days".to_string(),
                message: format!("intervals must be positive, got {bad}"),
            });
        }
        Ok(Self { days })
    }

    /// Number of stages, N. Review stages range over `0..=N`.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn max_stage(&self) -> u32 {
        self.days.len() as u32
    }

    /// Interval for a record currently at `stage`; stages past the end reuse the last entry.
    pub fn interval_ms(&self, stage: u32) -> i64 {
        let index = (stage as usize).min(self.days.len().saturating_sub(1));
        let days = self.days.get(index).copied().unwrap_or(1.0);
        (days * DAY_MS).round() as i64
    }

    pub fn days(&self) -> &[f64] {
        &self.days
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self {
            days: REVIEW_INTERVALS_DAYS.to_vec(),
        }
    }
}

/// What one answer did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub correct: bool,
    pub previous_stage: u32,
    pub stage: u32,
    pub next_review_time: i64,
    /// The record joined the mistake pool with this answer.
    pub entered_pool: bool,
    /// The record left the mistake pool with this answer.
    pub graduated: bool,
}

/// Applies answers to records and answers "what is due".
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewScheduler {
    intervals: IntervalTable,
    graduation_streak: u32,
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self::new(IntervalTable::default(), MISTAKE_GRADUATION_STREAK)
    }
}

impl ReviewScheduler {
    /// `graduation_streak` of 0 is treated as 1.
    pub fn new(intervals: IntervalTable, graduation_streak: u32) -> Self {
        Self {
            intervals,
            graduation_streak: graduation_streak.max(1),
        }
    }

    pub fn intervals(&self) -> &IntervalTable {
        &self.intervals
    }

    pub fn graduation_streak(&self) -> u32 {
        self.graduation_streak
    }

    /// Record one quiz answer at time `now` (epoch ms).
    pub fn process_result(
        &self,
        record: &mut AddressRecord,
        is_correct: bool,
        now: i64,
    ) -> ReviewOutcome {
        let max_stage = self.intervals.max_stage();
        let previous_stage = record.review_stage.min(max_stage);
        let was_in_pool = record.is_in_mistake_pool;
        let mut graduated = false;

        if is_correct {
            record.review_stage = (previous_stage + 1).min(max_stage);
            let interval = self.intervals.interval_ms(previous_stage);
            record.next_review_time = now.saturating_add(interval);

            if record.is_in_mistake_pool {
                record.mistake_streak = record.mistake_streak.saturating_add(1);
                if record.mistake_streak >= self.graduation_streak {
                    record.is_in_mistake_pool = false;
                    record.mistake_streak = 0;
                    graduated = true;
                }
            }
        } else {
            record.failure_count = record.failure_count.saturating_add(1);
            record.review_stage = 0;
            record.next_review_time = now;
            record.is_in_mistake_pool = true;
            record.mistake_streak = 0;
        }
        record.last_review_time = now;

        let outcome = ReviewOutcome {
            correct: is_correct,
            previous_stage,
            stage: record.review_stage,
            next_review_time: record.next_review_time,
            entered_pool: !was_in_pool && record.is_in_mistake_pool,
            graduated,
        };
        debug!(
            id = %record.id,
            correct = is_correct,
            stage = outcome.stage,
            streak = record.mistake_streak,
            graduated,
            "review result applied"
        );
        outcome
    }

    /// Whether `record` should be reviewed at `now`.
    ///
    /// Records that have failed before but were never scheduled (data from
    /// before scheduling existed) count as due.
    pub fn is_due(&self, record: &AddressRecord, now: i64) -> bool {
        if record.next_review_time > 0 {
            record.next_review_time <= now
        } else {
            record.failure_count > 0
        }
    }

    pub fn due_for_review<'r>(
        &self,
        records: &'r [AddressRecord],
        now: i64,
    ) -> Vec<&'r AddressRecord> {
        records.iter().filter(|r| self.is_due(r, now)).collect()
    }

    pub fn mistake_pool<'r>(&self, records: &'r [AddressRecord]) -> Vec<&'r AddressRecord> {
        records.iter().filter(|r| r.is_in_mistake_pool).collect()
    }
}
