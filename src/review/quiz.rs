//! Multiple-choice quiz construction.

use super::scheduler::ReviewScheduler;
use crate::defaults::{PLACEHOLDER_ZONE_PREFIX, QUIZ_OPTION_COUNT};
use crate::record::AddressRecord;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// One question: which zone does this street belong to?
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuestion {
    pub record: AddressRecord,
    /// Exactly four labels in random order, one of them `record.route_area`.
    pub options: Vec<String>,
}

impl QuizQuestion {
    pub fn correct_answer(&self) -> &str {
        &self.record.route_area
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.record.route_area
    }

    /// Position of the correct label in `options`.
    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| self.is_correct(o))
    }
}

/// Which records a session drills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// A random sample of the whole library.
    #[default]
    Random,
    /// Records whose review time has come.
    Due,
    /// Records in the mistake pool.
    Mistakes,
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Random => write!(f, "random"),
            QuizMode::Due => write!(f, "due"),
            QuizMode::Mistakes => write!(f, "mistakes"),
        }
    }
}

impl FromStr for QuizMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(QuizMode::Random),
            "due" | "review" => Ok(QuizMode::Due),
            "mistakes" | "mistake" => Ok(QuizMode::Mistakes),
            other => Err(format!(
                "unknown quiz mode '{other}' (expected random, due or mistakes)"
            )),
        }
    }
}

/// Builds questions with distractors drawn from an injected random source.
#[derive(Debug)]
pub struct QuizBuilder<R: Rng> {
    rng: R,
}

impl QuizBuilder<StdRng> {
    /// Reproducible builder.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> QuizBuilder<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick the records a session in `mode` should ask about.
    ///
    /// Random mode samples at most `count` records without replacement; the due
    /// and mistake modes return their whole set.
    pub fn select_records(
        &mut self,
        mode: QuizMode,
        all: &[AddressRecord],
        scheduler: &ReviewScheduler,
        now: i64,
        count: usize,
    ) -> Vec<AddressRecord> {
        match mode {
            QuizMode::Random => {
                let mut sample = all.to_vec();
                sample.shuffle(&mut self.rng);
                sample.truncate(count);
                sample
            }
            QuizMode::Due => scheduler
                .due_for_review(all, now)
                .into_iter()
                .cloned()
                .collect(),
            QuizMode::Mistakes => scheduler.mistake_pool(all).into_iter().cloned().collect(),
        }
    }

    /// One question for each of the first `count` records.
    ///
    /// Distractors are other zone labels found in `all`. When fewer than three
    /// exist, numbered placeholder labels fill the gap.
    pub fn build_questions(
        &mut self,
        records: &[AddressRecord],
        all: &[AddressRecord],
        count: usize,
    ) -> Vec<QuizQuestion> {
        let mut seen = HashSet::new();
        let zones: Vec<&str> = all
            .iter()
            .map(|r| r.route_area.as_str())
            .filter(|z| seen.insert(*z))
            .collect();

        records
            .iter()
            .take(count)
            .map(|record| {
                let options = self.options_for(&record.route_area, &zones, &seen);
                QuizQuestion {
                    record: record.clone(),
                    options,
                }
            })
            .collect()
    }

    fn options_for(&mut self, correct: &str, zones: &[&str], known: &HashSet<&str>) -> Vec<String> {
        let mut alternatives: Vec<&str> = zones.iter().copied().filter(|z| *z != correct).collect();
        alternatives.shuffle(&mut self.rng);

        let mut options: Vec<String> = Vec::with_capacity(QUIZ_OPTION_COUNT);
        options.push(correct.to_string());
        options.extend(
            alternatives
                .into_iter()
                .take(QUIZ_OPTION_COUNT - 1)
                .map(str::to_string),
        );

        let mut counter = 1;
        while options.len() < QUIZ_OPTION_COUNT {
            let label = format!("{PLACEHOLDER_ZONE_PREFIX} {counter}");
            counter += 1;
            if known.contains(label.as_str()) || options.contains(&label) {
                continue;
            }
            options.push(label);
        }

        options.shuffle(&mut self.rng);
        options
    }
}

/// Running score for one quiz session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTally {
    pub total: usize,
    pub correct: usize,
    /// Records answered wrongly, in answer order.
    pub wrong: Vec<AddressRecord>,
}

impl SessionTally {
    /// Count an answer and report whether it was right.
    pub fn record_answer(&mut self, question: &QuizQuestion, choice: &str) -> bool {
        let is_correct = question.is_correct(choice);
        self.total += 1;
        if is_correct {
            self.correct += 1;
        } else {
            self.wrong.push(question.record.clone());
        }
        is_correct
    }

    /// Share of correct answers, rounded to a whole percent.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}
