//! Spaced review: scheduling and quiz sessions.

pub mod quiz;
pub mod scheduler;

pub use quiz::{QuizBuilder, QuizMode, QuizQuestion, SessionTally};
pub use scheduler::{IntervalTable, ReviewOutcome, ReviewScheduler};
