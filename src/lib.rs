//! routedrill - fuzzy route-area lookup and spaced-review drills for couriers
//!
//! Maps noisy spoken or typed street names to the delivery zone they belong
//! to, splits continuous transcripts into several street matches, and
//! schedules which streets need drilling next.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod book;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod import;
pub mod library;
pub mod matching;
pub mod phonetic;
pub mod record;
pub mod review;
pub mod store;
pub mod transcript;

// Engine
pub use matching::{MatchResult, Matcher, Segment, Segmenter};
pub use phonetic::{HomophoneTable, Normalized, Normalizer, Transliterator};
pub use review::{
    IntervalTable, QuizBuilder, QuizMode, QuizQuestion, ReviewOutcome, ReviewScheduler,
};

// Records and storage
pub use book::RouteBook;
pub use record::{AddressRecord, NewRecord};
pub use store::{JsonFileStore, MemoryStore, RecordStore};

// Glue
pub use import::{ImportRow, ImportSummary};
pub use library::{LibraryFilter, LibraryStats, ZoneGroup};
pub use transcript::{ListenMode, Routed, TranscriptEvent, TranscriptRouter};

// Error handling
pub use error::{Result, RouteDrillError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
