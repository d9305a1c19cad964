//! Fuzzy lookup of address records from noisy text.

pub mod scorer;
pub mod search;
pub mod segmenter;

pub use scorer::{Candidate, score, score_record};
pub use search::{MatchResult, Matcher};
pub use segmenter::{Segment, Segmenter};
