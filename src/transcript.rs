//! Routing of speech-recognizer output to the matcher or the segmenter.
//!
//! Recognizers emit a stream of interim hypotheses followed by one final
//! transcript per utterance. Interim text is never authoritative: in batch
//! mode it is only shown back to the user, in single mode it may drive a live
//! search for display. Nothing here touches stored records.

use crate::matching::{MatchResult, Matcher, Segment, Segmenter};
use crate::phonetic::Normalizer;
use crate::record::AddressRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One event from a speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    Interim(String),
    Final(String),
}

impl TranscriptEvent {
    pub fn text(&self) -> &str {
        match self {
            TranscriptEvent::Interim(text) | TranscriptEvent::Final(text) => text,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, TranscriptEvent::Final(_))
    }
}

/// Whether an utterance names one street or a run of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenMode {
    #[default]
    Single,
    Batch,
}

impl fmt::Display for ListenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenMode::Single => write!(f, "single"),
            ListenMode::Batch => write!(f, "batch"),
        }
    }
}

impl FromStr for ListenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(ListenMode::Single),
            "batch" | "continuous" => Ok(ListenMode::Batch),
            other => Err(format!("unknown listen mode '{other}' (expected single or batch)")),
        }
    }
}

/// What the front end should show for an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Routed {
    /// Text to echo back while the user is still speaking.
    Preview(String),
    /// Ranked lookup results for a single-street query.
    Matches(Vec<MatchResult>),
    /// Segmented spans of a batch transcript.
    Segments(Vec<Segment>),
}

/// Maps recognizer events to lookups according to the listen mode.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptRouter<'a> {
    normalizer: &'a Normalizer,
    matcher: Matcher<'a>,
    mode: ListenMode,
    live_search: bool,
}

impl<'a> TranscriptRouter<'a> {
    pub fn new(normalizer: &'a Normalizer, mode: ListenMode) -> Self {
        Self {
            normalizer,
            matcher: Matcher::new(normalizer),
            mode,
            live_search: true,
        }
    }

    /// Replace the matcher used for single-mode lookups.
    pub fn with_matcher(mut self, matcher: Matcher<'a>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Whether interim text in single mode triggers a search.
    pub fn with_live_search(mut self, live_search: bool) -> Self {
        self.live_search = live_search;
        self
    }

    pub fn mode(&self) -> ListenMode {
        self.mode
    }

    pub fn route(&self, event: &TranscriptEvent, records: &[AddressRecord]) -> Routed {
        match (self.mode, event) {
            (ListenMode::Single, TranscriptEvent::Interim(text)) if self.live_search => {
                Routed::Matches(self.matcher.search(text, records))
            }
            (ListenMode::Single, TranscriptEvent::Final(text)) => {
                Routed::Matches(self.matcher.search(text, records))
            }
            (ListenMode::Batch, TranscriptEvent::Final(text)) => {
                Routed::Segments(Segmenter::new(self.normalizer).segment(text, records))
            }
            (_, TranscriptEvent::Interim(text)) => Routed::Preview(text.clone()),
        }
    }
}
