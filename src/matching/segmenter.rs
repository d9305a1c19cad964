//! Continuous-transcript segmentation.
//!
//! A courier reading a stack of parcels aloud produces one long utterance
//! ("文三路文一西路延安路..."). The segmenter walks the normalized transcript
//! left to right and carves it into spans, each either resolved to one record
//! or left unmatched.
//!
//! At every cursor position windows are tried longest first. An exact canonical
//! name match is taken immediately; otherwise the best phonetic near-miss across
//! all windows is taken. Nothing is ever revisited, so the cost is bounded by
//! `transcript length × window count × candidates per window length`.

use super::scorer::{Candidate, similarity_from_distance};
use crate::phonetic::{Normalizer, is_separator};
use crate::record::AddressRecord;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Shortest window ever tried.
const MIN_WINDOW: usize = 2;

/// Allowed name-length difference between a window and a fuzzy candidate.
const MAX_LENGTH_SLACK: usize = 2;

/// One span of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// The span text, as normalized.
    pub text: String,
    /// The record this span resolved to, if any.
    pub record: Option<AddressRecord>,
}

impl Segment {
    pub fn is_match(&self) -> bool {
        self.record.is_some()
    }
}

/// Phonetic edit budget for a name of `name_len` characters.
///
/// Two-character names only match exactly.
pub fn fuzzy_budget(name_len: usize) -> usize {
    match name_len {
        n if n >= 5 => 2,
        n if n >= 3 => 1,
        _ => 0,
    }
}

/// Candidates indexed for window lookups.
struct WindowIndex {
    candidates: Vec<(usize, Candidate)>,
    exact: HashMap<String, usize>,
    by_len: HashMap<usize, Vec<usize>>,
    min_window: usize,
    max_window: usize,
}

impl WindowIndex {
    fn build(records: &[AddressRecord], normalizer: &Normalizer) -> Self {
        let candidates: Vec<(usize, Candidate)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, Candidate::from_record(r, normalizer)))
            .filter(|(_, c)| c.len > 0)
            .collect();

        let mut exact = HashMap::new();
        let mut by_len: HashMap<usize, Vec<usize>> = HashMap::new();
        for (slot, (_, candidate)) in candidates.iter().enumerate() {
            exact.entry(candidate.canonical.clone()).or_insert(slot);
            by_len.entry(candidate.len).or_default().push(slot);
        }

        let shortest = candidates.iter().map(|(_, c)| c.len).min().unwrap_or(0);
        let longest = candidates.iter().map(|(_, c)| c.len).max().unwrap_or(0);

        Self {
            candidates,
            exact,
            by_len,
            min_window: shortest.max(MIN_WINDOW),
            max_window: longest,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FuzzyHit {
    slot: usize,
    window: usize,
    similarity: f64,
    name_len: usize,
}

/// Splits transcripts into record matches over an explicit record snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter<'a> {
    normalizer: &'a Normalizer,
}

impl<'a> Segmenter<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        Self { normalizer }
    }

    /// Segment `transcript` against `records`.
    ///
    /// Concatenating the returned `text` fields yields the canonicalized
    /// transcript. Consecutive unmatched characters, separators included, are
    /// coalesced into one segment.
    pub fn segment(&self, transcript: &str, records: &[AddressRecord]) -> Vec<Segment> {
        let chars: Vec<char> = self.normalizer.canonicalize(transcript).chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let index = WindowIndex::build(records, self.normalizer);
        let syllables: Vec<String> = chars
            .iter()
            .map(|c| {
                let mut s = String::new();
                self.normalizer.push_key(*c, &mut s);
                s
            })
            .collect();

        let mut segments = Vec::new();
        let mut unmatched = String::new();
        let mut cursor = 0;

        while cursor < chars.len() {
            if !is_separator(chars[cursor])
                && let Some((slot, window)) = self.match_at(&index, &chars, &syllables, cursor)
            {
                if !unmatched.is_empty() {
                    segments.push(Segment {
                        text: std::mem::take(&mut unmatched),
                        record: None,
                    });
                }
                let record_index = index.candidates[slot].0;
                segments.push(Segment {
                    text: chars[cursor..cursor + window].iter().collect(),
                    record: Some(records[record_index].clone()),
                });
                cursor += window;
                continue;
            }
            unmatched.push(chars[cursor]);
            cursor += 1;
        }

        if !unmatched.is_empty() {
            segments.push(Segment {
                text: unmatched,
                record: None,
            });
        }

        debug!(
            chars = chars.len(),
            segments = segments.len(),
            matched = segments.iter().filter(|s| s.is_match()).count(),
            "segmented transcript"
        );
        segments
    }

    /// Find the record starting at `cursor`, returning (candidate slot, window length).
    fn match_at(
        &self,
        index: &WindowIndex,
        chars: &[char],
        syllables: &[String],
        cursor: usize,
    ) -> Option<(usize, usize)> {
        if index.max_window < index.min_window {
            return None;
        }

        let mut best: Option<FuzzyHit> = None;

        for window in (index.min_window..=index.max_window).rev() {
            let end = cursor + window;
            if end > chars.len() {
                continue;
            }
            let span = &chars[cursor..end];
            if span.iter().any(|c| is_separator(*c)) {
                continue;
            }

            let chunk: String = span.iter().collect();
            if let Some(&slot) = index.exact.get(&chunk) {
                return Some((slot, window));
            }

            let chunk_key = syllables[cursor..end].concat();
            let chunk_key_len = chunk_key.chars().count();
            let lengths = window.saturating_sub(MAX_LENGTH_SLACK)..=window + MAX_LENGTH_SLACK;

            for name_len in lengths {
                let budget = fuzzy_budget(name_len);
                if budget == 0 {
                    continue;
                }
                let Some(slots) = index.by_len.get(&name_len) else {
                    continue;
                };
                for &slot in slots {
                    let candidate = &index.candidates[slot].1;
                    if candidate.key_len.abs_diff(chunk_key_len) > budget {
                        continue;
                    }
                    let distance = strsim::levenshtein(&chunk_key, &candidate.key);
                    if distance > budget {
                        continue;
                    }
                    let similarity =
                        similarity_from_distance(distance, chunk_key_len, candidate.key_len);
                    let better = match best {
                        None => true,
                        Some(hit) if hit.window == window => {
                            similarity > hit.similarity
                                || (similarity == hit.similarity && name_len > hit.name_len)
                        }
                        Some(hit) => similarity > hit.similarity,
                    };
                    if better {
                        best = Some(FuzzyHit {
                            slot,
                            window,
                            similarity,
                            name_len,
                        });
                    }
                }
            }
        }

        best.map(|hit| (hit.slot, hit.window))
    }
}
