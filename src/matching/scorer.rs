//! Confidence scoring between a query and one address record.
//!
//! Rules are checked in priority order and the first one that applies decides
//! the score; scores are never summed.

use crate::phonetic::{Normalized, Normalizer, SEPARATOR, sanitize_key};
use crate::record::AddressRecord;

/// Score for identical canonical text.
pub const EXACT_SCORE: f64 = 100.0;
/// Score for identical phonetic keys.
pub const PHONETIC_SCORE: f64 = 95.0;
/// Lower bound of the substring band; the overlap ratio adds up to `SUBSTRING_SPAN`.
pub const SUBSTRING_BASE: f64 = 80.0;
pub const SUBSTRING_SPAN: f64 = 10.0;
/// Lower bound of the edit-distance band.
pub const FUZZY_BASE: f64 = 70.0;
pub const FUZZY_SPAN: f64 = 20.0;
/// Key similarity must exceed this for the edit-distance rule to apply.
pub const FUZZY_MIN_SIMILARITY: f64 = 0.8;

/// A record's precomputed match material.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Canonical street name, separators trimmed from both ends.
    pub canonical: String,
    /// Length of `canonical` in characters.
    pub len: usize,
    pub key: String,
    /// Length of `key` in characters.
    pub key_len: usize,
}

impl Candidate {
    /// Build from a record, preferring its stored phonetic key.
    pub fn from_record(record: &AddressRecord, normalizer: &Normalizer) -> Self {
        let canonical = normalizer
            .canonicalize(&record.street_name)
            .trim_matches(SEPARATOR)
            .to_string();
        let stored = sanitize_key(&record.canonical_pinyin);
        let key = if stored.is_empty() {
            normalizer.phonetic_key(&canonical)
        } else {
            stored
        };
        Self {
            len: canonical.chars().count(),
            key_len: key.chars().count(),
            canonical,
            key,
        }
    }
}

/// Normalize a free-text query the way candidates are normalized.
pub fn normalize_query(normalizer: &Normalizer, query: &str) -> Normalized {
    let canonical = normalizer
        .canonicalize(query)
        .trim_matches(SEPARATOR)
        .to_string();
    let key = normalizer.phonetic_key(&canonical);
    Normalized { canonical, key }
}

/// `1 - distance / longer length` over Unicode code points.
pub fn similarity_from_distance(distance: usize, a_len: usize, b_len: usize) -> f64 {
    let longest = a_len.max(b_len);
    if longest == 0 {
        return 0.0;
    }
    1.0 - distance as f64 / longest as f64
}

/// Levenshtein similarity of two phonetic keys, case-insensitive.
pub fn key_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let distance = strsim::levenshtein(&a, &b);
    similarity_from_distance(distance, a.chars().count(), b.chars().count())
}

/// Score a normalized query against a candidate, in `[0, 100]`.
pub fn score(query: &Normalized, candidate: &Candidate) -> f64 {
    if query.canonical.is_empty() || candidate.canonical.is_empty() {
        return 0.0;
    }

    if query.canonical == candidate.canonical {
        return EXACT_SCORE;
    }

    if candidate.canonical.contains(&query.canonical)
        || query.canonical.contains(&candidate.canonical)
    {
        let query_len = query.canonical.chars().count();
        let shorter = query_len.min(candidate.len) as f64;
        let longer = query_len.max(candidate.len) as f64;
        return SUBSTRING_BASE + SUBSTRING_SPAN * (shorter / longer);
    }

    if !query.key.is_empty() && query.key.eq_ignore_ascii_case(&candidate.key) {
        return PHONETIC_SCORE;
    }

    let similarity = key_similarity(&query.key, &candidate.key);
    if similarity > FUZZY_MIN_SIMILARITY {
        FUZZY_BASE + similarity * FUZZY_SPAN
    } else {
        0.0
    }
}

/// Score raw query text against a record.
pub fn score_record(normalizer: &Normalizer, query: &str, record: &AddressRecord) -> f64 {
    score(
        &normalize_query(normalizer, query),
        &Candidate::from_record(record, normalizer),
    )
}
