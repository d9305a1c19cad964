//! Address records: the street → route-area facts being drilled.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated record ids.
const ID_LEN: usize = 9;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One street (or building) and the delivery zone it belongs to, plus its
/// review state.
///
/// Field names serialize in camelCase so stores written by earlier versions of
/// the tool load unchanged. Review fields missing from stored data default to
/// their "never reviewed" values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub id: String,
    pub street_name: String,
    /// The zone label; this is the answer in a quiz.
    pub route_area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Precomputed phonetic key for `street_name`.
    #[serde(default, rename = "pinyin")]
    pub canonical_pinyin: String,
    #[serde(default)]
    pub created_at: i64,

    /// Lifetime count of wrong answers.
    #[serde(default)]
    pub failure_count: u32,
    /// Position in the interval table, `0..=N`.
    #[serde(default)]
    pub review_stage: u32,
    /// Epoch ms when the record is next due; 0 means never scheduled.
    #[serde(default)]
    pub next_review_time: i64,
    #[serde(default)]
    pub last_review_time: i64,
    #[serde(default)]
    pub is_in_mistake_pool: bool,
    /// Consecutive correct answers since entering the mistake pool.
    #[serde(default)]
    pub mistake_streak: u32,
}

/// Fields supplied when creating a record by hand or by import.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewRecord {
    pub street_name: String,
    pub route_area: String,
    pub company_name: Option<String>,
    /// Explicit phonetic key; computed from `street_name` when `None`.
    pub pinyin: Option<String>,
}

impl NewRecord {
    pub fn new(street_name: impl Into<String>, route_area: impl Into<String>) -> Self {
        Self {
            street_name: street_name.into(),
            route_area: route_area.into(),
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }
}

impl AddressRecord {
    /// Create a fresh, never-reviewed record with the given id and phonetic key.
    pub fn create(id: String, new: NewRecord, canonical_pinyin: String, now: i64) -> Self {
        Self {
            id,
            street_name: new.street_name,
            route_area: new.route_area,
            company_name: new.company_name.filter(|c| !c.trim().is_empty()),
            canonical_pinyin,
            created_at: now,
            failure_count: 0,
            review_stage: 0,
            next_review_time: 0,
            last_review_time: 0,
            is_in_mistake_pool: false,
            mistake_streak: 0,
        }
    }

    /// Whether the record has ever been scheduled by the review engine.
    pub fn is_scheduled(&self) -> bool {
        self.next_review_time > 0
    }
}

/// Generate an opaque record id of nine base-36 characters.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
