//! Text normalization: homophone folding plus a romanized phonetic key.

use super::homophones::HomophoneTable;
use super::{SEPARATOR, is_separator};
use pinyin::ToPinyin;
use std::collections::HashMap;

/// Maps one character to its romanized syllable.
///
/// Returning `None` makes the normalizer pass the character through as-is.
pub trait Transliterator: Send + Sync {
    fn syllable(&self, c: char) -> Option<&str>;
}

/// Toneless Mandarin pinyin from the `pinyin` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinTransliterator;

impl Transliterator for PinyinTransliterator {
    fn syllable(&self, c: char) -> Option<&str> {
        c.to_pinyin().map(|p| p.plain())
    }
}

/// Fixed lookup transliterator, mainly for tests with tiny alphabets.
#[derive(Debug, Clone, Default)]
pub struct TableTransliterator {
    syllables: HashMap<char, String>,
}

impl TableTransliterator {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            syllables: entries.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }
}

impl Transliterator for TableTransliterator {
    fn syllable(&self, c: char) -> Option<&str> {
        self.syllables.get(&c).map(String::as_str)
    }
}

/// Canonical text and phonetic key for one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    /// Input after homophone folding and separator collapsing.
    pub canonical: String,
    /// Flat lowercase romanization of `canonical`, no separators.
    pub key: String,
}

/// Normalizer over an injected homophone table and transliterator.
pub struct Normalizer {
    table: HomophoneTable,
    transliterator: Box<dyn Transliterator>,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("variants", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(HomophoneTable::default(), PinyinTransliterator)
    }
}

impl Normalizer {
    pub fn new(table: HomophoneTable, transliterator: impl Transliterator + 'static) -> Self {
        Self {
            table,
            transliterator: Box::new(transliterator),
        }
    }

    pub fn table(&self) -> &HomophoneTable {
        &self.table
    }

    /// Fold homophones and collapse separator runs in one left-to-right pass.
    pub fn canonicalize(&self, text: &str) -> String {
        let input: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < input.len() {
            let c = input[i];
            if is_separator(c) {
                if !out.ends_with(SEPARATOR) {
                    out.push(SEPARATOR);
                }
                i += 1;
            } else if let Some((canonical, consumed)) = self.table.lookup(&input[i..]) {
                out.push(canonical);
                i += consumed;
            } else {
                out.push(c);
                i += 1;
            }
        }
        out
    }

    /// Append the phonetic key piece for one canonical character.
    ///
    /// Separators contribute nothing.
    pub fn push_key(&self, c: char, out: &mut String) {
        if is_separator(c) {
            return;
        }
        match self.transliterator.syllable(c) {
            Some(syllable) => out.extend(syllable.chars().flat_map(char::to_lowercase)),
            None => out.extend(c.to_lowercase()),
        }
    }

    /// Phonetic key of already-canonical text.
    pub fn phonetic_key(&self, canonical: &str) -> String {
        let mut key = String::with_capacity(canonical.len() * 3);
        for c in canonical.chars() {
            self.push_key(c, &mut key);
        }
        key
    }

    pub fn normalize(&self, text: &str) -> Normalized {
        let canonical = self.canonicalize(text);
        let key = self.phonetic_key(&canonical);
        Normalized { canonical, key }
    }
}

/// Clean a stored or imported phonetic key: drop whitespace, lowercase.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
