//! Phonetic normalization of spoken or typed address text.

pub mod homophones;
pub mod normalizer;

pub use homophones::{DEFAULT_HOMOPHONES, HomophoneTable};
pub use normalizer::{
    Normalized, Normalizer, PinyinTransliterator, TableTransliterator, Transliterator,
    sanitize_key,
};

/// The single character every whitespace/punctuation run collapses to.
pub const SEPARATOR: char = ' ';

/// Full-width and CJK punctuation produced by Chinese speech recognisers.
const CJK_PUNCTUATION: &[char] = &[
    '。', '，', '、', '；', '：', '？', '！', '“', '”', '‘', '’', '（', '）', '《', '》', '【',
    '】', '…', '—', '·', '～', '「', '」',
];

/// Whether `c` is whitespace or punctuation, i.e. a natural segment boundary.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || CJK_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_cover_ascii_and_cjk_punctuation() {
        for c in [' ', '\t', '\n', ',', '.', '-', '。', '，', '！', '\u{3000}'] {
            assert!(is_separator(c), "{c:?} should be a separator");
        }
    }

    #[test]
    fn address_characters_are_not_separators() {
        for c in ['路', '1', 'a', '区', '①'] {
            assert!(!is_separator(c), "{c:?} should not be a separator");
        }
    }
}
