//! Homophone and mis-transcription table.
//!
//! Speech recognisers routinely emit a same-sounding character instead of the
//! one on the street sign (陆 for 路, 山 for 三). The table maps each such
//! variant back to the character a courier actually means.

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Built-in substitutions: digits, directionals and address-suffix words.
///
/// ASCII digits fold one at a time, so `101` reads as 一零一 the way it is
/// spoken in a unit number.
pub const DEFAULT_HOMOPHONES: &[(char, &[&str])] = &[
    // Address suffixes
    ('路', &["陆", "鹿", "录", "露", "麓"]),
    ('街', &["杰", "洁", "节", "阶", "界"]),
    ('巷', &["项", "像", "向", "象"]),
    ('弄', &["龙", "农", "拢"]),
    ('道', &["到", "稻", "导", "盗"]),
    ('楼', &["搂", "喽", "娄", "篓"]),
    ('幢', &["撞", "栋", "壮", "状"]),
    ('室', &["是", "市", "式", "适"]),
    ('号', &["浩", "好", "豪", "耗"]),
    ('苑', &["院", "园", "源", "员"]),
    ('桥', &["乔", "俏", "巧"]),
    ('区', &["去", "曲", "趋"]),
    // Directionals
    ('东', &["冬", "咚", "董"]),
    ('西', &["溪", "希", "息", "吸"]),
    ('南', &["男", "难", "楠"]),
    ('北', &["被", "贝", "背", "备"]),
    ('中', &["钟", "终", "忠"]),
    // Digits
    ('一', &["幺", "1", "伊", "衣"]),
    ('二', &["两", "2", "儿", "尔"]),
    ('三', &["山", "3", "散", "伞"]),
    ('四', &["4", "司", "死", "丝"]),
    ('五', &["5", "舞", "武", "午", "伍"]),
    ('六', &["6", "溜", "留", "刘"]),
    ('七', &["7", "期", "齐", "气", "妻"]),
    ('八', &["8", "发", "巴", "拔"]),
    ('九', &["9", "久", "酒", "玖"]),
    ('十', &["石", "实", "时", "拾"]),
    ('零', &["0", "林", "灵", "铃"]),
];

/// Immutable many-to-one substitution table.
///
/// Construction enforces two rules that keep normalization idempotent: a
/// variant may not contain any canonical character, and each variant maps to
/// exactly one canonical character (the first entry claiming it wins).
#[derive(Debug, Clone)]
pub struct HomophoneTable {
    /// Variants grouped by first character, longest first.
    by_first: HashMap<char, Vec<(Vec<char>, char)>>,
    canonicals: HashSet<char>,
}

impl HomophoneTable {
    pub fn new(entries: &[(char, &[&str])]) -> Self {
        let canonicals: HashSet<char> = entries.iter().map(|(c, _)| *c).collect();
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut by_first: HashMap<char, Vec<(Vec<char>, char)>> = HashMap::new();

        for (canonical, variants) in entries {
            for variant in variants.iter().copied() {
                if variant.is_empty()
                    || variant
                        .chars()
                        .any(|c| canonicals.contains(&c) || super::is_separator(c))
                {
                    debug!(variant, %canonical, "dropping variant that overlaps canonical text");
                    continue;
                }
                if !claimed.insert(variant) {
                    debug!(variant, %canonical, "dropping duplicate homophone variant");
                    continue;
                }
                let chars: Vec<char> = variant.chars().collect();
                by_first.entry(chars[0]).or_default().push((chars, *canonical));
            }
        }

        for list in by_first.values_mut() {
            list.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }

        Self {
            by_first,
            canonicals,
        }
    }

    /// A table that substitutes nothing.
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// Find the longest variant starting at `input[0]`.
    ///
    /// Returns the canonical character and how many input characters it covers.
    pub fn lookup(&self, input: &[char]) -> Option<(char, usize)> {
        let first = input.first()?;
        self.by_first.get(first)?.iter().find_map(|(variant, canonical)| {
            input
                .starts_with(variant)
                .then_some((*canonical, variant.len()))
        })
    }

    pub fn is_canonical(&self, c: char) -> bool {
        self.canonicals.contains(&c)
    }

    /// Number of accepted variants.
    pub fn len(&self) -> usize {
        self.by_first.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HomophoneTable {
    fn default() -> Self {
        Self::new(DEFAULT_HOMOPHONES)
    }
}
