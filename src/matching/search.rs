//! Single-query lookup: rank every record against one query.

use super::scorer::{Candidate, normalize_query, score};
use crate::defaults::{MAX_SEARCH_RESULTS, SEARCH_FLOOR};
use crate::phonetic::Normalizer;
use crate::record::AddressRecord;
use serde::Serialize;

/// A record and how confidently it matches the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub record: AddressRecord,
    /// Confidence in `[0, 100]`.
    pub score: f64,
}

/// Ranks records against a query string.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    normalizer: &'a Normalizer,
    floor: f64,
    max_results: usize,
}

impl<'a> Matcher<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        Self {
            normalizer,
            floor: SEARCH_FLOOR,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    /// Scores at or below `floor` are not reported.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Best matches for `query`, highest confidence first.
    ///
    /// Equal scores keep the order of `records`. Blank queries match nothing.
    pub fn search(&self, query: &str, records: &[AddressRecord]) -> Vec<MatchResult> {
        let query = normalize_query(self.normalizer, query);
        if query.canonical.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let candidate = Candidate::from_record(record, self.normalizer);
                (i, score(&query, &candidate))
            })
            .filter(|(_, s)| *s > self.floor)
            .collect();

        // sort_by is stable, so ties stay in record order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.max_results);

        scored
            .into_iter()
            .map(|(i, score)| MatchResult {
                record: records[i].clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewRecord;

    fn records(entries: &[(&str, &str)]) -> Vec<AddressRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (name, zone))| {
                AddressRecord::create(i.to_string(), NewRecord::new(*name, *zone), String::new(), 0)
            })
            .collect()
    }

    #[test]
    fn empty_query_returns_nothing() {
        let normalizer = Normalizer::default();
        let all = records(&[("文三路", "西湖1区")]);
        assert!(Matcher::new(&normalizer).search("", &all).is_empty());
        assert!(Matcher::new(&normalizer).search("   ", &all).is_empty());
        assert!(Matcher::new(&normalizer).search("。，", &all).is_empty());
    }

    #[test]
    fn exact_name_ranks_first_with_full_score() {
        let normalizer = Normalizer::default();
        let all = records(&[("文一西路", "余杭5区"), ("文三路", "西湖1区")]);
        let results = Matcher::new(&normalizer).search("文三路", &all);
        assert_eq!(results[0].record.route_area, "西湖1区");
        assert_eq!(results[0].score, 100.0);
    }

    #[test]
    fn homophone_query_finds_same_record() {
        let normalizer = Normalizer::default();
        let all = records(&[("文三路", "西湖1区"), ("文一西路", "余杭5区")]);
        let results = Matcher::new(&normalizer).search("文三陆", &all);
        assert_eq!(results[0].record.route_area, "西湖1区");
        assert!(results[0].score >= 95.0);
    }

    #[test]
    fn results_sorted_descending_and_capped() {
        let normalizer = Normalizer::default();
        let all = records(&[
            ("延安路", "a"),
            ("延安路一段", "b"),
            ("延安路二段", "c"),
            ("延安路三段", "d"),
            ("延安路四段", "e"),
            ("延安路五段", "f"),
            ("延安路六段", "g"),
        ]);
        let results = Matcher::new(&normalizer).search("延安路", &all);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].record.route_area, "a");
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // Equal scores keep record order.
        let zones: Vec<&str> = results.iter().map(|r| r.record.route_area.as_str()).collect();
        assert_eq!(zones, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn unit_numbers_match_digit_by_digit() {
        let normalizer = Normalizer::default();
        let all = records(&[("101室", "a"), ("二十号", "b")]);
        let matcher = Matcher::new(&normalizer);

        let spoken = matcher.search("幺零幺室", &all);
        assert_eq!(spoken[0].record.route_area, "a");
        assert_eq!(spoken[0].score, 100.0);

        let typed = matcher.search("210号", &all);
        assert!(
            typed.iter().all(|r| r.record.street_name != "二十号"),
            "210号 must not match 二十号: {typed:?}"
        );
    }

    #[test]
    fn floor_excludes_weak_matches() {
        let normalizer = Normalizer::default();
        let all = records(&[("文三路", "西湖1区"), ("江南大道", "滨江1区")]);
        let results = Matcher::new(&normalizer).search("文三路", &all);
        assert_eq!(results.len(), 1);

        let strict = Matcher::new(&normalizer).with_floor(100.0).search("文三", &all);
        assert!(strict.is_empty());
    }

    #[test]
    fn max_results_is_configurable() {
        let normalizer = Normalizer::default();
        let all = records(&[("文三路", "a"), ("文三路东", "b")]);
        let results = Matcher::new(&normalizer)
            .with_max_results(1)
            .search("文三路", &all);
        assert_eq!(results.len(), 1);
    }
}
