//! The route book: single owner of the record store.
//!
//! Every scheduler mutation goes through [`RouteBook::process_result`], which
//! does its read-modify-write of one record under the store lock, so two
//! answers for the same record never interleave. Lookups clone a snapshot under
//! the lock and compute after releasing it.

use crate::config::Config;
use crate::defaults::{MAX_SEARCH_RESULTS, SEARCH_FLOOR};
use crate::error::{Result, RouteDrillError};
use crate::import::{ImportRow, ImportSummary, merge_rows, write_csv};
use crate::library::{self, LibraryFilter, LibraryStats, ZoneGroup};
use crate::matching::{MatchResult, Matcher, Segment, Segmenter};
use crate::phonetic::{Normalizer, sanitize_key};
use crate::record::{AddressRecord, NewRecord, generate_id};
use crate::review::{
    IntervalTable, QuizBuilder, QuizMode, QuizQuestion, ReviewOutcome, ReviewScheduler,
};
use crate::store::RecordStore;
use crate::transcript::{ListenMode, Routed, TranscriptEvent, TranscriptRouter};
use rand::Rng;
use std::io;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub struct RouteBook<S: RecordStore> {
    store: Mutex<S>,
    normalizer: Normalizer,
    scheduler: ReviewScheduler,
    floor: f64,
    max_results: usize,
}

impl<S: RecordStore> std::fmt::Debug for RouteBook<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteBook")
            .field("normalizer", &self.normalizer)
            .field("scheduler", &self.scheduler)
            .field("floor", &self.floor)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl<S: RecordStore> RouteBook<S> {
    pub fn new(store: S, normalizer: Normalizer, scheduler: ReviewScheduler) -> Self {
        Self {
            store: Mutex::new(store),
            normalizer,
            scheduler,
            floor: SEARCH_FLOOR,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    /// Book with the default normalizer and the search and review settings
    /// from `config`.
    pub fn from_config(store: S, config: &Config) -> Result<Self> {
        let intervals = IntervalTable::new(config.review.intervals_days.clone())?;
        let scheduler = ReviewScheduler::new(intervals, config.review.graduation_streak);
        Ok(Self::new(store, Normalizer::default(), scheduler)
            .with_search_limits(config.search.floor, config.search.max_results))
    }

    pub fn with_search_limits(mut self, floor: f64, max_results: usize) -> Self {
        self.floor = floor;
        self.max_results = max_results;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store
            .lock()
            .map_err(|_| RouteDrillError::StoreUnavailable {
                message: "record store lock poisoned".to_string(),
            })
    }

    /// Every record, as of one instant.
    pub fn snapshot(&self) -> Result<Vec<AddressRecord>> {
        self.lock()?.get_all()
    }

    pub fn get(&self, id: &str) -> Result<Option<AddressRecord>> {
        self.lock()?.get(id)
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.normalizer)
            .with_floor(self.floor)
            .with_max_results(self.max_results)
    }

    pub fn search(&self, query: &str) -> Result<Vec<MatchResult>> {
        let records = self.snapshot()?;
        Ok(self.matcher().search(query, &records))
    }

    pub fn segment(&self, transcript: &str) -> Result<Vec<Segment>> {
        let records = self.snapshot()?;
        Ok(Segmenter::new(&self.normalizer).segment(transcript, &records))
    }

    /// Route one recognizer event for display.
    pub fn route(&self, event: &TranscriptEvent, mode: ListenMode) -> Result<Routed> {
        let records = self.snapshot()?;
        let router = TranscriptRouter::new(&self.normalizer, mode).with_matcher(self.matcher());
        Ok(router.route(event, &records))
    }

    /// Create a record with a fresh id.
    pub fn add(&self, new: NewRecord, now: i64) -> Result<AddressRecord> {
        let key = match new.pinyin.as_deref().map(sanitize_key) {
            Some(key) if !key.is_empty() => key,
            _ => self.normalizer.normalize(&new.street_name).key,
        };
        let record = AddressRecord::create(generate_id(&mut rand::rng()), new, key, now);
        self.lock()?.put(record.clone())?;
        info!(id = %record.id, street = %record.street_name, "added record");
        Ok(record)
    }

    /// Insert or replace a record as given.
    pub fn put(&self, record: AddressRecord) -> Result<()> {
        self.lock()?.put(record)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if self.lock()?.delete(id)? {
            info!(id, "deleted record");
            Ok(())
        } else {
            Err(RouteDrillError::RecordNotFound { id: id.to_string() })
        }
    }

    /// Apply one quiz answer to the stored record.
    ///
    /// An id no longer in the store (deleted mid-session) is not an error:
    /// nothing is written and `None` is returned.
    pub fn process_result(
        &self,
        id: &str,
        is_correct: bool,
        now: i64,
    ) -> Result<Option<ReviewOutcome>> {
        let mut store = self.lock()?;
        let Some(mut record) = store.get(id)? else {
            debug!(id, "answer for unknown record ignored");
            return Ok(None);
        };
        let outcome = self.scheduler.process_result(&mut record, is_correct, now);
        store.put(record)?;
        Ok(Some(outcome))
    }

    pub fn due(&self, now: i64) -> Result<Vec<AddressRecord>> {
        let records = self.snapshot()?;
        Ok(self
            .scheduler
            .due_for_review(&records, now)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn mistakes(&self) -> Result<Vec<AddressRecord>> {
        let records = self.snapshot()?;
        Ok(self
            .scheduler
            .mistake_pool(&records)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Questions for a session in `mode`, at most `count` of them.
    pub fn quiz<R: Rng>(
        &self,
        builder: &mut QuizBuilder<R>,
        mode: QuizMode,
        count: usize,
        now: i64,
    ) -> Result<Vec<QuizQuestion>> {
        let all = self.snapshot()?;
        let selected = builder.select_records(mode, &all, &self.scheduler, now, count);
        let questions = builder.build_questions(&selected, &all, count);
        debug!(%mode, questions = questions.len(), "built quiz");
        Ok(questions)
    }

    /// Upsert rows by street name in one store write.
    pub fn import(&self, rows: Vec<ImportRow>, now: i64) -> Result<ImportSummary> {
        let mut store = self.lock()?;
        let existing = store.get_all()?;
        let plan = merge_rows(&existing, rows, &self.normalizer, &mut rand::rng(), now);
        if !plan.records.is_empty() {
            store.put_many(plan.records)?;
        }
        Ok(plan.summary)
    }

    pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let records = self.snapshot()?;
        write_csv(writer, &records)
    }

    pub fn library(&self, filter: &LibraryFilter) -> Result<Vec<ZoneGroup>> {
        let records = self.snapshot()?;
        Ok(library::group_by_zone(&records, filter))
    }

    pub fn stats(&self, now: i64) -> Result<LibraryStats> {
        let records = self.snapshot()?;
        Ok(library::stats(&records, &self.scheduler, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, sample_records};
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn book() -> RouteBook<MemoryStore> {
        RouteBook::new(
            MemoryStore::new(sample_records(0)),
            Normalizer::default(),
            ReviewScheduler::default(),
        )
    }

    #[test]
    fn search_reads_current_records() {
        let book = book();
        let results = book.search("文三路").unwrap();
        assert_eq!(results[0].record.route_area, "西湖1区");
        assert_eq!(results[0].score, 100.0);
    }

    #[test]
    fn add_computes_key_and_is_searchable() {
        let book = book();
        let record = book.add(NewRecord::new("学院路", "西湖4区"), 10).unwrap();
        assert_eq!(record.canonical_pinyin, "xueyuanlu");
        assert_eq!(book.search("学院路").unwrap()[0].record.id, record.id);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let book = book();
        book.delete("1").unwrap();
        let err = book.delete("1").unwrap_err();
        assert!(matches!(err, RouteDrillError::RecordNotFound { .. }), "got {err}");
    }

    #[test]
    fn process_result_persists_outcome() {
        let book = book();
        let outcome = book.process_result("3", false, 500).unwrap().unwrap();
        assert!(outcome.entered_pool);

        let stored = book.get("3").unwrap().unwrap();
        assert_eq!(stored.failure_count, 1);
        assert!(stored.is_in_mistake_pool);
        assert_eq!(book.due(500).unwrap().len(), 1);
        assert_eq!(book.mistakes().unwrap()[0].id, "3");
    }

    #[test]
    fn process_result_for_deleted_record_is_ignored() {
        let book = book();
        book.delete("2").unwrap();
        assert_eq!(book.process_result("2", true, 1).unwrap(), None);
        assert!(book.get("2").unwrap().is_none(), "nothing is resurrected");
    }

    #[test]
    fn concurrent_answers_for_one_record_all_apply() {
        let book = book();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..10 {
                        book.process_result("1", false, 1_000).unwrap();
                    }
                });
            }
        });
        assert_eq!(book.get("1").unwrap().unwrap().failure_count, 80);
    }

    #[test]
    fn poisoned_lock_reports_store_unavailable() {
        let book = book();
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = book.store.lock().unwrap();
            panic!("poison");
        }));
        let err = book.search("文三路").unwrap_err();
        assert!(matches!(err, RouteDrillError::StoreUnavailable { .. }), "got {err}");
    }

    #[test]
    fn import_upserts_in_one_pass() {
        let book = book();
        let summary = book
            .import(
                vec![
                    ImportRow::new("文三路", "西湖9区"),
                    ImportRow::new("学院路", "西湖4区"),
                ],
                7,
            )
            .unwrap();
        assert_eq!((summary.added, summary.updated), (1, 1));
        assert_eq!(book.snapshot().unwrap().len(), 9);
        assert_eq!(book.search("文三路").unwrap()[0].record.route_area, "西湖9区");
    }

    #[test]
    fn quiz_uses_mode_selection() {
        let book = book();
        let mut builder = QuizBuilder::seeded(4);
        assert!(book.quiz(&mut builder, QuizMode::Mistakes, 50, 0).unwrap().is_empty());

        book.process_result("5", false, 10).unwrap();
        let questions = book.quiz(&mut builder, QuizMode::Mistakes, 50, 10).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].record.street_name, "延安路");

        let random = book.quiz(&mut builder, QuizMode::Random, 5, 10).unwrap();
        assert_eq!(random.len(), 5);
    }

    #[test]
    fn route_uses_listen_mode() {
        let book = book();
        let routed = book
            .route(&TranscriptEvent::Final("文三路延安路".into()), ListenMode::Batch)
            .unwrap();
        let Routed::Segments(segments) = routed else {
            panic!("expected segments");
        };
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn stats_and_library_views() {
        let book = book();
        assert_eq!(book.stats(0).unwrap().total, 8);
        let groups = book.library(&LibraryFilter::default()).unwrap();
        assert_eq!(groups.len(), 8);
    }
}
