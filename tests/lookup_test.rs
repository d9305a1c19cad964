//! Integration tests for single-query lookup and transcript segmentation.

use routedrill::store::sample_records;
use routedrill::{
    AddressRecord, ListenMode, Matcher, MemoryStore, NewRecord, Normalizer, ReviewScheduler,
    RouteBook, Routed, Segmenter, TranscriptEvent, TranscriptRouter,
};

fn library() -> Vec<AddressRecord> {
    sample_records(0)
}

#[test]
fn test_blank_query_matches_nothing() {
    let normalizer = Normalizer::default();
    let matcher = Matcher::new(&normalizer);
    assert!(matcher.search("", &library()).is_empty());
    assert!(matcher.search("  ，。 ", &library()).is_empty());
}

#[test]
fn test_exact_name_ranks_first_at_100() {
    let normalizer = Normalizer::default();
    let results = Matcher::new(&normalizer).search("文三路", &library());

    assert!(!results.is_empty());
    assert_eq!(results[0].record.route_area, "西湖1区");
    assert_eq!(results[0].score, 100.0);
}

#[test]
fn test_homophone_query_resolves_to_same_street() {
    let normalizer = Normalizer::default();
    let results = Matcher::new(&normalizer).search("文三陆", &library());

    assert_eq!(results[0].record.street_name, "文三路");
    assert!(results[0].score >= 95.0, "score was {}", results[0].score);
}

#[test]
fn test_results_are_sorted_and_capped() {
    let normalizer = Normalizer::default();
    let results = Matcher::new(&normalizer)
        .with_floor(0.0)
        .with_max_results(3)
        .search("路", &library());

    assert!(results.len() <= 3);
    assert!(
        results.windows(2).all(|w| w[0].score >= w[1].score),
        "results must be in descending score order"
    );
}

#[test]
fn test_continuous_transcript_splits_into_two_streets() {
    let normalizer = Normalizer::default();
    let segments = Segmenter::new(&normalizer).segment("文三路文一西路", &library());

    assert_eq!(segments.len(), 2);
    let zones: Vec<&str> = segments
        .iter()
        .map(|s| s.record.as_ref().map(|r| r.route_area.as_str()).unwrap_or("-"))
        .collect();
    assert_eq!(zones, ["西湖1区", "余杭5区"]);
    let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(joined, "文三路文一西路");
}

#[test]
fn test_transcript_with_filler_keeps_every_character() {
    let normalizer = Normalizer::default();
    let transcript = "先送延安路然后古墩路最后江南大道";
    let segments = Segmenter::new(&normalizer).segment(transcript, &library());

    let matched: Vec<&str> = segments
        .iter()
        .filter_map(|s| s.record.as_ref())
        .map(|r| r.street_name.as_str())
        .collect();
    assert_eq!(matched, ["延安路", "古墩路", "江南大道"]);

    let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(joined, normalizer.canonicalize(transcript));
}

#[test]
fn test_router_previews_interim_batch_text() {
    let normalizer = Normalizer::default();
    let records = library();
    let router = TranscriptRouter::new(&normalizer, ListenMode::Batch);

    let interim = router.route(&TranscriptEvent::Interim("文三路文".to_string()), &records);
    assert_eq!(interim, Routed::Preview("文三路文".to_string()));

    let routed = router.route(&TranscriptEvent::Final("文三路文一西路".to_string()), &records);
    match routed {
        Routed::Segments(segments) => assert_eq!(segments.len(), 2),
        other => panic!("expected segments, got {other:?}"),
    }
}

#[test]
fn test_added_street_is_found_through_the_book() {
    let book = RouteBook::new(
        MemoryStore::new(library()),
        Normalizer::default(),
        ReviewScheduler::default(),
    );
    book.add(NewRecord::new("莫干山路", "拱墅2区"), 1).unwrap();

    let results = book.search("莫干山陆").unwrap();
    assert_eq!(results[0].record.route_area, "拱墅2区");

    let segments = book.segment("莫干山路文三路").unwrap();
    assert_eq!(segments.iter().filter(|s| s.is_match()).count(), 2);
}
