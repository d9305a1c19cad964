//! Integration tests for CSV import (upsert by street name) and export.

use routedrill::import::read_csv;
use routedrill::{JsonFileStore, MemoryStore, Normalizer, ReviewScheduler, RouteBook};
use std::fs;
use tempfile::TempDir;

fn empty_book() -> RouteBook<MemoryStore> {
    RouteBook::new(
        MemoryStore::default(),
        Normalizer::default(),
        ReviewScheduler::default(),
    )
}

#[test]
fn test_import_spreadsheet_then_reimport_updates() {
    let book = empty_book();
    let first = "道路名称,所属路区,拼音\n文三路,西湖1区,wensanlu\n延安路,上城1区,\n,西湖1区,\n";
    let summary = book.import(read_csv(first.as_bytes()).unwrap(), 1).unwrap();
    assert_eq!((summary.added, summary.updated, summary.skipped), (2, 0, 1));

    book.process_result(&book.search("文三路").unwrap()[0].record.id, false, 5)
        .unwrap();

    let second = "street_name,route_area,company_name\n文三路,西湖2区,顺丰\n古墩路,西湖3区,\n";
    let summary = book.import(read_csv(second.as_bytes()).unwrap(), 9).unwrap();
    assert_eq!((summary.added, summary.updated, summary.skipped), (1, 1, 0));

    let records = book.snapshot().unwrap();
    assert_eq!(records.len(), 3);
    let wensan = records.iter().find(|r| r.street_name == "文三路").unwrap();
    assert_eq!(wensan.route_area, "西湖2区");
    assert_eq!(wensan.company_name.as_deref(), Some("顺丰"));
    assert_eq!(wensan.failure_count, 1, "history survives re-import");
    assert!(wensan.is_in_mistake_pool);
}

#[test]
fn test_export_then_import_into_fresh_store() {
    let dir = TempDir::new().unwrap();
    let source =
        JsonFileStore::open_with_seed(&dir.path().join("source.json"), true).unwrap();
    let source = RouteBook::new(source, Normalizer::default(), ReviewScheduler::default());

    let csv_path = dir.path().join("export.csv");
    source
        .export_csv(fs::File::create(&csv_path).unwrap())
        .unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("道路名称,所属路区,公司名称,拼音,错误次数,创建时间\n"));
    assert_eq!(text.lines().count(), 9);

    let target = JsonFileStore::open(&dir.path().join("target.json")).unwrap();
    let target = RouteBook::new(target, Normalizer::default(), ReviewScheduler::default());
    let rows = read_csv(fs::File::open(&csv_path).unwrap()).unwrap();
    let summary = target.import(rows, 0).unwrap();
    assert_eq!(summary.added, 8);

    let mut expected: Vec<(String, String, String)> = source
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|r| (r.street_name, r.route_area, r.canonical_pinyin))
        .collect();
    let mut imported: Vec<(String, String, String)> = target
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|r| (r.street_name, r.route_area, r.canonical_pinyin))
        .collect();
    expected.sort();
    imported.sort();
    assert_eq!(imported, expected);
}

#[test]
fn test_import_without_zone_column_fails() {
    let err = read_csv("道路名称,拼音\n文三路,wensanlu\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("route_area"), "got {err}");
}
