//! Bulk import and export.
//!
//! Imports upsert by street name: a row naming a street already in the library
//! updates that record's zone (and company or pinyin when the row carries
//! them) and keeps its review history. Any other row creates a new record.

use crate::error::{Result, RouteDrillError};
use crate::phonetic::{Normalizer, sanitize_key};
use crate::record::{AddressRecord, NewRecord, generate_id};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use tracing::{debug, info};

const STREET_HEADERS: &[&str] = &["street_name", "streetname", "street", "道路名称"];
const ZONE_HEADERS: &[&str] = &["route_area", "routearea", "zone", "所属路区"];
const COMPANY_HEADERS: &[&str] = &["company_name", "companyname", "company", "公司名称"];
const PINYIN_HEADERS: &[&str] = &["pinyin", "拼音"];

/// Column titles written by [`write_csv`].
pub const EXPORT_HEADERS: [&str; 6] = ["道路名称", "所属路区", "公司名称", "拼音", "错误次数", "创建时间"];

/// One incoming row before it is merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportRow {
    pub street_name: String,
    pub route_area: String,
    pub company_name: Option<String>,
    pub pinyin: Option<String>,
}

impl ImportRow {
    pub fn new(street_name: impl Into<String>, route_area: impl Into<String>) -> Self {
        Self {
            street_name: street_name.into(),
            route_area: route_area.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Result of merging rows into a library: the records to write plus counts.
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    /// New and changed records, in first-touched order.
    pub records: Vec<AddressRecord>,
    pub summary: ImportSummary,
}

/// Upsert `rows` into `existing` by street name.
///
/// Rows with a blank name or zone are skipped. When the same street appears
/// twice in one batch the later row wins and the street counts once.
pub fn merge_rows<R: Rng + ?Sized>(
    existing: &[AddressRecord],
    rows: Vec<ImportRow>,
    normalizer: &Normalizer,
    rng: &mut R,
    now: i64,
) -> MergePlan {
    let by_name: HashMap<&str, &AddressRecord> = existing
        .iter()
        .map(|r| (r.street_name.trim(), r))
        .collect();

    let mut plan = MergePlan::default();
    let mut touched: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let street = row.street_name.trim();
        let zone = row.route_area.trim();
        if street.is_empty() || zone.is_empty() {
            plan.summary.skipped += 1;
            continue;
        }
        let company = row
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let pinyin = row
            .pinyin
            .as_deref()
            .map(sanitize_key)
            .filter(|p| !p.is_empty());

        if let Some(&index) = touched.get(street) {
            apply_update(&mut plan.records[index], zone, company, pinyin);
            continue;
        }

        let record = match by_name.get(street) {
            Some(current) => {
                let mut record = (*current).clone();
                apply_update(&mut record, zone, company, pinyin);
                plan.summary.updated += 1;
                record
            }
            None => {
                let key = pinyin.unwrap_or_else(|| normalizer.normalize(street).key);
                let mut new = NewRecord::new(street, zone);
                new.company_name = company;
                plan.summary.added += 1;
                AddressRecord::create(generate_id(rng), new, key, now)
            }
        };
        touched.insert(street.to_string(), plan.records.len());
        plan.records.push(record);
    }

    info!(
        added = plan.summary.added,
        updated = plan.summary.updated,
        skipped = plan.summary.skipped,
        "merged import rows"
    );
    plan
}

fn apply_update(
    record: &mut AddressRecord,
    zone: &str,
    company: Option<String>,
    pinyin: Option<String>,
) {
    record.route_area = zone.to_string();
    if company.is_some() {
        record.company_name = company;
    }
    if let Some(pinyin) = pinyin {
        record.canonical_pinyin = pinyin;
    }
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|alias| h == alias))
}

/// Read import rows from CSV with a header line.
///
/// Header matching ignores case, surrounding whitespace, a UTF-8 byte order
/// mark and the camelCase/snake_case distinction. Extra columns are ignored.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    debug!(?headers, "import headers");

    let street = find_column(&headers, STREET_HEADERS).ok_or_else(|| {
        RouteDrillError::ImportMissingColumn {
            column: "street_name".to_string(),
        }
    })?;
    let zone = find_column(&headers, ZONE_HEADERS).ok_or_else(|| {
        RouteDrillError::ImportMissingColumn {
            column: "route_area".to_string(),
        }
    })?;
    let company = find_column(&headers, COMPANY_HEADERS);
    let pinyin = find_column(&headers, PINYIN_HEADERS);

    let mut rows = Vec::new();
    for result in csv.records() {
        let record = result?;
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();
        let optional = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        rows.push(ImportRow {
            street_name: field(street),
            route_area: field(zone),
            company_name: optional(company),
            pinyin: optional(pinyin),
        });
    }
    Ok(rows)
}

/// Write records as CSV under [`EXPORT_HEADERS`]; creation time is epoch ms.
pub fn write_csv<W: io::Write>(writer: W, records: &[AddressRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADERS)?;
    for record in records {
        let failures = record.failure_count.to_string();
        let created = record.created_at.to_string();
        csv.write_record([
            record.street_name.as_str(),
            record.route_area.as_str(),
            record.company_name.as_deref().unwrap_or_default(),
            record.canonical_pinyin.as_str(),
            failures.as_str(),
            created.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
