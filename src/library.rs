//! Library view: records grouped by zone, plus summary counts.

use crate::record::AddressRecord;
use crate::review::ReviewScheduler;
use serde::Serialize;
use std::collections::HashSet;

/// Narrows which records a library listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    /// Case-insensitive substring of the street, zone or company.
    pub text: Option<String>,
    /// Exact zone label.
    pub zone: Option<String>,
}

impl LibraryFilter {
    pub fn matches(&self, record: &AddressRecord) -> bool {
        if let Some(zone) = &self.zone
            && record.route_area != *zone
        {
            return false;
        }
        let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = text.to_lowercase();
        [
            Some(record.street_name.as_str()),
            Some(record.route_area.as_str()),
            record.company_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneGroup {
    pub zone: String,
    pub records: Vec<AddressRecord>,
}

/// Group matching records by zone.
///
/// Zones appear in the order they first occur in `records`; records keep their
/// relative order inside a group.
pub fn group_by_zone(records: &[AddressRecord], filter: &LibraryFilter) -> Vec<ZoneGroup> {
    let mut groups: Vec<ZoneGroup> = Vec::new();
    for record in records.iter().filter(|r| filter.matches(r)) {
        match groups.iter_mut().find(|g| g.zone == record.route_area) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(ZoneGroup {
                zone: record.route_area.clone(),
                records: vec![record.clone()],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub total: usize,
    pub zones: usize,
    pub due: usize,
    pub in_mistake_pool: usize,
    /// Records no answer has ever been given for.
    pub never_reviewed: usize,
    /// Records at the last stage of the interval table.
    pub mastered: usize,
}

pub fn stats(records: &[AddressRecord], scheduler: &ReviewScheduler, now: i64) -> LibraryStats {
    let max_stage = scheduler.intervals().max_stage();
    let zones: HashSet<&str> = records.iter().map(|r| r.route_area.as_str()).collect();
    LibraryStats {
        total: records.len(),
        zones: zones.len(),
        due: records.iter().filter(|r| scheduler.is_due(r, now)).count(),
        in_mistake_pool: records.iter().filter(|r| r.is_in_mistake_pool).count(),
        never_reviewed: records.iter().filter(|r| r.last_review_time == 0).count(),
        mastered: records.iter().filter(|r| r.review_stage >= max_stage).count(),
    }
}
