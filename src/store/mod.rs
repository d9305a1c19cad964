//! Record persistence.
//!
//! The engine only needs a keyed collection it can read in full and write one
//! record at a time; storage technology is up to the implementation.

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::record::AddressRecord;

/// Key-value store of address records keyed by id.
///
/// `get_all` returns a fully materialized snapshot in a stable order, and
/// writes are visible to later reads through the same store.
pub trait RecordStore: Send {
    fn get_all(&self) -> Result<Vec<AddressRecord>>;

    fn get(&self, id: &str) -> Result<Option<AddressRecord>>;

    /// Insert, or replace the record with the same id.
    fn put(&mut self, record: AddressRecord) -> Result<()>;

    /// Remove a record; returns whether it existed.
    fn delete(&mut self, id: &str) -> Result<bool>;

    /// Insert or replace several records as one write.
    fn put_many(&mut self, records: Vec<AddressRecord>) -> Result<()> {
        for record in records {
            self.put(record)?;
        }
        Ok(())
    }
}

/// Streets a brand-new store starts with, so a first quiz has material.
pub(crate) const SAMPLE_STREETS: &[(&str, &str, &str)] = &[
    ("文三路", "西湖1区", "wensanlu"),
    ("文一西路", "余杭5区", "wenyixilu"),
    ("博奥路", "萧山2区", "boaolu"),
    ("解放东路", "江干3区", "jiefangdonglu"),
    ("延安路", "上城1区", "yananlu"),
    ("体育场路", "下城2区", "tiyuchanglu"),
    ("古墩路", "西湖3区", "gudunlu"),
    ("江南大道", "滨江1区", "jiangnandadao"),
];

/// The sample streets as records with sequential ids.
pub fn sample_records(now: i64) -> Vec<AddressRecord> {
    SAMPLE_STREETS
        .iter()
        .enumerate()
        .map(|(i, (street, zone, pinyin))| {
            AddressRecord::create(
                (i + 1).to_string(),
                crate::record::NewRecord::new(*street, *zone),
                (*pinyin).to_string(),
                now,
            )
        })
        .collect()
}
