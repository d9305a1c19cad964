//! In-memory record store.

use super::RecordStore;
use crate::error::Result;
use crate::record::AddressRecord;

/// Insertion-ordered store held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    records: Vec<AddressRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<AddressRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            store.upsert(record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    fn upsert(&mut self, record: AddressRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }
}

impl RecordStore for MemoryStore {
    fn get_all(&self) -> Result<Vec<AddressRecord>> {
        Ok(self.records.clone())
    }

    fn get(&self, id: &str) -> Result<Option<AddressRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn put(&mut self, record: AddressRecord) -> Result<()> {
        self.upsert(record);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(self.remove(id))
    }
}
