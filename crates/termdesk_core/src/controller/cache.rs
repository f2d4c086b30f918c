//! Client-side record cache mirroring server state.
//!
//! # Invariants
//! - Ids are unique within the cache.
//! - Reconciliation only happens with records the server returned.

use crate::model::contract_term::{ContractTerm, ContractTermId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCache {
    records: Vec<ContractTerm>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole cache with a freshly loaded list.
    ///
    /// Later duplicates of an id are dropped.
    pub fn replace_all(&mut self, records: Vec<ContractTerm>) {
        let mut unique: Vec<ContractTerm> = Vec::with_capacity(records.len());
        for record in records {
            if !unique.iter().any(|known| known.id == record.id) {
                unique.push(record);
            }
        }
        self.records = unique;
    }

    /// Inserts `record` at the front, dropping any stale copy with the same id.
    pub fn prepend(&mut self, record: ContractTerm) {
        self.remove_by_id(record.id);
        self.records.insert(0, record);
    }

    /// Replaces the record with the same id in place, or prepends it.
    ///
    /// Returns `true` when an existing record was replaced.
    pub fn upsert_by_id(&mut self, record: ContractTerm) -> bool {
        if self.replace_by_id(record.clone()) {
            return true;
        }
        self.records.insert(0, record);
        false
    }

    /// Replaces the record with the same id in place; no-op when absent.
    pub fn replace_by_id(&mut self, record: ContractTerm) -> bool {
        match self.records.iter_mut().find(|known| known.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Removes the record with `id`, returning it when present.
    pub fn remove_by_id(&mut self, id: ContractTermId) -> Option<ContractTerm> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn get(&self, id: ContractTermId) -> Option<&ContractTerm> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn records(&self) -> &[ContractTerm] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
