use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use tracing::warn;

use crate::error::RecordError;
use crate::record::{has_all_fields, PackageRecord, ENTRY_DELIMITER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
    Unchanged,
}

/// Mapping of package title to its record, as persisted in the versioning
/// file and as published remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionStore {
    entries: BTreeMap<String, PackageRecord>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a versioning blob, skipping entries that do not decode.
    pub fn parse(text: &str) -> Self {
        let (store, errors) = Self::parse_with_errors(text);
        for err in &errors {
            warn!(error = %err, "skipping versioning entry");
        }
        store
    }

    /// Like [`VersionStore::parse`] but hands back the rejected entries.
    ///
    /// Entries with fewer than five fields (including the empty tail of a
    /// trailing `;`) are dropped without a diagnostic.
    pub fn parse_with_errors(text: &str) -> (Self, Vec<RecordError>) {
        let mut store = Self::new();
        let mut errors = Vec::new();

        for entry in text.split(ENTRY_DELIMITER).map(str::trim) {
            if !has_all_fields(entry) {
                continue;
            }
            match PackageRecord::parse_entry(entry) {
                Ok(record) => {
                    store.merge(record);
                }
                Err(err) => errors.push(err),
            }
        }

        (store, errors)
    }

    pub fn serialize(&self) -> String {
        let separator = ENTRY_DELIMITER.to_string();
        self.entries
            .values()
            .map(PackageRecord::to_string)
            .collect::<Vec<_>>()
            .join(separator.as_str())
    }

    /// Inserts `record` if its title is new, replaces the stored record only
    /// when `record` carries a strictly higher version counter.
    pub fn merge(&mut self, record: PackageRecord) -> MergeOutcome {
        match self.entries.entry(record.title().to_string()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                MergeOutcome::Inserted
            }
            btree_map::Entry::Occupied(mut slot) => {
                if record.is_newer_than(slot.get()) {
                    slot.insert(record);
                    MergeOutcome::Replaced
                } else {
                    MergeOutcome::Unchanged
                }
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&PackageRecord> {
        self.entries.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.entries.values()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for VersionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromIterator<PackageRecord> for VersionStore {
    fn from_iter<I: IntoIterator<Item = PackageRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.merge(record);
        }
        store
    }
}
