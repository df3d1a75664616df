//! Table-of-tables record store.
//!
//! Every operation is total: an unknown model behaves as an empty collection.
//! Ids are unique per model and allocated from a per-model high-water mark, so
//! a deleted id is never handed out again and gaps are never filled.

use super::domain::matches_domain;
use crate::models::{Record, SearchParams};
use crate::{PortalError, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone, Default)]
struct Table {
    records: Vec<Record>,
    high_water: i64,
}

impl Table {
    /// Next id above the high-water mark; `None` once `i64::MAX` was handed out.
    fn allocate_id(&mut self) -> Option<i64> {
        let max_present = self.records.iter().filter_map(Record::id).max().unwrap_or(0);
        let id = self.high_water.max(max_present).checked_add(1)?;
        self.high_water = id;
        Some(id)
    }
}

/// In-memory dataset keyed by model name.
#[derive(Debug, Clone, Default)]
pub struct MockDatasetStore {
    tables: HashMap<String, Table>,
}

impl MockDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the HR sample data.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        super::seed::seed_hr_dataset(&mut store);
        store
    }

    /// Replace a model's records.
    ///
    /// Records without an id, or whose id is already taken, get a fresh id.
    pub fn load(&mut self, model: &str, records: Vec<Record>) {
        let table = self.tables.entry(model.to_string()).or_default();
        table.records.clear();
        table.high_water = 0;

        let mut seen = HashSet::new();
        for record in records {
            let record = match record.id() {
                Some(id) if id > 0 && seen.insert(id) => {
                    table.high_water = table.high_water.max(id);
                    record
                }
                _ => match table.allocate_id() {
                    Some(id) => Record::with_id(id, record.as_map()),
                    None => {
                        warn!("{}: id space exhausted, dropping record", model);
                        continue;
                    }
                },
            };
            if let Some(id) = record.id() {
                seen.insert(id);
            }
            table.records.push(record);
        }
    }

    /// Owned copy of every record in `model`.
    pub fn read_all(&self, model: &str) -> Vec<Record> {
        self.tables
            .get(model)
            .map(|t| t.records.clone())
            .unwrap_or_default()
    }

    /// Domain filter, then offset/limit, then field projection.
    ///
    /// A limit of 0 means no limit, as on the ERP.
    pub fn search(&self, model: &str, params: &SearchParams) -> Vec<Record> {
        let Some(table) = self.tables.get(model) else {
            return Vec::new();
        };
        let limit = params.limit.filter(|l| *l > 0).unwrap_or(usize::MAX);

        table
            .records
            .iter()
            .filter(|r| matches_domain(r, &params.domain))
            .skip(params.offset)
            .take(limit)
            .map(|r| r.project(&params.fields))
            .collect()
    }

    /// Records whose id is in `ids`, in store order.
    pub fn read_ids(&self, model: &str, ids: &[i64], fields: &[String]) -> Vec<Record> {
        let Some(table) = self.tables.get(model) else {
            return Vec::new();
        };
        table
            .records
            .iter()
            .filter(|r| r.id().is_some_and(|id| ids.contains(&id)))
            .map(|r| r.project(fields))
            .collect()
    }

    pub fn count(&self, model: &str, domain: &[Value]) -> usize {
        self.tables.get(model).map_or(0, |t| {
            t.records
                .iter()
                .filter(|r| matches_domain(r, domain))
                .count()
        })
    }

    /// Append a record and return its freshly allocated id.
    ///
    /// The id is strictly greater than any id this model has ever held. An `id`
    /// in `values` is ignored. Fails only when the model's id space is exhausted.
    pub fn insert(&mut self, model: &str, values: &Map<String, Value>) -> Result<i64> {
        let table = self.tables.entry(model.to_string()).or_default();
        let id = table
            .allocate_id()
            .ok_or_else(|| PortalError::Other(format!("{}: id space exhausted", model)))?;
        table.records.push(Record::with_id(id, values));
        Ok(id)
    }

    /// Merge `patch` into every record whose id is listed. Always `true`.
    pub fn update_many(&mut self, model: &str, ids: &[i64], patch: &Map<String, Value>) -> bool {
        if let Some(table) = self.tables.get_mut(model) {
            table
                .records
                .iter_mut()
                .filter(|r| r.id().is_some_and(|id| ids.contains(&id)))
                .for_each(|r| r.merge(patch));
        }
        true
    }

    /// Remove every record whose id is listed. Always `true`.
    pub fn delete_many(&mut self, model: &str, ids: &[i64]) -> bool {
        if let Some(table) = self.tables.get_mut(model) {
            table
                .records
                .retain(|r| !r.id().is_some_and(|id| ids.contains(&id)));
        }
        true
    }

    pub fn len(&self, model: &str) -> usize {
        self.tables.get(model).map_or(0, |t| t.records.len())
    }

    pub fn is_empty(&self, model: &str) -> bool {
        self.len(model) == 0
    }

    /// Model names with a table, sorted.
    pub fn models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.tables.keys().cloned().collect();
        models.sort();
        models
    }
}
