//! Resolves model method calls against the in-memory dataset.
//!
//! Shared by the dispatcher's fallback path and the mock backend server so both
//! answer identically. Every valid call gets a result: unknown models read as
//! empty, creates mint an id, writes and unlinks report `true`.

use super::store::MockDatasetStore;
use crate::models::{CallDescriptor, CallResult, ModelMethod, SearchParams};
use crate::Result;
use serde_json::Value;
use tracing::debug;

/// Call resolver over a [`MockDatasetStore`].
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    store: MockDatasetStore,
}

impl MockBackend {
    pub fn new(store: MockDatasetStore) -> Self {
        Self { store }
    }

    /// Backend over the HR sample data.
    pub fn seeded() -> Self {
        Self::new(MockDatasetStore::seeded())
    }

    pub fn store(&self) -> &MockDatasetStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MockDatasetStore {
        &mut self.store
    }

    /// Resolve one call. Fails only for malformed descriptors.
    pub fn resolve(&mut self, call: &CallDescriptor) -> Result<CallResult> {
        call.validate()?;
        let model = call.model();
        debug!("Mock resolve: {}.{}", model, call.method());

        let result = match call.method() {
            ModelMethod::SearchRead => {
                CallResult::Records(self.store.search(model, &call.search_params()))
            }
            ModelMethod::Create => {
                let values = call.values_arg(0)?;
                CallResult::Created(self.store.insert(model, values)?)
            }
            ModelMethod::Write => {
                let ids = call.ids_arg(0)?;
                let patch = call.values_arg(1)?;
                CallResult::Success(self.store.update_many(model, &ids, patch))
            }
            ModelMethod::Unlink => {
                let ids = call.ids_arg(0)?;
                CallResult::Success(self.store.delete_many(model, &ids))
            }
            ModelMethod::Custom(name) => self.resolve_custom(call, name)?,
        };
        Ok(result)
    }

    fn resolve_custom(&self, call: &CallDescriptor, name: &str) -> Result<CallResult> {
        let model = call.model();
        match name {
            "read" => {
                let ids = if call.args().is_empty() {
                    Vec::new()
                } else {
                    call.ids_arg(0)?
                };
                let fields = SearchParams::from_call(&[], call.kwargs()).fields;
                Ok(CallResult::Records(self.store.read_ids(model, &ids, &fields)))
            }
            "search_count" => {
                let domain = call.search_params().domain;
                Ok(CallResult::Value(Value::from(self.store.count(model, &domain))))
            }
            _ => Ok(CallResult::Value(Value::Bool(true))),
        }
    }
}
