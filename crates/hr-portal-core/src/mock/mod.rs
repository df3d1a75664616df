//! In-memory development dataset.
//!
//! - **Store**: one ordered record sequence per model, with id allocation
//! - **Domain**: the small subset of ERP domain filtering the UI relies on
//! - **Seed**: the HR sample data served during local development
//! - **Backend**: resolves call descriptors against the store

mod backend;
mod domain;
mod seed;
mod store;

pub use backend::MockBackend;
pub use domain::matches_domain;
pub use seed::seed_hr_dataset;
pub use store::MockDatasetStore;
