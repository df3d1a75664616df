//! HR portal development servers.
//!
//! - **Mock backend**: serves the seeded HR dataset over the ERP's JSON-RPC endpoints
//! - **Proxy**: forwards browser requests to the real backend and answers CORS
//! - **Probe**: checks that both are reachable

pub mod handler;
pub mod probe;
pub mod proxy;
pub mod server;

pub use probe::{reports_to_json, run_probe, ProbeReport};
pub use proxy::{proxy_router, start_proxy, ProxyState};
pub use server::{backend_router, start_backend, BackendState};
