//! HR Portal Core - ERP JSON-RPC bridge for the HR front-end.
//!
//! This crate sits between the UI and the ERP backend. It encodes model
//! method calls into JSON-RPC envelopes, sends them over HTTP, and shapes the
//! results. For local development without a backend it can serve the same
//! calls from an in-memory HR dataset.
//!
//! The development servers (mock backend, CORS proxy) live in the
//! `hr-portal-rpc` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use hr_portal_core::{ClientConfig, Dispatcher, SearchParams};
//!
//! #[tokio::main]
//! async fn main() -> hr_portal_core::Result<()> {
//!     let dispatcher = Dispatcher::new(ClientConfig::from_env()?)?;
//!     dispatcher.login("admin", "admin").await?;
//!
//!     let employees = dispatcher
//!         .search_read("hr.employee", &SearchParams::new().with_fields(["name"]))
//!         .await?;
//!     println!("Found {} employees", employees.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hr;
pub mod mock;
pub mod models;
pub mod rpc;
pub mod session;

// Re-export commonly used types
pub use config::{ClientConfig, DevConfig, DispatchMode, Endpoints, NetworkConfig};
pub use dispatcher::Dispatcher;
pub use error::{PortalError, Result};
pub use hr::HrApi;
pub use mock::{MockBackend, MockDatasetStore};
pub use models::{CallDescriptor, CallResult, ForeignKeyRef, ModelMethod, Record, SearchParams};
pub use rpc::{HttpTransport, RpcCodec, RpcRequest, RpcResponse, Transport};
pub use session::Session;
