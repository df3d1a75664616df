//! Data models shared by the dispatcher, the mock dataset and the dev servers.
//!
//! The wire shapes follow the ERP's JSON-RPC conventions so records can be
//! passed through to the UI untouched.

mod call;
mod record;

pub use call::*;
pub use record::*;
