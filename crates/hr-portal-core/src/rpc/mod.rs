//! JSON-RPC plumbing: the envelope codec and the HTTP transport.
//!
//! # Architecture
//!
//! - **Envelope**: request/response types and the encode/decode rules
//! - **Transport**: async trait over HTTP, with a `reqwest` implementation

pub mod envelope;
pub mod transport;

pub use envelope::{
    decode_call, decode_response, decode_value, RpcCodec, RpcErrorBody, RpcRequest, RpcResponse,
};
pub use transport::{HttpTransport, Transport};
