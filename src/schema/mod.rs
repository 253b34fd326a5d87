//! Wire types for the JSON-RPC envelope and the MCP tool payloads this probe
//! exchanges with the server.

pub mod jsonrpc;
mod tools;

pub use jsonrpc::*;
pub use tools::*;
