//! Model Context Protocol (MCP) server handling
//!
//! JSON-RPC validation, protocol negotiation and routing, shared by the
//! stdio and HTTP transports.

pub mod rpc;
pub mod server;
pub mod stdio;
