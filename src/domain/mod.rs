//! Note tools exposed over the MCP protocol and their text rendering

pub mod format;
pub mod tools;
