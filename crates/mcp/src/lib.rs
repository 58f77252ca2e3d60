// MCP (Model Context Protocol) server exposing the Parliament, geography and
// intelligence tools to agent clients over stdio

pub mod config;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::McpConfig;
pub use server::McpServer;
