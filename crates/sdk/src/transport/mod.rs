//! Transport layer for the Parliament SDK.

pub mod http;

pub use http::HttpTransport;
