//! Transport layer for the tracker SDK.

pub mod http;

pub use http::HttpTransport;
