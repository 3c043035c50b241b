//! Integration tests
//!
//! End-to-end flows through the public client API, the HTTP transport
//! against a mock server, the SQLite store on disk, and (with `ssr`) the
//! real backend.

mod http_api_test;
mod local_db_test;
mod offline_flow_test;
#[cfg(feature = "ssr")]
mod server_test;
