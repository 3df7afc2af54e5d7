//! Cross-crate integration tests.
//!
//! - `end_to_end`: the streaming validator over local, gzip and HTTP sources
//! - `runtime_flow`: runtime configuration, line session and Prometheus export

pub mod end_to_end;
pub mod runtime_flow;
