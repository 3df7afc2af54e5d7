//! Service Layer
//!
//! Contains the application service that orchestrates the tiered
//! validation and coordinates loading and scanning via ports.

pub mod quorum_validator;

pub use quorum_validator::{QuorumValidator, StreamingQuorumValidator};
