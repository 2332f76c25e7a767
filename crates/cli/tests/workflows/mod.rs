//! Workflow integration tests
//!
//! Tests for complete store/retrieve workflows and the failure modes the
//! ledger and blob store can get into.

pub mod collisions;
pub mod round_trip;
