//! # Flowtally Integration Tests
//!
//! End-to-end flows across the crates: router rows in, stored counters and address-list
//! mutations out. [`support`] is public so other crates' tests can drive the same
//! in-memory router.

pub mod support;

mod pipeline;
