//! # Flowtally Common
//!
//! Shared vocabulary for every other crate in the workspace: the domain models produced
//! by the collection pipeline, the typed records the device rows are normalized into,
//! and the runtime [`config::Config`].

pub mod config;
pub mod network;
pub mod rows;
