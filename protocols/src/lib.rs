//! # RouterOS API Codec
//!
//! Bytes-in / bytes-out implementation of the RouterOS API framing. Nothing in here
//! touches a socket; the transport in `flowtally-core` feeds and drains these buffers.
//!
//! * [`word`]: the variable length prefix every word carries.
//! * [`sentence`]: words terminated by an empty word.
//! * [`reply`]: classification of the sentences the router sends back.
//! * [`command`]: builder for the sentences we send.

pub mod command;
pub mod error;
pub mod reply;
pub mod sentence;
pub mod word;

pub use command::Command;
pub use error::ProtocolError;
pub use reply::{Reply, ReplySentence};
