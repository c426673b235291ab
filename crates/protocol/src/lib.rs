//! Wire types for the Chrome DevTools Protocol.
//!
//! This crate contains the serde-serializable types exchanged with a
//! Chromium instance over its remote debugging port: the JSON-RPC style
//! envelopes sent over a target's WebSocket, the HTTP discovery documents
//! served under `/json/*`, and the `Runtime.evaluate` payloads.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Subset of the protocol: only the fields slotwatch reads are modelled
//! * Stable: Changes only when the wire protocol changes
//!
//! Higher-level page APIs are built on top of these types in `slotwatch`.

pub mod message;
pub mod runtime;
pub mod target;

pub use message::*;
pub use runtime::*;
pub use target::*;
