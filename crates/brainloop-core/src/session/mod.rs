//! Conversation persistence.
//!
//! # Disk format
//!
//! One file per calendar day under the memory root:
//! `memory/session_YYYYMMDD.json`, a pretty-printed JSON array holding the
//! complete message history. Every save is a full snapshot overwrite.

pub mod store;

pub use store::{ConversationStore, SnapshotSummary};
