//! Infrastructure adapters. Implement outbound ports and the inbound UI.
//!
//! Snapshot storage, canned assistant, exports, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod export;
pub mod persistence;
pub mod ui;
