//! Persistence adapters. JSON snapshot store and the seed dataset.

pub mod fixtures;
pub mod snapshot_json;

pub use fixtures::seed_snapshot;
pub use snapshot_json::JsonSnapshotStore;
