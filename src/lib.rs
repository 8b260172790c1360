//! workgroup-hub: student work-group directory and AI-assistant gating, hexagonal layout.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
