//! Cross-cutting helpers shared by adapters and the entry point.

pub mod config;
