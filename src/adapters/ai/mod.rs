//! Assistant adapter module. Implements AssistantPort.
//!
//! Only a canned-response adapter exists; there is no inference backend.

pub mod mock_adapter;

pub use mock_adapter::{MockAssistantAdapter, canned_response};
