//! Application use cases. Orchestrate domain logic via ports.

pub mod assistant_gate;
pub mod assistant_service;
pub mod directory_service;
pub mod work_group_directory;

pub use assistant_service::AssistantService;
pub use directory_service::{AssistantContext, DirectoryService};
pub use work_group_directory::{DirectoryPolicy, WorkGroupDirectory};
