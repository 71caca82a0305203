//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod hydration;
pub mod measure;
pub mod models;

// Re-export main command functions
pub use hydration::execute_hydration;
pub use measure::{
    capture_trace, device_list_message, execute_measure, validate_args, validate_device,
};
pub use models::{HydrationArgs, MeasureArgs};
