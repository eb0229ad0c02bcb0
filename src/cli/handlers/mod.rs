//! Command handlers for CLI operations.
//!
//! Handlers receive merged settings and keep execution separate from
//! parsing and validation.

pub mod schedule;
pub mod serve;
pub mod tasks;

pub use schedule::{DescribeCommandHandler, PresetsCommandHandler};
pub use serve::ServeCommandHandler;
pub use tasks::ListCommandHandler;
