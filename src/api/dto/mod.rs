//! Data Transfer Objects for API requests and responses.
//!
//! - `task` - crontab task requests and responses
//! - `schedule` - presets and schedule descriptions
//! - `health` - health check responses
//! - `error` - common error response

mod error;
mod health;
mod schedule;
mod task;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use schedule::{DescribeQuery, DescribeResponse, TaskListQuery};
pub(crate) use schedule::locale_of;
pub use task::{
    CreateTaskRequest, DeleteTaskResponse, TaskEntryResponse, TaskMutationResponse,
    UpdateTaskRequest,
};
