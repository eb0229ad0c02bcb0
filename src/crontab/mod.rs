//! Synchronization between the OS crontab, generated scripts and the
//! index-based task identity exposed to clients.

pub mod error;
pub mod line;
pub mod memory;
pub mod metadata;
pub mod registry;
pub mod script;
pub mod store;

pub use error::{LineError, RegistryError, RegistryResult, ScriptError, StoreError};
pub use line::{CronEntry, LineKind, Task, UnmanagedReason};
pub use memory::MemoryScheduleStore;
pub use registry::{
    AddOutcome, DeleteOutcome, MutationOutcome, RegistryOptions, TaskEditView, TaskRegistry,
    UpdateOutcome, infer_script_type,
};
pub use script::{CreatedScript, ScriptManager, ScriptType};
pub use store::{CrontabCommandStore, ScheduleStore};
