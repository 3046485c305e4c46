mod console;
mod guard;
pub mod orchestrator;
mod types;

pub use console::LossyWriter;
pub use guard::ContainerGuard;
pub use orchestrator::run_workflow;
pub use types::{BuildReport, MODEL_PLACEHOLDER, Stage, WorkflowInput};
