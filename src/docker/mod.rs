// Docker engine client: command builders, process plumbing, streaming output.

pub mod commands;
pub mod engine;
pub mod error;
pub mod run;
pub mod types;

pub use engine::{DockerCli, Engine};
pub use error::EngineError;
pub use types::{ContainerId, DockerCommand, ImageId};
