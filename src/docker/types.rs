use std::fmt;
use std::time::Duration;

/// Identifier of a container created by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 12-character prefix `docker ps` shows.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the engine returns for a committed image (`sha256:...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Describes one `docker` invocation. The `args` field is the full argument
/// list after any global flags (the command builders assemble it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCommand {
    pub args: Vec<String>,
    /// Wall-clock bound for the whole invocation. `None` waits for completion.
    pub timeout: Option<Duration>,
}

impl DockerCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The docker subcommand, e.g. `"pull"`. Used for log and error messages.
    pub fn verb(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}
