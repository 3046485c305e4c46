use std::io::Write;
use std::time::Duration;

use tracing::debug;

use crate::naming::ImageName;

use super::commands;
use super::error::EngineError;
use super::run::{self, Program};
use super::types::{ContainerId, ImageId};

/// The container-engine operations the image build needs.
///
/// Streaming operations write their output to `out` as it arrives and return
/// once the engine has closed the stream.
pub trait Engine {
    /// Make `image` present locally, pulling it if absent.
    fn pull(&self, image: &str) -> Result<(), EngineError>;

    /// Start a detached container with a pseudo-terminal.
    fn run_detached(&self, image: &str) -> Result<ContainerId, EngineError>;

    /// Run `command` inside the container. The command's own exit status is
    /// not reported; only failures of the engine itself are errors.
    fn exec(
        &self,
        id: &ContainerId,
        command: &[String],
        out: &mut dyn Write,
    ) -> Result<(), EngineError>;

    fn stop(&self, id: &ContainerId) -> Result<(), EngineError>;

    fn commit(&self, id: &ContainerId, name: &ImageName) -> Result<ImageId, EngineError>;

    /// Stream the image archive. Returns the number of bytes written.
    fn export(&self, image: &ImageId, out: &mut dyn Write) -> Result<u64, EngineError>;

    /// Force-remove the container, stopping it first if needed.
    fn remove(&self, id: &ContainerId) -> Result<(), EngineError>;
}

/// [`Engine`] backed by the `docker` command-line client talking to the
/// daemon's control socket.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: Program,
    timeout: Duration,
}

impl DockerCli {
    /// `host` is passed as `--host` (e.g. `unix:///var/run/docker.sock`);
    /// `None` leaves the choice to `DOCKER_HOST` and the active context.
    /// `timeout` bounds each container lifecycle request.
    pub fn new(binary: impl Into<String>, host: Option<&str>, timeout: Duration) -> Self {
        Self {
            program: Program {
                binary: binary.into(),
                global_args: commands::global_args(host),
            },
            timeout,
        }
    }

    /// Verify that the Docker daemon is reachable.
    pub fn ensure_available(&self) -> Result<String, EngineError> {
        let version = run::capture(&self.program, &commands::version_command(self.timeout))?;
        debug!(%version, "docker daemon reachable");
        Ok(version)
    }

    fn capture_id(&self, cmd: &super::DockerCommand) -> Result<String, EngineError> {
        let stdout = run::capture(&self.program, cmd)?;
        // `docker run` may print pull progress before the id; the id is last.
        match stdout.lines().last().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(EngineError::EmptyOutput {
                verb: cmd.verb().to_string(),
            }),
        }
    }
}

impl Engine for DockerCli {
    fn pull(&self, image: &str) -> Result<(), EngineError> {
        run::capture(&self.program, &commands::pull_command(image))?;
        Ok(())
    }

    fn run_detached(&self, image: &str) -> Result<ContainerId, EngineError> {
        self.capture_id(&commands::run_command(image, self.timeout))
            .map(ContainerId::new)
    }

    fn exec(
        &self,
        id: &ContainerId,
        command: &[String],
        out: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let outcome = run::stream(&self.program, &commands::exec_command(id, command), out)?;
        // With a tty the command's stderr is merged into stdout, so anything
        // on docker's own stderr came from the client or the daemon.
        if !outcome.status.success() && !outcome.stderr.trim().is_empty() {
            return outcome.into_result("exec").map(|_| ());
        }
        debug!(status = %outcome.status, bytes = outcome.bytes, "exec finished");
        Ok(())
    }

    fn stop(&self, id: &ContainerId) -> Result<(), EngineError> {
        run::capture(&self.program, &commands::stop_command(id, self.timeout))?;
        Ok(())
    }

    fn commit(&self, id: &ContainerId, name: &ImageName) -> Result<ImageId, EngineError> {
        self.capture_id(&commands::commit_command(id, name, self.timeout))
            .map(ImageId::new)
    }

    fn export(&self, image: &ImageId, out: &mut dyn Write) -> Result<u64, EngineError> {
        run::stream(&self.program, &commands::save_command(image), out)?.into_result("save")
    }

    fn remove(&self, id: &ContainerId) -> Result<(), EngineError> {
        run::capture(&self.program, &commands::remove_command(id, self.timeout))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_available_does_not_panic() {
        // We only assert it doesn't panic; CI may or may not have Docker.
        let cli = DockerCli::new("docker", None, Duration::from_secs(5));
        let _ = cli.ensure_available();
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let cli = DockerCli::new("no-such-docker-binary", None, Duration::from_secs(5));
        let err = cli.pull("ollama/ollama:latest").unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[test]
    fn host_becomes_global_flag() {
        let cli = DockerCli::new(
            "docker",
            Some("unix:///var/run/docker.sock"),
            Duration::from_secs(600),
        );
        assert_eq!(
            cli.program.global_args,
            ["--host", "unix:///var/run/docker.sock"]
        );
    }
}
