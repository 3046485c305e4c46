use std::time::Duration;

use crate::naming::ImageName;

use super::types::{ContainerId, DockerCommand, ImageId};

/// `docker pull --quiet <image>`. Waits for the engine however long the
/// registry takes.
pub fn pull_command(image: &str) -> DockerCommand {
    DockerCommand::new(vec!["pull".into(), "--quiet".into(), image.into()])
}

/// `docker run --detach --tty <image>`. The tty keeps the runtime's
/// interactive progress output visible to later `exec` calls.
pub fn run_command(image: &str, timeout: Duration) -> DockerCommand {
    DockerCommand::new(vec![
        "run".into(),
        "--detach".into(),
        "--tty".into(),
        image.into(),
    ])
    .with_timeout(timeout)
}

/// `docker exec --tty <id> <command...>`. With a tty the command's stdout and
/// stderr arrive merged on one stream.
pub fn exec_command(id: &ContainerId, command: &[String]) -> DockerCommand {
    let mut args = vec!["exec".into(), "--tty".into(), id.to_string()];
    args.extend(command.iter().cloned());
    DockerCommand::new(args)
}

/// `docker stop <id>` with the engine's default grace period.
pub fn stop_command(id: &ContainerId, timeout: Duration) -> DockerCommand {
    DockerCommand::new(vec!["stop".into(), id.to_string()]).with_timeout(timeout)
}

pub fn commit_command(id: &ContainerId, name: &ImageName, timeout: Duration) -> DockerCommand {
    DockerCommand::new(vec!["commit".into(), id.to_string(), name.to_string()])
        .with_timeout(timeout)
}

/// `docker save <image>`. The archive is written to stdout.
pub fn save_command(image: &ImageId) -> DockerCommand {
    DockerCommand::new(vec!["save".into(), image.to_string()])
}

/// `docker rm --force <id>`. Force implies stopping a running container.
pub fn remove_command(id: &ContainerId, timeout: Duration) -> DockerCommand {
    DockerCommand::new(vec!["rm".into(), "--force".into(), id.to_string()])
        .with_timeout(timeout)
}

pub fn version_command(timeout: Duration) -> DockerCommand {
    DockerCommand::new(vec![
        "version".into(),
        "--format".into(),
        "{{.Server.Version}}".into(),
    ])
    .with_timeout(timeout)
}

/// Global flags placed before every subcommand.
pub fn global_args(host: Option<&str>) -> Vec<String> {
    match host {
        Some(host) => vec!["--host".into(), host.into()],
        None => Vec::new(),
    }
}
