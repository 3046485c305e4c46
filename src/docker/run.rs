use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use super::error::EngineError;
use super::types::DockerCommand;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const CHUNK_SIZE: usize = 64 * 1024;

/// The `docker` binary plus the global flags placed before every subcommand
/// (for example `--host unix:///var/run/docker.sock`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub binary: String,
    pub global_args: Vec<String>,
}

impl Program {
    fn command(&self, cmd: &DockerCommand) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(&self.global_args).args(&cmd.args);
        command
    }

    fn spawn(&self, cmd: &DockerCommand) -> Result<Child, EngineError> {
        debug!(binary = %self.binary, args = ?cmd.args, "invoking docker");
        self.command(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                binary: self.binary.clone(),
                source,
            })
    }
}

/// What a streamed invocation left behind once its output was exhausted.
#[derive(Debug)]
pub struct StreamOutcome {
    pub bytes: u64,
    pub status: ExitStatus,
    pub stderr: String,
}

impl StreamOutcome {
    pub fn into_result(self, verb: &str) -> Result<u64, EngineError> {
        if self.status.success() {
            Ok(self.bytes)
        } else {
            Err(failed(verb, self.status, &self.stderr))
        }
    }
}

/// Run a command to completion and return its trimmed stdout.
///
/// With a timeout set the pipes are only read after the process exits, so
/// that path is for commands with small output (ids, acknowledgements).
pub fn capture(program: &Program, cmd: &DockerCommand) -> Result<String, EngineError> {
    let verb = cmd.verb().to_string();
    let mut child = program.spawn(cmd)?;

    let (status, stdout, stderr) = match cmd.timeout {
        None => {
            let output = child.wait_with_output().map_err(|source| EngineError::Io {
                verb: verb.clone(),
                source,
            })?;
            (
                output.status,
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            )
        }
        Some(timeout) => {
            let status = wait_with_timeout(&mut child, timeout, &verb)?;
            let stdout = read_pipe(child.stdout.take(), &verb)?;
            let stderr = read_pipe(child.stderr.take(), &verb)?;
            (status, stdout, stderr)
        }
    };

    if !status.success() {
        return Err(failed(&verb, status, &stderr));
    }
    Ok(stdout.trim().to_string())
}

/// Run a command and copy its stdout to `out` chunk by chunk, in order,
/// until the process closes the pipe.
///
/// The exit status is returned rather than checked so callers decide what a
/// non-zero exit means.
pub fn stream(
    program: &Program,
    cmd: &DockerCommand,
    out: &mut dyn Write,
) -> Result<StreamOutcome, EngineError> {
    let verb = cmd.verb().to_string();
    let mut child = program.spawn(cmd)?;
    let io_err = |source| EngineError::Io {
        verb: verb.clone(),
        source,
    };

    let mut bytes = 0u64;
    if let Some(mut stdout) = child.stdout.take() {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(io_err(e));
                }
            };
            if let Err(e) = out.write_all(&buf[..n]) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io_err(e));
            }
            bytes += n as u64;
        }
    }
    out.flush().map_err(io_err)?;

    let stderr = read_pipe(child.stderr.take(), &verb)?;
    let status = child.wait().map_err(io_err)?;
    debug!(verb = %verb, bytes, %status, "docker stream finished");

    Ok(StreamOutcome {
        bytes,
        status,
        stderr,
    })
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    verb: &str,
) -> Result<ExitStatus, EngineError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(source) => {
                return Err(EngineError::Io {
                    verb: verb.to_string(),
                    source,
                });
            }
        }

        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::TimedOut {
                verb: verb.to_string(),
                after: timeout,
            });
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn read_pipe<R: Read>(pipe: Option<R>, verb: &str) -> Result<String, EngineError> {
    let mut raw = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut raw)
            .map_err(|source| EngineError::Io {
                verb: verb.to_string(),
                source,
            })?;
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn failed(verb: &str, status: ExitStatus, stderr: &str) -> EngineError {
    EngineError::Failed {
        verb: verb.to_string(),
        status: status.to_string(),
        stderr: stderr.trim().to_string(),
    }
}
