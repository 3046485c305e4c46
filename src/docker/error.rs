use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures talking to the container engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to invoke `{binary}` (is it installed and on PATH?)")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("`docker {verb}` failed ({status}): {stderr}")]
    Failed {
        verb: String,
        status: String,
        stderr: String,
    },

    #[error("`docker {verb}` timed out after {}s", .after.as_secs())]
    TimedOut { verb: String, after: Duration },

    #[error("`docker {verb}` printed no identifier")]
    EmptyOutput { verb: String },

    #[error("i/o error while streaming `docker {verb}` output")]
    Io {
        verb: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_message_includes_stderr() {
        let err = EngineError::Failed {
            verb: "pull".into(),
            status: "exit status: 1".into(),
            stderr: "manifest unknown".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker pull"));
        assert!(msg.contains("manifest unknown"));
    }

    #[test]
    fn timed_out_message_reports_seconds() {
        let err = EngineError::TimedOut {
            verb: "stop".into(),
            after: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "`docker stop` timed out after 600s");
    }
}
