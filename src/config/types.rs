use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one image build. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_image: String,
    pub model: String,
    pub output: PathBuf,
    /// `repository[:tag]` for the committed image. Derived from the model
    /// when unset.
    pub image_name: Option<String>,
    /// Command run inside the container; `{model}` is replaced by the model.
    pub fetch_command: String,
    pub docker_binary: String,
    pub docker_host: Option<String>,
    /// Seconds allowed for each container lifecycle request.
    pub docker_timeout: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.docker_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_image: "ollama/ollama:latest".to_string(),
            model: "deepseek-r1:1.5b".to_string(),
            output: PathBuf::from("/app/output/ollama-deepseek-1.5b.tar"),
            image_name: None,
            fetch_command: "ollama pull {model}".to_string(),
            docker_binary: "docker".to_string(),
            docker_host: None,
            docker_timeout: 600,
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_image: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub image_name: Option<String>,
    pub docker_host: Option<String>,
    pub docker_timeout: Option<u64>,
}

impl Config {
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(v) = overrides.base_image {
            self.base_image = v;
        }
        if let Some(v) = overrides.model {
            self.model = v;
        }
        if let Some(v) = overrides.output {
            self.output = v;
        }
        if overrides.image_name.is_some() {
            self.image_name = overrides.image_name;
        }
        if overrides.docker_host.is_some() {
            self.docker_host = overrides.docker_host;
        }
        if let Some(v) = overrides.docker_timeout {
            self.docker_timeout = v;
        }
        self
    }
}
