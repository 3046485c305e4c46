use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::naming::ImageName;

/// Placeholder in the fetch command template.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Input to the image build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInput {
    pub base_image: String,
    pub model: String,
    pub image_name: ImageName,
    pub output: PathBuf,
    /// Argument vector run inside the container, model already substituted.
    pub fetch_command: Vec<String>,
}

impl WorkflowInput {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        if cfg.base_image.trim().is_empty() {
            bail!("base image must not be empty");
        }
        if cfg.model.trim().is_empty() {
            bail!("model must not be empty");
        }

        let words = shell_words::split(&cfg.fetch_command)
            .with_context(|| format!("invalid fetch command {:?}", cfg.fetch_command))?;
        if words.is_empty() {
            bail!("fetch command must not be empty");
        }
        let fetch_command = words
            .into_iter()
            .map(|word| word.replace(MODEL_PLACEHOLDER, &cfg.model))
            .collect();

        Ok(Self {
            base_image: cfg.base_image.clone(),
            model: cfg.model.clone(),
            image_name: ImageName::for_model(cfg.image_name.as_deref(), &cfg.model),
            output: cfg.output.clone(),
            fetch_command,
        })
    }
}

/// The six build stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pull,
    Create,
    Fetch,
    Stop,
    Commit,
    Export,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Pull,
        Stage::Create,
        Stage::Fetch,
        Stage::Stop,
        Stage::Commit,
        Stage::Export,
    ];

    pub fn number(self) -> usize {
        match self {
            Stage::Pull => 1,
            Stage::Create => 2,
            Stage::Fetch => 3,
            Stage::Stop => 4,
            Stage::Commit => 5,
            Stage::Export => 6,
        }
    }

    /// Progress line printed when the stage starts.
    pub fn banner(self, input: &WorkflowInput) -> String {
        let what = match self {
            Stage::Pull => format!("Pulling base image {}...", input.base_image),
            Stage::Create => "Creating temporary container...".to_string(),
            Stage::Fetch => format!("Pulling model {} inside the container...", input.model),
            Stage::Stop => "Stopping temporary container...".to_string(),
            Stage::Commit => format!(
                "Creating new image '{}' with the embedded model...",
                input.image_name
            ),
            Stage::Export => format!("Saving image to '{}'...", input.output.display()),
        };
        format!("==> {}. {what}", self.number())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Pull => "pull base image",
            Stage::Create => "create container",
            Stage::Fetch => "fetch model",
            Stage::Stop => "stop container",
            Stage::Commit => "commit image",
            Stage::Export => "export image",
        })
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub model: String,
    pub base_image: String,
    pub image: String,
    pub image_id: String,
    pub archive: PathBuf,
    pub archive_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_expected_input() {
        let input = WorkflowInput::from_config(&Config::default()).unwrap();
        assert_eq!(input.base_image, "ollama/ollama:latest");
        assert_eq!(input.image_name.to_string(), "ollama-with-deepseek-r1-1.5b:latest");
        assert_eq!(
            input.output,
            PathBuf::from("/app/output/ollama-deepseek-1.5b.tar")
        );
        assert_eq!(input.fetch_command, ["ollama", "pull", "deepseek-r1:1.5b"]);
    }

    #[test]
    fn explicit_image_name_is_split() {
        let cfg = Config {
            image_name: Some("custom:v2".into()),
            ..Config::default()
        };
        let input = WorkflowInput::from_config(&cfg).unwrap();
        assert_eq!(input.image_name.repository, "custom");
        assert_eq!(input.image_name.tag, "v2");
    }

    #[test]
    fn fetch_template_respects_quoting() {
        let cfg = Config {
            fetch_command: "sh -c 'ollama serve & sleep 2; ollama pull {model}'".into(),
            ..Config::default()
        };
        let input = WorkflowInput::from_config(&cfg).unwrap();
        assert_eq!(
            input.fetch_command,
            [
                "sh",
                "-c",
                "ollama serve & sleep 2; ollama pull deepseek-r1:1.5b"
            ]
        );
    }

    #[test]
    fn rejects_empty_fetch_command() {
        let cfg = Config {
            fetch_command: "   ".into(),
            ..Config::default()
        };
        assert!(WorkflowInput::from_config(&cfg).is_err());
    }

    #[test]
    fn rejects_unbalanced_quotes() {
        let cfg = Config {
            fetch_command: "ollama pull '{model}".into(),
            ..Config::default()
        };
        assert!(WorkflowInput::from_config(&cfg).is_err());
    }

    #[test]
    fn rejects_empty_base_image() {
        let cfg = Config {
            base_image: String::new(),
            ..Config::default()
        };
        assert!(WorkflowInput::from_config(&cfg).is_err());
    }

    #[test]
    fn report_serializes_with_field_names() {
        let report = BuildReport {
            model: "deepseek-r1:1.5b".into(),
            base_image: "ollama/ollama:latest".into(),
            image: "custom:v2".into(),
            image_id: "sha256:abc".into(),
            archive: PathBuf::from("/tmp/out.tar"),
            archive_bytes: 42,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["image"], "custom:v2");
        assert_eq!(json["archive"], "/tmp/out.tar");
        assert_eq!(json["archive_bytes"], 42);
    }

    #[test]
    fn banners_are_numbered_in_order() {
        let input = WorkflowInput::from_config(&Config::default()).unwrap();
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert!(stage.banner(&input).starts_with(&format!("==> {}. ", i + 1)));
        }
        assert_eq!(
            Stage::Commit.banner(&input),
            "==> 5. Creating new image 'ollama-with-deepseek-r1-1.5b:latest' with the embedded model..."
        );
    }
}
