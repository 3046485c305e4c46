//! Target image names: deriving one from a model identifier and splitting a
//! `repository[:tag]` string for `docker commit`.

use std::fmt;

pub const DEFAULT_TAG: &str = "latest";
const DERIVED_PREFIX: &str = "ollama-with-";

/// A `(repository, tag)` pair for the committed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageName {
    pub repository: String,
    pub tag: String,
}

impl ImageName {
    /// Split at the first `:`. Without a colon, or with nothing after it, the
    /// tag is `latest`.
    pub fn parse(name: &str) -> Self {
        let (repository, tag) = match name.split_once(':') {
            Some((repo, tag)) if !tag.is_empty() => (repo, tag),
            Some((repo, _)) => (repo, DEFAULT_TAG),
            None => (name, DEFAULT_TAG),
        };
        Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Use the explicit name when given, otherwise derive one from the model.
    pub fn for_model(explicit: Option<&str>, model: &str) -> Self {
        match explicit {
            Some(name) => Self::parse(name),
            None => Self::parse(&derive_image_name(model)),
        }
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// `ollama-with-<model>` with every `:` turned into `-`.
pub fn derive_image_name(model: &str) -> String {
    format!("{DERIVED_PREFIX}{}", model.replace(':', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_name_replaces_colon() {
        let name = derive_image_name("deepseek-r1:1.5b");
        assert_eq!(name, "ollama-with-deepseek-r1-1.5b");
        assert!(!name.contains(':'));
    }

    #[test]
    fn derived_name_replaces_every_colon() {
        for model in ["a:b", "llama3:8b:q4", "qwen2.5-coder:7b", "x:"] {
            let name = derive_image_name(model);
            assert!(!name.contains(':'), "{name} still has a colon");
            assert!(name.starts_with("ollama-with-"));
        }
    }

    #[test]
    fn derived_name_defaults_to_latest() {
        let name = ImageName::for_model(None, "deepseek-r1:1.5b");
        assert_eq!(name.to_string(), "ollama-with-deepseek-r1-1.5b:latest");
    }

    #[test]
    fn explicit_name_splits_repository_and_tag() {
        let name = ImageName::for_model(Some("custom:v2"), "deepseek-r1:1.5b");
        assert_eq!(name.repository, "custom");
        assert_eq!(name.tag, "v2");
    }

    #[test]
    fn name_without_colon_gets_latest() {
        let name = ImageName::parse("custom");
        assert_eq!(name.repository, "custom");
        assert_eq!(name.tag, "latest");
    }

    #[test]
    fn split_happens_at_first_colon() {
        let name = ImageName::parse("repo:tag:extra");
        assert_eq!(name.repository, "repo");
        assert_eq!(name.tag, "tag:extra");
    }

    #[test]
    fn trailing_colon_gets_latest() {
        let name = ImageName::parse("repo:");
        assert_eq!(name.repository, "repo");
        assert_eq!(name.tag, "latest");
    }
}
