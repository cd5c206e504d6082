use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory walked for ontology files
    pub input_dir: PathBuf,
    /// Root of the mirrored output tree
    pub output_dir: PathBuf,
    /// File extension identifying Turtle files, without the dot
    pub extension: String,
    pub root_url: String,
    /// Public URL the output tree is served from
    pub html_root_url: String,
    /// Public URL the raw Turtle sources are served from
    pub source_root_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    pub missing_predicate: MissingPredicatePolicy,
}

/// What to do with a property that lacks `rdfs:domain` or `rdfs:range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPredicatePolicy {
    /// Log it and drop that one record
    #[default]
    SkipRecord,
    /// Skip the whole file
    AbortFile,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("./meta/html/"),
            extension: "ttl".to_string(),
            root_url: "https://ukparliament.github.io/ontologies/".to_string(),
            html_root_url: "https://ukparliament.github.io/ontologies/meta/html/".to_string(),
            source_root_url: "https://raw.githubusercontent.com/ukparliament/ontologies/master/"
                .to_string(),
            template: None,
            missing_predicate: MissingPredicatePolicy::SkipRecord,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON config: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.extension.trim().is_empty() {
            anyhow::bail!("No ontology file extension defined");
        }

        for (name, value) in [
            ("root_url", &self.root_url),
            ("html_root_url", &self.html_root_url),
            ("source_root_url", &self.source_root_url),
        ] {
            Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
        }

        if let Some(ref template) = self.template {
            if !template.is_file() {
                anyhow::bail!("Template file does not exist: {}", template.display());
            }
        }

        Ok(())
    }

    /// Extension without a leading dot, so `.ttl` and `ttl` behave alike.
    pub fn normalized_extension(&self) -> &str {
        self.extension.trim().trim_start_matches('.')
    }

    /// Create an example configuration listing every setting
    pub fn example() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_published_site() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./meta/html/"));
        assert_eq!(config.extension, "ttl");
        assert_eq!(config.missing_predicate, MissingPredicatePolicy::SkipRecord);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "output_dir: site\nmissing_predicate: abort-file").unwrap();

        let config = SiteConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("site"));
        assert_eq!(config.missing_predicate, MissingPredicatePolicy::AbortFile);
        assert_eq!(config.extension, "ttl");
    }

    #[test]
    fn test_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"extension": ".owl.ttl", "root_url": "https://example.org/"}}"#).unwrap();

        let config = SiteConfig::from_file(file.path()).unwrap();
        assert_eq!(config.normalized_extension(), "owl.ttl");
        assert_eq!(config.root_url, "https://example.org/");
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&SiteConfig::example()).unwrap();
        assert!(yaml.contains("missing_predicate: skip-record"));
        let parsed: SiteConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, SiteConfig::example());
    }

    #[test]
    fn test_validate_rejects_missing_template() {
        let config = SiteConfig {
            template: Some(PathBuf::from("/definitely/not/here.hbs")),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = SiteConfig {
            html_root_url: "not a url".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let config = SiteConfig {
            extension: "  ".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
