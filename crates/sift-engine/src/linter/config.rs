//! Lint configuration: per-rule enable/disable and worker count.
//!
//! Loaded from the `[lint]` table of `sift.toml`:
//!
//! ```toml
//! [lint]
//! jobs = 4
//!
//! [lint.rules]
//! redundant-filter = "off"
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Whether a rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetting {
    /// Rule is disabled.
    Off,
    /// Rule runs (the default).
    On,
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not valid TOML or has the wrong shape.
    #[error("invalid lint configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// `jobs = 0`
    #[error("`jobs` must be at least 1")]
    ZeroJobs,
}

/// Configuration for the linter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Worker threads for batch linting; `None` means one per CPU.
    pub jobs: Option<usize>,
    /// Per-rule settings. Key = rule name (e.g. "unsafe-rethrow").
    rules: HashMap<String, RuleSetting>,
}

/// Top level of `sift.toml`; only `[lint]` is read.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    lint: LintConfig,
}

impl LintConfig {
    /// Create a new empty config (all rules enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `[lint]` table out of a full `sift.toml`.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let manifest: Manifest = toml::from_str(text)?;
        if manifest.lint.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        Ok(manifest.lint)
    }

    /// Enable or disable a rule by name.
    pub fn set_rule(&mut self, rule_name: &str, setting: RuleSetting) {
        self.rules.insert(rule_name.to_string(), setting);
    }

    /// Check if a rule is explicitly disabled.
    pub fn is_disabled(&self, rule_name: &str) -> bool {
        self.rules.get(rule_name) == Some(&RuleSetting::Off)
    }

    /// Rule names mentioned in the config, for validation against the
    /// registry.
    pub fn configured_rules(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LintConfig::new();
        assert!(!config.is_disabled("unsafe-rethrow"));
        assert_eq!(config.jobs, None);
    }

    #[test]
    fn test_disable_rule() {
        let mut config = LintConfig::new();
        config.set_rule("redundant-filter", RuleSetting::Off);

        assert!(config.is_disabled("redundant-filter"));
        assert!(!config.is_disabled("unsafe-rethrow"));
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
[package]
name = "app"

[lint]
jobs = 2

[lint.rules]
redundant-filter = "off"
unsafe-rethrow = "on"
"#;
        let config = LintConfig::from_toml(text).unwrap();
        assert_eq!(config.jobs, Some(2));
        assert!(config.is_disabled("redundant-filter"));
        assert!(!config.is_disabled("unsafe-rethrow"));
    }

    #[test]
    fn test_from_toml_without_lint_table() {
        let config = LintConfig::from_toml("[package]\nname = \"app\"\n").unwrap();
        assert!(config.configured_rules().next().is_none());
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(matches!(
            LintConfig::from_toml("[lint.rules]\nunsafe-rethrow = \"loud\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            LintConfig::from_toml("[lint]\njobs = 0\n"),
            Err(ConfigError::ZeroJobs)
        ));
    }
}
