//! Configuration loading from cssmig.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::Path};

use crate::component::{ComponentAttributor, ComponentTables};
use crate::error::CssmigError;
use crate::risk::RiskClassifier;
use crate::tokens::TokenMapping;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "cssmig.toml";

/// Main configuration structure for cssmig.toml.
#[derive(Debug, Deserialize, Default)]
pub struct CssmigConfig {
    /// Extra directory names pruned during discovery.
    pub exclude: Option<Vec<String>>,
    /// Suffix appended to backup copies (default `.bak`).
    pub backup_suffix: Option<String>,
    /// Risk property tables.
    pub risk: Option<RiskConfig>,
    /// Component attribution tables.
    pub components: Option<ComponentConfig>,
    /// Design-token migration table.
    pub tokens: Option<TokenConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Replaces the built-in risk sets when present.
#[derive(Debug, Deserialize, Default)]
pub struct RiskConfig {
    pub high: Option<Vec<String>>,
    pub medium: Option<Vec<String>>,
}

/// Appended to the built-in component tables.
#[derive(Debug, Deserialize, Default)]
pub struct ComponentConfig {
    pub exact: Option<BTreeMap<String, String>>,
    pub path_hints: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TokenConfig {
    pub mappings: Option<BTreeMap<String, String>>,
}

/// Output configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Directory for audit artifacts.
    pub dir: Option<String>,
    /// Console summary format: "plain" or "json".
    pub format: Option<String>,
}

impl CssmigConfig {
    pub fn excludes(&self) -> Vec<String> {
        self.exclude.clone().unwrap_or_default()
    }
}

/// Loads configuration from cssmig.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<CssmigConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content).map_err(|e| CssmigError::config(&path, e.message()))?;
    Ok(Some(cfg))
}

/// The immutable heuristic tables used by one run.
#[derive(Debug, Clone, Default)]
pub struct Heuristics {
    pub risk: RiskClassifier,
    pub components: ComponentAttributor,
    pub tokens: TokenMapping,
}

impl Heuristics {
    /// Built-in tables, extended or replaced by `config` where it says so.
    pub fn from_config(config: Option<&CssmigConfig>) -> Self {
        let risk = match config.and_then(|c| c.risk.as_ref()) {
            Some(risk) => {
                let defaults = RiskClassifier::default();
                let high = risk
                    .high
                    .clone()
                    .unwrap_or_else(|| defaults.high_props().map(String::from).collect());
                let medium = risk
                    .medium
                    .clone()
                    .unwrap_or_else(|| defaults.medium_props().map(String::from).collect());
                RiskClassifier::new(high, medium)
            }
            None => RiskClassifier::default(),
        };

        let tokens = match config
            .and_then(|c| c.tokens.as_ref())
            .and_then(|t| t.mappings.as_ref())
        {
            Some(mappings) => TokenMapping::new(mappings.clone()),
            None => TokenMapping::default(),
        };

        Self {
            risk,
            components: ComponentAttributor::new(ComponentTables::from_config(config)),
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("cssmig_{}_{}_{}", name, std::process::id(), n));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const SAMPLE: &str = r##"
exclude = ["dist", "vendor"]
backup_suffix = ".orig"

[risk]
high = ["color"]

[components]
exact = { "hero-banner" = "HeroBanner" }

[tokens]
mappings = { "--old" = "--new" }

[output]
dir = "out"
format = "json"
"##;

    #[test]
    fn test_parse_full_config() {
        let cfg: CssmigConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.excludes(), vec!["dist", "vendor"]);
        assert_eq!(cfg.backup_suffix.as_deref(), Some(".orig"));
        assert_eq!(cfg.output.as_ref().unwrap().format.as_deref(), Some("json"));
    }

    #[test]
    fn test_empty_config_is_default() {
        let cfg: CssmigConfig = toml::from_str("").unwrap();
        assert!(cfg.exclude.is_none());
        assert!(cfg.risk.is_none());
    }

    #[test]
    fn test_heuristics_from_config() {
        let cfg: CssmigConfig = toml::from_str(SAMPLE).unwrap();
        let heuristics = Heuristics::from_config(Some(&cfg));

        assert_eq!(heuristics.risk.classify(["color: red"]), RiskLevel::High);
        // medium set untouched
        assert_eq!(heuristics.risk.classify(["margin-top: 1px"]), RiskLevel::Medium);
        assert_eq!(
            heuristics.components.attribute("hero-banner", &BTreeSet::new()),
            "HeroBanner"
        );
        assert_eq!(heuristics.tokens.get("--old"), Some("--new"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = temp_dir("config_missing");
        assert!(load_config(&dir).unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = temp_dir("config_invalid");
        fs::write(dir.join(CONFIG_FILE), "exclude = 5").unwrap();
        let err = load_config(&dir).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CssmigError>(),
            Some(CssmigError::Config { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
