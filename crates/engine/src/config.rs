use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub name: String,
    pub sources: Vec<SourceConfig>,
    pub source_priority: Vec<String>,
    pub id_columns: Vec<String>,
    pub critical_columns: Vec<String>,
    pub output_dir: String,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Operator-declared aliases: canonical field → accepted source names.
    #[serde(default)]
    pub field_aliases: IndexMap<String, Vec<String>>,
}

fn default_similarity_threshold() -> f64 {
    0.9
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    pub path: String,
    /// Per-source overrides: source field name → canonical field.
    #[serde(default)]
    pub field_map: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Csv,
    Excel,
    Api,
    Pdf,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Excel => write!(f, "excel"),
            Self::Api => write!(f, "api"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sources.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one source is required".into(),
            ));
        }

        let mut seen: Vec<&str> = Vec::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "source names must not be empty".into(),
                ));
            }
            if seen.contains(&source.name.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            seen.push(&source.name);
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }

        if self.output_dir.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "output_dir must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Rank of a source in the configured priority list; sources missing
    /// from the list sort after every listed source.
    pub fn priority_index(&self, source: &str) -> usize {
        priority_index(&self.source_priority, source)
    }
}

pub fn priority_index(source_priority: &[String], source: &str) -> usize {
    source_priority
        .iter()
        .position(|s| s == source)
        .unwrap_or(999)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
