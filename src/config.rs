//! Processor configuration
//!
//! Loads `ProcessorConfig` from YAML. Every field has a default, so an empty
//! file (or no file at all) yields the default configuration.
//!
//! ```yaml
//! style_scope: global          # global | per_surface
//! dangling_references: omit    # omit | fail
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where `beginRendering` styles are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleScope {
    /// Styles are kept on the surface and also merged into one process-wide
    /// map (last writer wins across surfaces).
    #[default]
    Global,
    /// Styles are kept on the surface only.
    PerSurface,
}

/// What a rebuild does when a child reference names an unregistered component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingReferencePolicy {
    /// Leave the child out of the tree; it appears once the component arrives.
    #[default]
    Omit,
    /// Fail the rebuild with `BuildError::DanglingReference`.
    Fail,
}

/// Processor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub style_scope: StyleScope,
    pub dangling_references: DanglingReferencePolicy,
}

impl ProcessorConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse processor configuration")
    }
}

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Environment variable naming an explicit config file.
    pub const ENV_VAR: &'static str = "SURFACE_MODEL_CONFIG";

    /// Config file picked up when present in the working directory.
    pub const DEFAULT_PATH: &'static str = "config/processor.yaml";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Loader that always yields the default configuration.
    pub fn defaults() -> Self {
        Self { path: None }
    }

    /// Create loader from SURFACE_MODEL_CONFIG or the default path
    ///
    /// Path resolution order:
    /// 1. SURFACE_MODEL_CONFIG environment variable (explicit override)
    /// 2. Relative "config/processor.yaml" if it exists
    /// 3. No file: built-in defaults
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(Self::ENV_VAR) {
            return Self::new(path);
        }

        if Path::new(Self::DEFAULT_PATH).exists() {
            return Self::new(Self::DEFAULT_PATH);
        }

        Self::defaults()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the configuration.
    ///
    /// # Errors
    /// Fails if a file was named but cannot be read or parsed.
    pub fn load(&self) -> Result<ProcessorConfig> {
        let Some(path) = &self.path else {
            info!("No processor configuration file, using defaults");
            return Ok(ProcessorConfig::default());
        };

        info!("Loading processor configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = ProcessorConfig::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!(
            "Loaded processor configuration: style_scope={:?}, dangling_references={:?}",
            config.style_scope, config.dangling_references
        );

        Ok(config)
    }
}
