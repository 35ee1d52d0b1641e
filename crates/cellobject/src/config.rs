//! Container-wide configuration.
//!
//! [`CollectionConfig`] holds the layout values used for sections that do not
//! override them, and the scheduler's queueing policy. It can be built in code
//! or loaded from TOML or JSON:
//!
//! ```
//! use cellobject::{CollectionConfig, UpdatePolicy};
//!
//! let config = CollectionConfig::from_toml_str(r#"
//!     minimum_line_spacing = 8.0
//!     update_policy = "coalesce_latest"
//!
//!     [section_inset]
//!     left = 16.0
//!     right = 16.0
//! "#)?;
//!
//! assert_eq!(config.minimum_line_spacing, 8.0);
//! assert_eq!(config.minimum_interitem_spacing, 0.0);
//! assert_eq!(config.section_inset.horizontal(), 32.0);
//! assert_eq!(config.update_policy, UpdatePolicy::CoalesceLatest);
//! # Ok::<(), cellobject::ConfigError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::EdgeInsets;
use crate::model::SectionLayout;
use crate::view::UpdatePolicy;

/// Defaults shared by every section of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub minimum_line_spacing: f32,
    pub minimum_interitem_spacing: f32,
    pub update_policy: UpdatePolicy,
    pub section_inset: EdgeInsets,
}

impl CollectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.minimum_line_spacing = spacing;
        self
    }

    pub fn with_interitem_spacing(mut self, spacing: f32) -> Self {
        self.minimum_interitem_spacing = spacing;
        self
    }

    pub fn with_section_inset(mut self, inset: EdgeInsets) -> Self {
        self.section_inset = inset;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// The configured values as a fully populated [`SectionLayout`].
    pub fn section_defaults(&self) -> SectionLayout {
        SectionLayout::new()
            .with_line_spacing(self.minimum_line_spacing)
            .with_interitem_spacing(self.minimum_interitem_spacing)
            .with_inset(self.section_inset)
    }

    /// Resolves `overrides` against these defaults.
    pub fn resolve(&self, overrides: Option<&SectionLayout>) -> ResolvedLayout {
        let layout = overrides.copied().unwrap_or_default();
        ResolvedLayout {
            minimum_line_spacing: layout
                .minimum_line_spacing
                .unwrap_or(self.minimum_line_spacing),
            minimum_interitem_spacing: layout
                .minimum_interitem_spacing
                .unwrap_or(self.minimum_interitem_spacing),
            inset: layout.inset.unwrap_or(self.section_inset),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a `.toml` or `.json` file, picking the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Section layout values with every default applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayout {
    pub minimum_line_spacing: f32,
    pub minimum_interitem_spacing: f32,
    pub inset: EdgeInsets,
}
