use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use linkhub_theme::{ThemeCatalog, ThemeResolver};
use linkhub_types::DEFAULT_BASE_THEME;

use crate::error::{DashboardError, DashboardResult};

/// What happens to the positions of the remaining links when one is
/// removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalPolicy {
    /// Links after the removed one shift down by one, in the same write.
    #[default]
    Renumber,
    /// Positions are left untouched; ordering treats them as sort keys.
    LeaveGap,
}

/// Configuration for a [`Dashboard`](crate::Dashboard).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub removal_policy: RemovalPolicy,
    /// Buffered user-facing notices per receiver before older ones are
    /// dropped.
    pub notice_capacity: usize,
    /// Base theme for new profiles and for profiles naming an unknown theme.
    pub default_theme: String,
    /// Extra theme catalog merged over the built-in one.
    pub theme_catalog: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            removal_policy: RemovalPolicy::Renumber,
            notice_capacity: 16,
            default_theme: DEFAULT_BASE_THEME.to_string(),
            theme_catalog: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(raw: &str) -> DashboardResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a TOML file. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> DashboardResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Build the theme resolver this configuration describes: the built-in
    /// catalog, extended by `theme_catalog` if set.
    pub fn resolver(&self) -> DashboardResult<ThemeResolver> {
        let mut catalog = ThemeCatalog::builtin();
        if let Some(path) = &self.theme_catalog {
            catalog.merge(ThemeCatalog::load(path)?);
        }
        Ok(ThemeResolver::new(catalog, self.default_theme.clone())?)
    }
}
