//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treemgr/treemgr.toml`
//! 3. Local config: `<dir>/.treemgr.toml` (usually the working directory)
//! 4. Environment variables: `TREEMGR_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::util::path::expand_env_vars;

/// Raw settings for intermediate parsing (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub update_on_searching: Option<bool>,
    pub dump_all_attributes: Option<bool>,
    pub max_depth: Option<usize>,
    pub show_hidden: Option<bool>,
    pub ignore: Option<Vec<String>>,
    pub layout_dir: Option<PathBuf>,
}

/// Unified configuration for treemgr.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Populate tree levels on demand while resolving paths
    pub update_on_searching: bool,
    /// Show every attribute in dumps
    pub dump_all_attributes: bool,
    /// Levels of a directory tree to materialize
    pub max_depth: usize,
    /// Include dot-files in directory trees
    pub show_hidden: bool,
    /// Regex patterns of entry names to skip
    pub ignore: Vec<String>,
    /// Directory searched for layout files given by name
    pub layout_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_on_searching: false,
            dump_all_attributes: false,
            max_depth: 2,
            show_hidden: false,
            ignore: vec!["^\\.git$".into(), "^target$".into()],
            layout_dir: None,
        }
    }
}

/// Get the XDG config directory for treemgr.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treemgr").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treemgr.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treemgr.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are dropped, base order is kept
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = overlay.iter().filter_map(|p| p.strip_prefix('!')).collect();
    let mut result: Vec<String> = Vec::new();
    for item in base.iter().chain(overlay.iter().filter(|p| !p.starts_with('!'))) {
        if !removed.contains(item.as_str()) && !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.layout_dir {
            self.layout_dir = Some(PathBuf::from(expand_env_vars(&dir.to_string_lossy())));
        }
    }

    /// Scalars: overlay wins if set. `ignore`: union with negation.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            ignore: overlay
                .ignore
                .as_ref()
                .map(|o| merge_array(&self.ignore, o))
                .unwrap_or_else(|| self.ignore.clone()),
            ..self.apply_scalars(overlay)
        }
    }

    /// Scalars: global wins if set. `ignore`: REPLACES the compiled default.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            ignore: global.ignore.clone().unwrap_or_else(|| self.ignore.clone()),
            ..self.apply_scalars(global)
        }
    }

    fn apply_scalars(&self, raw: &RawSettings) -> Self {
        Self {
            update_on_searching: raw.update_on_searching.unwrap_or(self.update_on_searching),
            dump_all_attributes: raw.dump_all_attributes.unwrap_or(self.dump_all_attributes),
            max_depth: raw.max_depth.unwrap_or(self.max_depth),
            show_hidden: raw.show_hidden.unwrap_or(self.show_hidden),
            ignore: self.ignore.clone(),
            layout_dir: raw.layout_dir.clone().or_else(|| self.layout_dir.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treemgr.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with negation support (`"!^target$"` removes)
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = local_dir.map(local_config_path).filter(|p| p.exists());
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Layered load from explicit files (absent files are skipped).
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global {
            debug!("global config: {}", path.display());
            current = current.apply_global(&load_raw_settings(path)?);
        }
        if let Some(path) = local {
            debug!("local config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        Ok(current)
    }

    /// Apply TREEMGR_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEMGR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ignore")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("update_on_searching") {
            settings.update_on_searching = val;
        }
        if let Ok(val) = config.get_bool("dump_all_attributes") {
            settings.dump_all_attributes = val;
        }
        if let Ok(val) = config.get::<usize>("max_depth") {
            settings.max_depth = val;
        }
        if let Ok(val) = config.get_bool("show_hidden") {
            settings.show_hidden = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("ignore") {
            settings.ignore = val;
        }
        if let Ok(val) = config.get_string("layout_dir") {
            settings.layout_dir = Some(PathBuf::from(val));
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treemgr configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treemgr/treemgr.toml
#   Local:  ./.treemgr.toml
#   Env:    TREEMGR_* environment variables
#
# Local `ignore` entries are added to the global ones; "!pattern" removes one.

# Populate levels on demand while resolving paths
# update_on_searching = false

# Show all node attributes in dumps
# dump_all_attributes = false

# Directory levels to materialize
# max_depth = 2

# Include dot-files
# show_hidden = false

# Entry names to skip (regular expressions)
# ignore = ["^\\.git$", "^target$"]

# Where `treemgr layout <name>` looks for <name>.toml
# layout_dir = "~/.config/treemgr/layouts"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
