//! Configuration file support for cbuild2cmake.
//!
//! Two configuration file locations are read:
//! - Global: `<config dir>/cbuild2cmake/config.toml` - user-wide defaults
//! - Project: `<solution dir>/.cbuild2cmake/config.toml` - solution overrides
//!
//! Project config takes precedence over global config. Environment variables
//! (`CMSIS_PACK_ROOT`, `CMSIS_COMPILER_ROOT`) take precedence over both, see
//! [`crate::util::context`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// cbuild2cmake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directories
    pub roots: RootsConfig,

    /// Generation settings
    pub generate: GenerateConfig,

    /// Toolchain installations registered in addition to the environment
    #[serde(rename = "toolchain")]
    pub toolchains: Vec<ToolchainEntry>,
}

/// Root directory overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RootsConfig {
    /// CMSIS pack root (where packs are installed)
    pub pack_root: Option<PathBuf>,

    /// Directory holding the toolchain configuration files
    pub compiler_root: Option<PathBuf>,
}

/// Settings affecting the generated super project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenerateConfig {
    /// CMake generator used to configure every context (default: Ninja)
    pub generator: Option<String>,
}

/// A toolchain installation declared in a configuration file.
///
/// Equivalent to an `<NAME>_TOOLCHAIN_<major>_<minor>_<patch>` environment
/// variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainEntry {
    /// Toolchain name (e.g., AC6, GCC)
    pub name: String,

    /// Installed version (e.g., 6.21.0)
    pub version: String,

    /// Installation path (the toolchain's `bin` directory)
    pub path: PathBuf,
}

/// Default CMake generator.
pub const DEFAULT_GENERATOR: &str = "Ninja";

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Toolchain entries are combined; an entry of `other` replaces an entry
    /// with the same name and version.
    pub fn merge(&mut self, other: Config) {
        if other.roots.pack_root.is_some() {
            self.roots.pack_root = other.roots.pack_root;
        }
        if other.roots.compiler_root.is_some() {
            self.roots.compiler_root = other.roots.compiler_root;
        }
        if other.generate.generator.is_some() {
            self.generate.generator = other.generate.generator;
        }

        for entry in other.toolchains {
            self.toolchains
                .retain(|t| !(t.name == entry.name && t.version == entry.version));
            self.toolchains.push(entry);
        }
    }

    /// CMake generator for context projects.
    pub fn generator(&self) -> &str {
        self.generate.generator.as_deref().unwrap_or(DEFAULT_GENERATOR)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cbuild2cmake/config.toml)
/// 2. Global config (<config dir>/cbuild2cmake/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config path (`<config dir>/cbuild2cmake/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cbuild2cmake")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the project config path (`<solution dir>/.cbuild2cmake/config.toml`).
pub fn project_config_path(solution_root: &Path) -> PathBuf {
    solution_root.join(".cbuild2cmake").join("config.toml")
}
