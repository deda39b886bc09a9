//! Toolchain selection for a context.
//!
//! The catalog is discovered once; selection is pure and deterministic, so
//! contexts can be resolved in parallel against a shared catalog.

use std::path::Path;

use semver::Version;

use crate::resolver::catalog::{config_files, registered_toolchains, Toolchain};
use crate::resolver::errors::ToolchainError;
use crate::resolver::version::Constraint;
use crate::util::config::Config;
use crate::util::fs::to_slash;

/// Compiler requirement of a context: `Name` or `Name@constraint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: Option<Constraint>,
}

impl Requirement {
    pub fn parse(compiler: &str) -> Result<Self, ToolchainError> {
        let (name, constraint) = match compiler.split_once('@') {
            Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
            None => (compiler.trim(), None),
        };

        let constraint = constraint
            .map(|source| {
                Constraint::parse(source).map_err(|reason| ToolchainError::InvalidConstraint {
                    name: name.to_string(),
                    constraint: source.to_string(),
                    reason,
                })
            })
            .transpose()?;

        Ok(Requirement {
            name: name.to_string(),
            constraint,
        })
    }
}

/// The installation and configuration file chosen for a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedToolchain {
    pub name: String,
    pub version: Version,
    /// Installation directory of the registered toolchain
    pub root: String,
    /// Configuration file, relative to the compiler root
    pub config: String,
}

/// Configuration files and registered installations available for
/// selection.
#[derive(Debug, Clone, Default)]
pub struct ToolchainCatalog {
    compiler_root: String,
    configs: Vec<Toolchain>,
    registered: Vec<Toolchain>,
}

impl ToolchainCatalog {
    /// Discover configuration files in `compiler_root` and installations
    /// registered through the environment or configuration.
    pub fn discover(
        compiler_root: &Path,
        env_vars: &[(String, String)],
        config: &Config,
    ) -> Result<Self, ToolchainError> {
        let configs = config_files(compiler_root)?;
        let registered = registered_toolchains(env_vars, config);
        Ok(ToolchainCatalog {
            compiler_root: to_slash(compiler_root),
            configs,
            registered,
        })
    }

    pub fn new(compiler_root: impl Into<String>, configs: Vec<Toolchain>, registered: Vec<Toolchain>) -> Self {
        ToolchainCatalog {
            compiler_root: compiler_root.into(),
            configs,
            registered,
        }
    }

    /// Select the toolchain for a `compiler:` requirement.
    pub fn select(&self, compiler: &str) -> Result<SelectedToolchain, ToolchainError> {
        let requirement = Requirement::parse(compiler)?;
        tracing::debug!(
            "context toolchain: {} - constraint: {}",
            requirement.name,
            requirement
                .constraint
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        );

        let (toolchain, config) = resolve_toolchain(&requirement, &self.configs, &self.registered)?;

        let config = config
            .path
            .strip_prefix(&self.compiler_root)
            .map(|rel| rel.trim_start_matches('/').to_string())
            .unwrap_or_else(|| config.path.clone());

        tracing::debug!(
            "latest compatible registered toolchain: {} {}",
            toolchain.name,
            toolchain.version
        );
        tracing::debug!("compatible config file: {}", config);

        Ok(SelectedToolchain {
            name: toolchain.name.clone(),
            version: toolchain.version.clone(),
            root: toolchain.path.clone(),
            config,
        })
    }
}

/// Pick the newest registered installation compatible with a
/// configuration file and with the requirement's constraint.
///
/// An installation is compatible with the newest configuration file whose
/// version it reaches. Returns the installation and that configuration.
pub fn resolve_toolchain<'a>(
    requirement: &Requirement,
    configs: &'a [Toolchain],
    registered: &'a [Toolchain],
) -> Result<(&'a Toolchain, &'a Toolchain), ToolchainError> {
    let mut configs: Vec<&Toolchain> = configs
        .iter()
        .filter(|config| config.name == requirement.name)
        .collect();
    if configs.is_empty() {
        return Err(ToolchainError::NoConfig {
            name: requirement.name.clone(),
        });
    }
    configs.sort_by(|a, b| b.version.cmp(&a.version));

    let mut installations: Vec<&Toolchain> = registered
        .iter()
        .filter(|toolchain| toolchain.name == requirement.name)
        .collect();
    installations.sort_by(|a, b| b.version.cmp(&a.version));

    for installation in &installations {
        let Some(config) = configs
            .iter()
            .find(|config| installation.version >= config.version)
        else {
            continue;
        };
        if let Some(constraint) = &requirement.constraint {
            if !constraint.matches(&installation.version) {
                continue;
            }
        }
        return Ok((*installation, *config));
    }

    Err(ToolchainError::NoCompatible {
        name: requirement.name.clone(),
        constraint: requirement.constraint.as_ref().map(ToString::to_string),
        registered: installations
            .iter()
            .map(|toolchain| toolchain.version.to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain(name: &str, version: &str, path: &str) -> Toolchain {
        Toolchain {
            name: name.to_string(),
            version: Version::parse(version).unwrap(),
            path: path.to_string(),
        }
    }

    fn catalog() -> ToolchainCatalog {
        ToolchainCatalog::new(
            "/etc/cmsis",
            vec![
                toolchain("AC6", "6.18.0", "/etc/cmsis/AC6.6.18.0.cmake"),
                toolchain("GCC", "13.2.1", "/etc/cmsis/GCC.13.2.1.cmake"),
            ],
            vec![
                toolchain("AC6", "6.19.0", "/run/path/to/ac619/bin"),
                toolchain("AC6", "6.21.0", "/run/path/to/ac621/bin"),
            ],
        )
    }

    #[test]
    fn test_minimum_version() {
        let selected = catalog().select("AC6@>=6.18.0").unwrap();
        assert_eq!(selected.version, Version::new(6, 21, 0));
        assert_eq!(selected.root, "/run/path/to/ac621/bin");
        assert_eq!(selected.config, "AC6.6.18.0.cmake");
    }

    #[test]
    fn test_exact_version() {
        let selected = catalog().select("AC6@6.19.0").unwrap();
        assert_eq!(selected.version, Version::new(6, 19, 0));
        assert_eq!(selected.root, "/run/path/to/ac619/bin");
    }

    #[test]
    fn test_without_constraint_takes_newest() {
        let selected = catalog().select("AC6").unwrap();
        assert_eq!(selected.version, Version::new(6, 21, 0));
    }

    #[test]
    fn test_unsatisfiable_constraint() {
        let err = catalog().select("AC6@>=6.22.0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no compatible registered toolchain was found for AC6"
        );
        match err {
            ToolchainError::NoCompatible { registered, .. } => {
                assert_eq!(registered, vec!["6.21.0", "6.19.0"])
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_installation_older_than_every_config() {
        let catalog = ToolchainCatalog::new(
            "/etc/cmsis",
            vec![toolchain("AC6", "6.20.0", "/etc/cmsis/AC6.6.20.0.cmake")],
            vec![toolchain("AC6", "6.19.0", "/ac619")],
        );
        assert!(matches!(
            catalog.select("AC6"),
            Err(ToolchainError::NoCompatible { .. })
        ));
    }

    #[test]
    fn test_missing_config_and_registration() {
        let err = catalog().select("IAR").unwrap_err();
        assert_eq!(err.to_string(), "no toolchain configuration file was found for IAR");

        let err = catalog().select("GCC").unwrap_err();
        assert_eq!(err.to_string(), "no compatible registered toolchain was found for GCC");
    }

    #[test]
    fn test_newest_reachable_config() {
        let configs = vec![
            toolchain("GCC", "10.3.1", "/etc/GCC.10.3.1.cmake"),
            toolchain("GCC", "12.2.0", "/etc/GCC.12.2.0.cmake"),
            toolchain("GCC", "14.2.1", "/etc/GCC.14.2.1.cmake"),
        ];
        let registered = vec![toolchain("GCC", "13.3.1", "/gcc13")];
        let requirement = Requirement::parse("GCC").unwrap();
        let (installation, config) = resolve_toolchain(&requirement, &configs, &registered).unwrap();
        assert_eq!(installation.path, "/gcc13");
        assert_eq!(config.version, Version::new(12, 2, 0));
    }

    #[test]
    fn test_invalid_constraint() {
        let err = Requirement::parse("AC6@>=six").unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidConstraint { .. }));
    }
}
