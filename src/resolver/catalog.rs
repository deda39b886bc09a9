//! Discovery of toolchain configuration files and registered installations.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::resolver::errors::ToolchainError;
use crate::util::config::Config;
use crate::util::fs::to_slash;

static CONFIG_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\.(\d+)\.(\d+)\.(\d+)\.cmake$").expect("valid config file pattern")
});

static REGISTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)_TOOLCHAIN_(\d+)_(\d+)_(\d+)$").expect("valid registration pattern")
});

/// A toolchain known by name and version, located at `path`.
///
/// For configuration files `path` is the `.cmake` file; for registered
/// installations it is the installation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub name: String,
    pub version: Version,
    pub path: String,
}

fn version_from(captures: &regex::Captures<'_>) -> Option<Version> {
    let part = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();
    Some(Version::new(part(2)?, part(3)?, part(4)?))
}

/// Scan `compiler_root` for `<Name>.<major>.<minor>.<patch>.cmake` files.
///
/// Results are sorted by file name.
pub fn config_files(compiler_root: &Path) -> Result<Vec<Toolchain>, ToolchainError> {
    let root = to_slash(compiler_root);
    let entries = std::fs::read_dir(compiler_root)
        .map_err(|_| ToolchainError::CompilerRoot { path: root.clone() })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut configs = Vec::new();
    for file_name in names {
        let Some(captures) = CONFIG_FILE.captures(&file_name) else {
            continue;
        };
        let Some(version) = version_from(&captures) else {
            continue;
        };
        let toolchain = Toolchain {
            name: captures[1].to_string(),
            version,
            path: format!("{}/{}", root.trim_end_matches('/'), file_name),
        };
        tracing::debug!(
            "found config file: {} {} {}",
            toolchain.name,
            toolchain.version,
            toolchain.path
        );
        configs.push(toolchain);
    }

    if configs.is_empty() {
        return Err(ToolchainError::NoConfigFiles { path: root });
    }
    Ok(configs)
}

/// Collect registered installations from `<Name>_TOOLCHAIN_<major>_<minor>_<patch>`
/// environment variables, then from `[[toolchain]]` configuration entries.
pub fn registered_toolchains(env_vars: &[(String, String)], config: &Config) -> Vec<Toolchain> {
    let mut registered = Vec::new();

    for (key, value) in env_vars {
        let Some(captures) = REGISTRATION.captures(key) else {
            continue;
        };
        let Some(version) = version_from(&captures) else {
            continue;
        };
        registered.push(Toolchain {
            name: captures[1].to_string(),
            version,
            path: value.replace('\\', "/"),
        });
    }

    for entry in &config.toolchains {
        match Version::parse(&entry.version) {
            Ok(version) => registered.push(Toolchain {
                name: entry.name.clone(),
                version,
                path: to_slash(&entry.path),
            }),
            Err(e) => tracing::warn!(
                "ignoring toolchain entry {} with invalid version `{}`: {}",
                entry.name,
                entry.version,
                e
            ),
        }
    }

    for toolchain in &registered {
        tracing::debug!(
            "found registered toolchain: {} {} {}",
            toolchain.name,
            toolchain.version,
            toolchain.path
        );
    }
    registered
}
