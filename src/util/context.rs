//! Global context for a generation run.
//!
//! Provides centralized access to configuration, root directories and the
//! process environment snapshot used for toolchain registration.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::config::{self, Config};
use crate::util::fs::{normalize_path, to_slash};

/// Environment variable overriding the pack root.
pub const PACK_ROOT_VAR: &str = "CMSIS_PACK_ROOT";

/// Environment variable overriding the compiler root.
pub const COMPILER_ROOT_VAR: &str = "CMSIS_COMPILER_ROOT";

/// Resolved root directories, forward-slash normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// CMSIS pack root
    pub pack_root: String,
    /// Directory holding the toolchain configuration files
    pub compiler_root: String,
}

/// Resolve root directories.
///
/// Order of precedence: environment variable, configuration file, default.
/// The default compiler root is `<exe dir>/../etc`; the default pack root is
/// `<user cache dir>/arm/packs`.
pub fn resolve_roots<F>(config: &Config, env: F, exe_dir: Option<&Path>) -> Roots
where
    F: Fn(&str) -> Option<String>,
{
    let pack_root = env(PACK_ROOT_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| config.roots.pack_root.clone())
        .unwrap_or_else(default_pack_root);

    let compiler_root = env(COMPILER_ROOT_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| config.roots.compiler_root.clone())
        .unwrap_or_else(|| match exe_dir {
            Some(dir) => dir.join("..").join("etc"),
            None => PathBuf::from("etc"),
        });

    Roots {
        pack_root: to_slash(&normalize_path(&pack_root)),
        compiler_root: to_slash(&normalize_path(&compiler_root)),
    }
}

fn default_pack_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.cache_dir().join("arm").join("packs"))
        .unwrap_or_else(|| PathBuf::from("packs"))
}

/// Global context containing configuration, roots and run options.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory holding the build index
    solution_root: PathBuf,

    /// Merged configuration
    config: Config,

    /// Resolved root directories
    roots: Roots,

    /// Environment snapshot
    env_vars: Vec<(String, String)>,

    /// Whether debug output is enabled
    debug: bool,

    /// Whether context builds run verbosely
    verbose: bool,
}

impl GlobalContext {
    /// Create a context for the solution at `solution_root`, reading the
    /// configuration files and the process environment.
    pub fn new(solution_root: &Path) -> Result<Self> {
        let config = config::load_config(
            config::global_config_path().as_deref(),
            &config::project_config_path(solution_root),
        );
        let env_vars: Vec<(String, String)> = std::env::vars().collect();
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Ok(Self::with_env(solution_root, config, env_vars, exe_dir.as_deref()))
    }

    /// Create a context from explicit configuration and environment.
    pub fn with_env(
        solution_root: &Path,
        config: Config,
        env_vars: Vec<(String, String)>,
        exe_dir: Option<&Path>,
    ) -> Self {
        let lookup = |key: &str| {
            env_vars
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        let roots = resolve_roots(&config, lookup, exe_dir);

        GlobalContext {
            solution_root: solution_root.to_path_buf(),
            config,
            roots,
            env_vars,
            debug: false,
            verbose: false,
        }
    }

    /// Set debug mode.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Directory holding the build index.
    pub fn solution_root(&self) -> &Path {
        &self.solution_root
    }

    /// Merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolved root directories.
    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    /// Environment snapshot taken at construction.
    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env_vars
    }

    /// Check if debug mode is enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_overrides_config() {
        let mut config = Config::default();
        config.roots.pack_root = Some(PathBuf::from("/config/packs"));
        config.roots.compiler_root = Some(PathBuf::from("/config/etc"));

        let roots = resolve_roots(
            &config,
            |key| (key == COMPILER_ROOT_VAR).then(|| "/env/etc".to_string()),
            None,
        );
        assert_eq!(roots.compiler_root, "/env/etc");
        assert_eq!(roots.pack_root, "/config/packs");
    }

    #[test]
    fn test_default_compiler_root_next_to_exe() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("bin");
        let etc = tmp.path().join("etc");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(&etc).unwrap();

        let roots = resolve_roots(&Config::default(), |_| None, Some(&bin));
        assert_eq!(roots.compiler_root, to_slash(&etc.canonicalize().unwrap()));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config = Config::default();
        config.roots.pack_root = Some(PathBuf::from("/config/packs"));

        let roots = resolve_roots(&config, |_| Some(String::new()), None);
        assert_eq!(roots.pack_root, "/config/packs");
    }

    #[test]
    fn test_context_with_env() {
        let env = vec![
            (PACK_ROOT_VAR.to_string(), "/env/packs".to_string()),
            ("AC6_TOOLCHAIN_6_21_0".to_string(), "/opt/ac6/bin".to_string()),
        ];
        let mut ctx = GlobalContext::with_env(Path::new("/solution"), Config::default(), env, None);
        ctx.set_debug(true);

        assert_eq!(ctx.roots().pack_root, "/env/packs");
        assert_eq!(ctx.env_vars().len(), 2);
        assert!(ctx.is_debug());
        assert!(!ctx.is_verbose());
        assert_eq!(ctx.solution_root(), Path::new("/solution"));
    }
}
