//! Toolchain resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while selecting a toolchain for a context.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ToolchainError {
    #[error("reading directory failed: {path}")]
    #[diagnostic(code(cbuild2cmake::toolchain::compiler_root))]
    CompilerRoot { path: String },

    #[error("no toolchain configuration file was found in {path}")]
    #[diagnostic(
        code(cbuild2cmake::toolchain::no_config_files),
        help("check that CMSIS_COMPILER_ROOT points to the toolchain configuration files")
    )]
    NoConfigFiles { path: String },

    #[error("no toolchain configuration file was found for {name}")]
    #[diagnostic(code(cbuild2cmake::toolchain::no_config))]
    NoConfig { name: String },

    #[error("no compatible registered toolchain was found for {name}")]
    #[diagnostic(
        code(cbuild2cmake::toolchain::not_registered),
        help("register an installation with {name}_TOOLCHAIN_<major>_<minor>_<patch>=<path>")
    )]
    NoCompatible {
        name: String,
        constraint: Option<String>,
        registered: Vec<String>,
    },

    #[error("invalid version constraint `{constraint}` for {name}: {reason}")]
    #[diagnostic(code(cbuild2cmake::toolchain::invalid_constraint))]
    InvalidConstraint {
        name: String,
        constraint: String,
        reason: String,
    },
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::CompilerRoot { path } => {
                Diagnostic::error(format!("reading directory failed: {}", path))
                    .with_suggestion(suggestions::NO_TOOLCHAIN_CONFIG)
            }

            ToolchainError::NoConfigFiles { path } => Diagnostic::error(format!(
                "no toolchain configuration file was found in {}",
                path
            ))
            .with_suggestion(suggestions::NO_TOOLCHAIN_CONFIG),

            ToolchainError::NoConfig { name } => Diagnostic::error(format!(
                "no toolchain configuration file was found for {}",
                name
            ))
            .with_context(format!("expected a file named {}.<major>.<minor>.<patch>.cmake", name))
            .with_suggestion(suggestions::NO_TOOLCHAIN_CONFIG),

            ToolchainError::NoCompatible {
                name,
                constraint,
                registered,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "no compatible registered toolchain was found for {}",
                    name
                ));

                if let Some(constraint) = constraint {
                    diag = diag.with_context(format!("requested: {}@{}", name, constraint));
                }

                if registered.is_empty() {
                    diag = diag.with_context(format!("no {} installation is registered", name));
                } else {
                    diag = diag.with_context(format!("registered versions: {}", registered.join(", ")));
                }

                diag = diag.with_suggestion(suggestions::NO_REGISTERED_TOOLCHAIN);
                if constraint.is_some() {
                    diag = diag.with_suggestion(suggestions::RELAX_CONSTRAINT);
                }

                diag
            }

            ToolchainError::InvalidConstraint {
                name,
                constraint,
                reason,
            } => Diagnostic::error(format!(
                "invalid version constraint `{}` for {}",
                constraint, name
            ))
            .with_context(reason.clone())
            .with_suggestion(suggestions::RELAX_CONSTRAINT),
        }
    }
}
