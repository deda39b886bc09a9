//! User-facing diagnostic messages.
//!
//! Typed errors from the resolver, the graph builder and the description
//! loader convert into a [`Diagnostic`] so the binary can print the root
//! cause together with concrete hints for fixing the input.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no toolchain configuration matches.
    pub const NO_TOOLCHAIN_CONFIG: &str =
        "check that CMSIS_COMPILER_ROOT points to the directory holding <Name>.<version>.cmake files";

    /// Suggestion when no registered installation matches.
    pub const NO_REGISTERED_TOOLCHAIN: &str =
        "register an installation with <Name>_TOOLCHAIN_<major>_<minor>_<patch>=<path>";

    /// Suggestion when the requested version constraint excludes every installation.
    pub const RELAX_CONSTRAINT: &str =
        "relax the version constraint in the `compiler:` node of the solution";

    /// Suggestion when the dependency graph contains a cycle.
    pub const BREAK_CYCLE: &str =
        "remove one of the `depends-on` entries that close the cycle";

    /// Suggestion when the index file cannot be parsed.
    pub const REGENERATE_INDEX: &str =
        "regenerate the build index with `csolution convert`";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related file
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m".to_string(),
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m".to_string(),
            (false, severity) => severity.to_string(),
        };
        output.push_str(&format!("{}: {}\n", severity, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        output.push_str(&self.format_help(color));
        output
    }

    /// Format only the suggestion block, empty when there is nothing to suggest.
    pub fn format_help(&self, color: bool) -> String {
        if self.suggestions.is_empty() {
            return String::new();
        }

        let prefix = if color {
            "\x1b[1;32mhelp\x1b[0m"
        } else {
            "help"
        };
        let mut output = String::new();
        if self.suggestions.len() == 1 {
            output.push_str(&format!("{}: {}\n", prefix, self.suggestions[0]));
        } else {
            output.push_str(&format!("{}: consider:\n", prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("no compatible registered toolchain was found for AC6")
            .with_context("requested: AC6@>=6.22.0")
            .with_context("registered: 6.21.0, 6.19.0")
            .with_suggestion(suggestions::RELAX_CONSTRAINT)
            .with_suggestion(suggestions::NO_REGISTERED_TOOLCHAIN)
            .with_location("solution/project.debug+target.cbuild.yml");

        let output = diag.format(false);
        assert!(output.starts_with("error: no compatible registered toolchain"));
        assert!(output.contains("--> solution/project.debug+target.cbuild.yml"));
        assert!(output.contains("= registered: 6.21.0, 6.19.0"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. relax the version constraint"));
    }

    #[test]
    fn test_single_suggestion_is_inline() {
        let diag = Diagnostic::warning("file was not found").with_suggestion("check the path");
        assert_eq!(
            diag.format(false),
            "warning: file was not found\nhelp: check the path\n"
        );
        assert!(Diagnostic::error("x").format_help(false).is_empty());
    }
}
