//! Compiler abstractions.
//!
//! Toolchain-agnostic settings (`optimize`, `debug`, `warnings`,
//! `language-C`, `language-CPP`) that the toolchain configuration files turn
//! into concrete flags via `cbuild_set_options_flags`.

use serde::{Deserialize, Serialize};

use crate::core::cbuild::File;
use crate::core::language::Language;

/// The abstraction tuple of a context, node or file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerAbstractions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub optimize: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub debug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub warnings: String,
    #[serde(rename = "language-C", skip_serializing_if = "String::is_empty")]
    pub language_c: String,
    #[serde(rename = "language-CPP", skip_serializing_if = "String::is_empty")]
    pub language_cpp: String,
}

impl CompilerAbstractions {
    /// True when nothing applicable to `language` is set.
    ///
    /// `language-C` only matters for C, `language-CPP` only for C++.
    pub fn is_empty_for(&self, language: Language) -> bool {
        let standard_set = match language {
            Language::C => !self.language_c.is_empty(),
            Language::Cxx => !self.language_cpp.is_empty(),
            Language::CCxx => !self.language_c.is_empty() || !self.language_cpp.is_empty(),
            Language::Asm | Language::All => false,
        };
        self.optimize.is_empty() && self.debug.is_empty() && self.warnings.is_empty() && !standard_set
    }

    /// True when empty for every language in `languages`.
    pub fn are_empty(&self, languages: &[Language]) -> bool {
        languages.iter().all(|language| self.is_empty_for(*language))
    }

    /// Field-wise inheritance: a set child field wins, an empty one takes the parent's.
    pub fn inherit(parent: &CompilerAbstractions, child: &CompilerAbstractions) -> CompilerAbstractions {
        fn pick(parent: &str, child: &str) -> String {
            if child.is_empty() { parent } else { child }.to_string()
        }

        CompilerAbstractions {
            optimize: pick(&parent.optimize, &child.optimize),
            debug: pick(&parent.debug, &child.debug),
            warnings: pick(&parent.warnings, &child.warnings),
            language_c: pick(&parent.language_c, &child.language_c),
            language_cpp: pick(&parent.language_cpp, &child.language_cpp),
        }
    }

    /// Arguments of `cbuild_set_options_flags` for `language`:
    /// optimize, debug, warnings and language standard.
    pub fn options_flags(&self, language: Language) -> [&str; 4] {
        let standard = match language {
            Language::C => self.language_c.as_str(),
            Language::Cxx => self.language_cpp.as_str(),
            _ => "",
        };
        [
            self.optimize.as_str(),
            self.debug.as_str(),
            self.warnings.as_str(),
            standard,
        ]
    }
}

/// Whether any source file carries its own abstractions.
pub fn has_file_abstractions(files: &[File]) -> bool {
    files
        .iter()
        .filter(|file| file.is_source())
        .any(|file| !file.abstractions.is_empty_for(file.language()))
}
