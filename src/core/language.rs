//! Languages and include scopes.
//!
//! Both enums are ordered by their CMake spelling so that `BTreeMap`s keyed
//! by them iterate in the same order as a string-keyed sorted map would.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Language bucket of a file or include path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    /// Undetermined, applies to every language
    All,
    /// Assembler
    Asm,
    /// C
    C,
    /// C and C++ (`c-cpp`)
    CCxx,
    /// C++
    Cxx,
}

impl Language {
    /// CMake spelling as used in `$<COMPILE_LANGUAGE:...>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::All => "ALL",
            Language::Asm => "ASM",
            Language::C => "C",
            Language::CCxx => "C,CXX",
            Language::Cxx => "CXX",
        }
    }

    /// Variable prefix used by the toolchain configuration files.
    ///
    /// `C` flags live in `CC_*` variables, the others use the language name.
    pub fn prefix(&self) -> &'static str {
        match self {
            Language::C => "CC",
            other => other.as_str(),
        }
    }

    /// Language implied by a file category, e.g. `sourceAsm`.
    pub fn from_category(category: &str) -> Option<Language> {
        match category {
            "headerAsm" | "includeAsm" | "sourceAsm" => Some(Language::Asm),
            "headerC" | "includeC" | "sourceC" => Some(Language::C),
            "headerCpp" | "includeCpp" | "sourceCpp" => Some(Language::Cxx),
            _ => None,
        }
    }

    /// Language from an explicit `language:` attribute.
    pub fn from_attribute(language: &str) -> Option<Language> {
        match language {
            "asm" => Some(Language::Asm),
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cxx),
            "c-cpp" => Some(Language::CCxx),
            _ => None,
        }
    }

    /// Language from a file name extension (case sensitive).
    pub fn from_extension(file: &str) -> Option<Language> {
        let name = file.rsplit('/').next().unwrap_or(file);
        let ext = name.rfind('.').map(|index| &name[index..])?;
        match ext {
            ".c" | ".C" => Some(Language::C),
            ".cpp" | ".c++" | ".C++" | ".cxx" | ".cc" | ".CC" => Some(Language::Cxx),
            ".asm" | ".s" | ".S" => Some(Language::Asm),
            _ => None,
        }
    }

    /// The single languages a bucket covers, for per-language expansion.
    pub fn expand(&self) -> &'static [Language] {
        match self {
            Language::All => &[Language::Asm, Language::C, Language::Cxx],
            Language::Asm => &[Language::Asm],
            Language::C => &[Language::C],
            Language::CCxx => &[Language::C, Language::Cxx],
            Language::Cxx => &[Language::Cxx],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Visibility of include paths and compile definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    Interface,
    Private,
    Public,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Interface => "INTERFACE",
            Scope::Private => "PRIVATE",
            Scope::Public => "PUBLIC",
        }
    }

    /// Scope of a file's `scope:` attribute; `private` and `hidden` are private.
    pub fn from_attribute(scope: &str) -> Scope {
        match scope {
            "private" | "hidden" => Scope::Private,
            _ => Scope::Public,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths per language bucket.
pub type LanguageMap = BTreeMap<Language, Vec<String>>;

/// Language maps per scope.
pub type ScopeMap = BTreeMap<Scope, LanguageMap>;
