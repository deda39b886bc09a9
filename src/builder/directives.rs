//! Structured CMake directives.
//!
//! The target-tree walk produces these instead of text so that the output
//! can be compared structurally and rendered in one place
//! ([`crate::builder::cmake`]).

use crate::builder::merge::{ParentDefines, ParentIncludes};
use crate::core::abstractions::CompilerAbstractions;
use crate::core::cbuild::Misc;
use crate::core::define::Define;
use crate::core::language::{Language, Scope, ScopeMap};

/// Kind of a generated library target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryKind {
    /// Object library compiling the listed sources
    Object(Vec<String>),
    /// Header-only unit
    Interface,
}

/// Per-file properties, combined into one `set_source_files_properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub file: String,
    pub language: Language,
    pub compile_options: Vec<String>,
    pub compile_definitions: Vec<Define>,
    /// Resolved file level abstractions
    pub abstractions: Option<CompilerAbstractions>,
}

impl FileProperties {
    pub fn new(file: impl Into<String>, language: Language) -> Self {
        FileProperties {
            file: file.into(),
            language,
            compile_options: Vec::new(),
            compile_definitions: Vec::new(),
            abstractions: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.compile_options.is_empty()
            && self.compile_definitions.is_empty()
            && self.abstractions.is_none()
    }
}

/// One emitted CMake statement (or block of statements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Comment(String),
    /// Empty line closing a unit or opening a file unit
    Blank,
    AddLibrary {
        name: String,
        kind: LibraryKind,
    },
    IncludeDirectories {
        target: String,
        scope: Scope,
        parent: Option<ParentIncludes>,
        includes: ScopeMap,
    },
    CompileDefinitions {
        target: String,
        scope: Scope,
        parent: Option<ParentDefines>,
        defines: Vec<Define>,
    },
    /// `<owner>_ABSTRACTIONS` interface library
    AbstractionsBundle {
        owner: String,
        abstractions: CompilerAbstractions,
        languages: Vec<Language>,
    },
    CompileOptions {
        target: String,
        scope: Scope,
        parent: Option<String>,
        misc: Misc,
        pre_includes: Vec<String>,
    },
    LinkLibraries {
        target: String,
        scope: Scope,
        libraries: Vec<String>,
    },
    SourceFileProperties(FileProperties),
}

impl Directive {
    /// Target a directive applies to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Directive::Comment(_) | Directive::Blank | Directive::SourceFileProperties(_) => None,
            Directive::AddLibrary { name, .. } => Some(name),
            Directive::AbstractionsBundle { owner, .. } => Some(owner),
            Directive::IncludeDirectories { target, .. }
            | Directive::CompileDefinitions { target, .. }
            | Directive::CompileOptions { target, .. }
            | Directive::LinkLibraries { target, .. } => Some(target),
        }
    }
}

/// Bundle target name of an abstractions owner.
pub fn abstractions_target(owner: &str) -> String {
    format!("{}_ABSTRACTIONS", owner)
}
