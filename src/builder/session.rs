//! Per-context build session.
//!
//! State discovered while walking a context's group and component trees
//! (languages, global includes, libraries, pre-includes, link units) is
//! accumulated here and handed to the emitter afterwards. Every context owns
//! its own session, so contexts can be processed in parallel.

use crate::core::language::{Language, LanguageMap, Scope, ScopeMap};
use crate::util::list::append_uniquely;

/// Accumulator threaded through the target-tree walk of one context.
#[derive(Debug, Clone, Default)]
pub struct BuildSession {
    /// Path of the context directory relative to the solution root
    pub context_root: String,

    /// Selected toolchain name (e.g., AC6, GCC)
    pub toolchain: String,

    /// Source languages in order of first discovery
    languages: Vec<Language>,

    /// Public includes contributed by components
    pub include_global: LanguageMap,

    /// Public includes contributed by groups
    pub user_include_global: LanguageMap,

    /// Library files referenced anywhere in the tree
    pub library_global: Vec<String>,

    /// Pre-include files applied to the whole context
    pub pre_include_global: Vec<String>,

    /// Generated units linked into the context target, post-order
    pub link_units: Vec<String>,
}

impl BuildSession {
    /// Create a session for the context rooted at `context_root`.
    pub fn new(context_root: impl Into<String>, toolchain: impl Into<String>) -> Self {
        BuildSession {
            context_root: context_root.into(),
            toolchain: toolchain.into(),
            ..Default::default()
        }
    }

    /// Register a discovered source language.
    ///
    /// `ALL` is never registered; `C,CXX` registers both C and CXX.
    pub fn add_language(&mut self, language: Language) {
        if language == Language::All {
            return;
        }
        append_uniquely(&mut self.languages, language.expand());
    }

    /// Languages discovered so far.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Add the propagating (public and interface) includes of a group.
    pub fn add_user_includes(&mut self, includes: &ScopeMap) {
        append_global_includes(&mut self.user_include_global, includes);
    }

    /// Add the propagating (public and interface) includes of a component.
    pub fn add_component_includes(&mut self, includes: &ScopeMap) {
        append_global_includes(&mut self.include_global, includes);
    }

    /// Register a library file for the link group rescan.
    pub fn add_libraries(&mut self, libraries: &[String]) {
        self.library_global.extend_from_slice(libraries);
    }

    /// Register a global pre-include.
    pub fn add_pre_include_global(&mut self, file: String) {
        append_uniquely(&mut self.pre_include_global, &[file]);
    }
}

/// Merge the public and interface buckets of `includes` into `global`.
pub fn append_global_includes(global: &mut LanguageMap, includes: &ScopeMap) {
    for (scope, languages) in includes {
        if *scope == Scope::Private {
            continue;
        }
        for (language, paths) in languages {
            append_uniquely(global.entry(*language).or_default(), paths);
        }
    }
}
