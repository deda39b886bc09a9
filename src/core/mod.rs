//! Core data structures for cbuild2cmake.
//!
//! This module contains the typed build description model:
//! - The solution build index and its execute steps
//! - Per-context descriptions with their group/component trees
//! - Languages, scopes, definitions and compiler abstractions

pub mod abstractions;
pub mod cbuild;
pub mod define;
pub mod index;
pub mod language;

pub use abstractions::CompilerAbstractions;
pub use cbuild::{Cbuild, CbuildDocument, Component, File, Group, Misc, NodeOptions};
pub use define::Define;
pub use index::{CbuildIndex, CbuildIndexDocument, CbuildRef, Execute};
pub use language::{Language, LanguageMap, Scope, ScopeMap};
