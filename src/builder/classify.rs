//! File classification.
//!
//! Sorts the file entries of a group or component into build roles
//! (sources, custom sources, include paths, libraries, objects and
//! pre-includes), partitioned by language and, for includes, by scope.

use crate::builder::session::BuildSession;
use crate::core::cbuild::File;
use crate::core::language::{Language, LanguageMap, Scope, ScopeMap};
use crate::util::list::{append_uniquely, prepend_uniquely};
use crate::util::paths::{add_root_prefix, clean_path, parent_dir};

/// Classified files of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFiles {
    /// No genuine source file: the node is an interface unit
    pub interface: bool,
    pub include: ScopeMap,
    pub source: LanguageMap,
    /// Sources needing their own unit because of per-file overrides
    pub custom: LanguageMap,
    pub library: Vec<String>,
    pub object: Vec<String>,
    pub pre_include_local: Vec<String>,
}

impl BuildFiles {
    /// Whether the node produces any build unit content.
    pub fn has_content(&self) -> bool {
        !self.source.is_empty()
            || !self.custom.is_empty()
            || !self.include.is_empty()
            || !self.library.is_empty()
            || !self.object.is_empty()
    }

    /// Languages of sources and custom sources, in key order.
    pub fn languages(&self) -> Vec<Language> {
        let mut languages = Vec::new();
        for language in self.source.keys().chain(self.custom.keys()) {
            append_uniquely(&mut languages, language.expand());
        }
        languages
    }
}

fn is_genuine_source(file: &File) -> bool {
    file.is_source() && !file.is_template() && !file.has_custom_options()
}

/// Classify `files` relative to the session's context root.
///
/// Registers discovered source languages and global pre-includes on the
/// session.
pub fn classify_files(files: &[File], session: &mut BuildSession) -> BuildFiles {
    let root = session.context_root.clone();
    let mut build_files = BuildFiles {
        interface: !files.iter().any(is_genuine_source),
        ..Default::default()
    };

    for file in files {
        if file.is_template() {
            continue;
        }
        let language = file.language();

        match file.category.as_str() {
            "header" | "headerAsm" | "headerC" | "headerCpp" | "include" | "includeAsm"
            | "includeC" | "includeCpp" => {
                let scope = if build_files.interface {
                    Scope::Interface
                } else {
                    file.scope()
                };
                let include_path = if file.category.starts_with("header") {
                    parent_dir(&file.file)
                } else {
                    clean_path(&file.file)
                };
                let include_path = add_root_prefix(&root, &include_path);

                let bucket = build_files
                    .include
                    .entry(scope)
                    .or_default()
                    .entry(language)
                    .or_default();
                if file.is_config() {
                    prepend_uniquely(bucket, &[include_path]);
                } else {
                    append_uniquely(bucket, &[include_path]);
                }
            }
            "source" | "sourceAsm" | "sourceC" | "sourceCpp" => {
                session.add_language(language);
                let bucket = if file.has_custom_options() {
                    build_files.custom.entry(language).or_default()
                } else {
                    build_files.source.entry(language).or_default()
                };
                bucket.push(add_root_prefix(&root, &file.file));
            }
            "library" => build_files.library.push(add_root_prefix(&root, &file.file)),
            "object" => build_files.object.push(add_root_prefix(&root, &file.file)),
            "preIncludeLocal" => build_files
                .pre_include_local
                .push(add_root_prefix(&root, &file.file)),
            "preIncludeGlobal" => session.add_pre_include_global(add_root_prefix(&root, &file.file)),
            _ => {}
        }
    }

    build_files
}

/// Source languages of `files` without touching any session.
pub fn source_languages(files: &[File]) -> Vec<Language> {
    let mut languages = Vec::new();
    for file in files {
        if file.is_source() && !file.is_template() {
            let language = file.language();
            if language != Language::All {
                append_uniquely(&mut languages, language.expand());
            }
        }
    }
    languages
}

/// Whether `files` contain anything that makes a node non-empty.
pub fn has_buildable_files(files: &[File]) -> bool {
    files.iter().filter(|file| !file.is_template()).any(|file| {
        file.is_source()
            || file.category.starts_with("header")
            || file.category.starts_with("include")
            || file.category == "library"
            || file.category == "object"
    })
}
