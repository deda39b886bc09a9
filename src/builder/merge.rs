//! Include path and definition inheritance.
//!
//! A node refers to its parent's propagated includes and definitions by
//! target property as long as it removes nothing. Once `del-path` or
//! `undefine` is present, the parent set is resolved eagerly and filtered.

use crate::core::define::{remove_defines, Define};
use crate::core::language::{Language, LanguageMap, Scope, ScopeMap};
use crate::util::list::{append_uniquely, intersection, remove_all};
use crate::util::paths::add_root_prefixes;

/// Parent part of a node's include directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentIncludes {
    /// `$<TARGET_PROPERTY:target,INTERFACE_INCLUDE_DIRECTORIES>`
    Inherited(String),
    /// The parent's include set with deleted paths removed
    Resolved(LanguageMap),
}

/// Parent part of a node's compile definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentDefines {
    /// `$<TARGET_PROPERTY:target,INTERFACE_COMPILE_DEFINITIONS>`
    Inherited(String),
    /// The parent's definitions with undefined names removed
    Resolved(Vec<Define>),
}

/// Include directories of one node, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedIncludes {
    pub parent: ParentIncludes,
    /// Own includes per scope, add paths included
    pub includes: ScopeMap,
    /// What this node propagates to its children
    pub effective: LanguageMap,
}

/// Compile definitions of one node, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDefines {
    pub parent: ParentDefines,
    pub defines: Vec<Define>,
    pub effective: Vec<Define>,
}

/// Parent include reference, resolved only when paths are deleted.
///
/// `del_path` must already be root prefixed.
pub fn parent_includes(parent_target: &str, parent_effective: &LanguageMap, del_path: &[String]) -> ParentIncludes {
    if del_path.is_empty() {
        return ParentIncludes::Inherited(parent_target.to_string());
    }

    let mut resolved = LanguageMap::new();
    for (language, paths) in parent_effective {
        let mut paths = paths.clone();
        remove_all(&mut paths, del_path);
        if !paths.is_empty() {
            resolved.insert(*language, paths);
        }
    }
    ParentIncludes::Resolved(resolved)
}

/// Parent definition reference, resolved only when names are undefined.
pub fn parent_defines(parent_target: &str, parent_effective: &[Define], undefine: &[String]) -> ParentDefines {
    if undefine.is_empty() {
        ParentDefines::Inherited(parent_target.to_string())
    } else {
        ParentDefines::Resolved(remove_defines(parent_effective, undefine))
    }
}

/// Paths removed and added by a node, relative to the context root.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOverrides<'a> {
    pub add_path: &'a [String],
    pub add_path_asm: &'a [String],
    pub del_path: &'a [String],
}

/// Merge a node's include directories.
///
/// Add paths land in the node's own `scope` bucket: `add-path` under
/// C,CXX and `add-path-asm` under ASM.
pub fn merge_includes(
    root: &str,
    parent_target: &str,
    parent_effective: &LanguageMap,
    scope: Scope,
    classified: &ScopeMap,
    overrides: PathOverrides<'_>,
) -> MergedIncludes {
    let del_path = add_root_prefixes(root, overrides.del_path);
    let parent = parent_includes(parent_target, parent_effective, &del_path);

    let mut includes = classified.clone();
    let mut added = LanguageMap::new();
    if !overrides.add_path.is_empty() {
        added.insert(Language::CCxx, add_root_prefixes(root, overrides.add_path));
    }
    if !overrides.add_path_asm.is_empty() {
        added.insert(Language::Asm, add_root_prefixes(root, overrides.add_path_asm));
    }
    if !added.is_empty() {
        let bucket = includes.entry(scope).or_default();
        for (language, paths) in &added {
            append_uniquely(bucket.entry(*language).or_default(), paths);
        }
    }

    let mut effective = match &parent {
        ParentIncludes::Inherited(_) => parent_effective.clone(),
        ParentIncludes::Resolved(resolved) => resolved.clone(),
    };
    for (scope, languages) in &includes {
        if *scope == Scope::Private {
            continue;
        }
        for (language, paths) in languages {
            append_uniquely(effective.entry(*language).or_default(), paths);
        }
    }

    MergedIncludes {
        parent,
        includes,
        effective,
    }
}

/// Merge a node's compile definitions.
pub fn merge_defines(
    parent_target: &str,
    parent_effective: &[Define],
    defines: &[Define],
    undefine: &[String],
) -> MergedDefines {
    let parent = parent_defines(parent_target, parent_effective, undefine);
    let mut effective = match &parent {
        ParentDefines::Inherited(_) => parent_effective.to_vec(),
        ParentDefines::Resolved(resolved) => resolved.clone(),
    };
    append_uniquely(&mut effective, defines);

    MergedDefines {
        parent,
        defines: defines.to_vec(),
        effective,
    }
}

/// Factor paths shared between language buckets.
///
/// Paths common to C and CXX move to C,CXX; paths common to ASM and C,CXX
/// then move to ALL. Paths present in ALL are dropped from every other
/// bucket and empty buckets are removed.
pub fn merge_language_common_includes(includes: &mut LanguageMap) {
    let empty = Vec::new();

    let common = intersection(
        includes.get(&Language::C).unwrap_or(&empty),
        includes.get(&Language::Cxx).unwrap_or(&empty),
    );
    if !common.is_empty() {
        append_uniquely(includes.entry(Language::CCxx).or_default(), &common);
        for language in [Language::C, Language::Cxx] {
            if let Some(paths) = includes.get_mut(&language) {
                remove_all(paths, &common);
            }
        }
    }

    let common = intersection(
        includes.get(&Language::Asm).unwrap_or(&empty),
        includes.get(&Language::CCxx).unwrap_or(&empty),
    );
    if !common.is_empty() {
        append_uniquely(includes.entry(Language::All).or_default(), &common);
        for language in [Language::Asm, Language::CCxx] {
            if let Some(paths) = includes.get_mut(&language) {
                remove_all(paths, &common);
            }
        }
    }

    if let Some(all) = includes.get(&Language::All).cloned() {
        for (language, paths) in includes.iter_mut() {
            if *language != Language::All {
                remove_all(paths, &all);
            }
        }
    }

    includes.retain(|_, paths| !paths.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_language_common_includes() {
        let mut includes = LanguageMap::new();
        includes.insert(Language::C, strings(&["a", "b", "x"]));
        includes.insert(Language::Cxx, strings(&["c", "b", "x"]));
        includes.insert(Language::Asm, strings(&["d", "x"]));

        merge_language_common_includes(&mut includes);

        let mut expected = LanguageMap::new();
        expected.insert(Language::C, strings(&["a"]));
        expected.insert(Language::Cxx, strings(&["c"]));
        expected.insert(Language::Asm, strings(&["d"]));
        expected.insert(Language::CCxx, strings(&["b"]));
        expected.insert(Language::All, strings(&["x"]));
        assert_eq!(includes, expected);

        merge_language_common_includes(&mut includes);
        assert_eq!(includes, expected);
    }

    #[test]
    fn test_merge_common_includes_strips_all() {
        let mut includes = LanguageMap::new();
        includes.insert(Language::All, strings(&["shared"]));
        includes.insert(Language::C, strings(&["shared"]));
        includes.insert(Language::Asm, strings(&["asm", "shared"]));

        merge_language_common_includes(&mut includes);
        assert_eq!(includes.len(), 2);
        assert_eq!(includes[&Language::Asm], strings(&["asm"]));
        assert!(!includes.contains_key(&Language::C));
    }

    #[test]
    fn test_parent_includes_inherited_without_del_path() {
        let mut parent = LanguageMap::new();
        parent.insert(Language::All, strings(&["${SOLUTION_ROOT}/inc"]));
        assert_eq!(
            parent_includes("Group_Source", &parent, &[]),
            ParentIncludes::Inherited("Group_Source".to_string())
        );
    }

    #[test]
    fn test_merge_includes_with_del_path() {
        let mut parent = LanguageMap::new();
        parent.insert(
            Language::All,
            strings(&["${SOLUTION_ROOT}/project/inc", "${SOLUTION_ROOT}/project/keep"]),
        );
        parent.insert(Language::Asm, strings(&["${SOLUTION_ROOT}/project/inc"]));

        let del_path = strings(&["./inc"]);
        let add_path = strings(&["./extra"]);
        let merged = merge_includes(
            "project",
            "Group_Parent",
            &parent,
            Scope::Public,
            &ScopeMap::new(),
            PathOverrides {
                add_path: &add_path,
                del_path: &del_path,
                ..Default::default()
            },
        );

        let mut resolved = LanguageMap::new();
        resolved.insert(Language::All, strings(&["${SOLUTION_ROOT}/project/keep"]));
        assert_eq!(merged.parent, ParentIncludes::Resolved(resolved));
        assert_eq!(
            merged.includes[&Scope::Public][&Language::CCxx],
            strings(&["${SOLUTION_ROOT}/project/extra"])
        );
        assert_eq!(merged.effective[&Language::All], strings(&["${SOLUTION_ROOT}/project/keep"]));
        assert_eq!(
            merged.effective[&Language::CCxx],
            strings(&["${SOLUTION_ROOT}/project/extra"])
        );
    }

    #[test]
    fn test_private_includes_do_not_propagate() {
        let mut classified = ScopeMap::new();
        classified
            .entry(Scope::Private)
            .or_default()
            .insert(Language::C, strings(&["private"]));
        classified
            .entry(Scope::Public)
            .or_default()
            .insert(Language::C, strings(&["public"]));
        let merged = merge_includes(
            "",
            "${CONTEXT}",
            &LanguageMap::new(),
            Scope::Public,
            &classified,
            PathOverrides::default(),
        );
        assert_eq!(merged.parent, ParentIncludes::Inherited("${CONTEXT}".to_string()));
        assert_eq!(merged.effective[&Language::C], strings(&["public"]));
    }

    #[test]
    fn test_merge_defines() {
        let parent = vec![Define::new("KEEP"), Define::with_value("DROP", "1")];
        let local = vec![Define::new("LOCAL")];

        let merged = merge_defines("Group_A", &parent, &local, &[]);
        assert_eq!(merged.parent, ParentDefines::Inherited("Group_A".to_string()));
        assert_eq!(merged.effective.len(), 3);

        let merged = merge_defines("Group_A", &parent, &local, &strings(&["DROP"]));
        assert_eq!(merged.parent, ParentDefines::Resolved(vec![Define::new("KEEP")]));
        assert_eq!(merged.effective, vec![Define::new("KEEP"), Define::new("LOCAL")]);
    }
}
