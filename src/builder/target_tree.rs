//! Target-tree builder.
//!
//! Walks a context's group tree and component list depth-first and turns
//! every non-empty node into a library target. Settings flow from the
//! context down to files: include paths and definitions through target
//! properties (or eagerly resolved sets once something is removed),
//! compiler abstractions through `_ABSTRACTIONS` bundles, assembler
//! definitions and misc ASM flags as explicit chains.

use crate::builder::asm::{asm_define_flags, asm_syntax};
use crate::builder::classify::{classify_files, has_buildable_files, source_languages, BuildFiles};
use crate::builder::directives::{abstractions_target, Directive, FileProperties, LibraryKind};
use crate::builder::merge::{
    merge_defines, merge_includes, merge_language_common_includes, parent_defines, PathOverrides,
};
use crate::builder::session::{append_global_includes, BuildSession};
use crate::core::abstractions::{has_file_abstractions, CompilerAbstractions};
use crate::core::cbuild::{Cbuild, File, Group, NodeOptions};
use crate::core::define::Define;
use crate::core::language::{Language, LanguageMap, Scope, ScopeMap};
use crate::util::list::append_uniquely;
use crate::util::paths::{add_root_prefix, add_root_prefixes, replace_delimiters};

/// Target name of the context itself.
pub const CONTEXT_TARGET: &str = "${CONTEXT}";

/// Directives of `groups.cmake` and `components.cmake`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetTree {
    pub groups: Vec<Directive>,
    pub components: Vec<Directive>,
}

/// State a node inherits from its parent.
#[derive(Debug, Clone)]
struct Inherited {
    target: String,
    includes: LanguageMap,
    defines: Vec<Define>,
    abstractions: CompilerAbstractions,
    /// Nearest emitted bundle and the abstractions it carries
    owner: Option<(String, CompilerAbstractions)>,
    define_asm: Vec<Define>,
    misc_asm: Vec<String>,
}

/// A group or component seen through its common override surface.
struct Node<'a> {
    name: String,
    title: String,
    options: &'a NodeOptions,
    children: &'a [Group],
    is_component: bool,
}

/// Languages of every source in the context, in discovery order.
pub fn context_languages(cbuild: &Cbuild) -> Vec<Language> {
    let mut languages = Vec::new();
    collect_languages(&cbuild.groups, &mut languages);
    for component in &cbuild.components {
        append_uniquely(&mut languages, &source_languages(&component.options.files));
    }
    append_uniquely(&mut languages, &source_languages(&cbuild.constructed_files));
    languages
}

/// Include paths declared at context level: constructed file headers and
/// the context's add paths, with common paths factored.
pub fn context_includes(cbuild: &Cbuild, context_root: &str) -> LanguageMap {
    let mut scratch = BuildSession::new(context_root, "");
    let constructed = classify_files(&cbuild.constructed_files, &mut scratch);

    let mut includes = LanguageMap::new();
    append_global_includes(&mut includes, &constructed.include);
    if !cbuild.add_path.is_empty() {
        let paths = add_root_prefixes(context_root, &cbuild.add_path);
        append_uniquely(includes.entry(Language::CCxx).or_default(), &paths);
    }
    if !cbuild.add_path_asm.is_empty() {
        let paths = add_root_prefixes(context_root, &cbuild.add_path_asm);
        append_uniquely(includes.entry(Language::Asm).or_default(), &paths);
    }
    merge_language_common_includes(&mut includes);
    includes
}

/// Include paths `${CONTEXT}` propagates: the context level paths followed
/// by the public includes of every component, then of every group.
///
/// Computed ahead of the walk so that a node removing paths filters the
/// complete set.
pub fn context_interface_includes(cbuild: &Cbuild, context_root: &str) -> LanguageMap {
    let mut scratch = BuildSession::new(context_root, "");
    collect_group_includes(&cbuild.groups, &mut scratch);
    for component in &cbuild.components {
        if has_buildable_files(&component.options.files) {
            let build_files = classify_files(&component.options.files, &mut scratch);
            scratch.add_component_includes(&build_files.include);
        }
    }

    let mut includes = context_includes(cbuild, context_root);
    for global in [&scratch.include_global, &scratch.user_include_global] {
        for (language, paths) in global {
            append_uniquely(includes.entry(*language).or_default(), paths);
        }
    }
    includes
}

fn collect_group_includes(groups: &[Group], scratch: &mut BuildSession) {
    for group in groups.iter().filter(|group| group_is_buildable(group)) {
        let build_files = classify_files(&group.options.files, scratch);
        scratch.add_user_includes(&build_files.include);
        collect_group_includes(&group.groups, scratch);
    }
}

/// Whether a group or any of its descendants has buildable files.
fn group_is_buildable(group: &Group) -> bool {
    has_buildable_files(&group.options.files) || group.groups.iter().any(group_is_buildable)
}

fn collect_languages(groups: &[Group], languages: &mut Vec<Language>) {
    for group in groups {
        append_uniquely(languages, &source_languages(&group.options.files));
        collect_languages(&group.groups, languages);
    }
}

fn subtree_languages(files: &[File], children: &[Group]) -> Vec<Language> {
    let mut languages = source_languages(files);
    collect_languages(children, &mut languages);
    languages.sort();
    languages
}

fn register_pre_includes(groups: &[Group], session: &mut BuildSession) {
    for group in groups {
        for file in &group.options.files {
            if file.category == "preIncludeGlobal" && !file.is_template() {
                let path = add_root_prefix(&session.context_root, &file.file);
                session.add_pre_include_global(path);
            }
        }
        register_pre_includes(&group.groups, session);
    }
}

impl TargetTree {
    /// Build the target tree of `cbuild`, filling `session`.
    pub fn build(cbuild: &Cbuild, session: &mut BuildSession) -> TargetTree {
        let root = session.context_root.clone();
        let languages = context_languages(cbuild);
        let owner = (!cbuild.abstractions.are_empty(&languages))
            .then(|| (CONTEXT_TARGET.to_string(), cbuild.abstractions.clone()));

        let context = Inherited {
            target: CONTEXT_TARGET.to_string(),
            includes: context_interface_includes(cbuild, &root),
            defines: cbuild.define.clone(),
            abstractions: cbuild.abstractions.clone(),
            owner,
            define_asm: cbuild.define_asm.clone(),
            misc_asm: cbuild.misc.asm.clone(),
        };

        let mut tree = TargetTree::default();
        for group in &cbuild.groups {
            let node = Node {
                name: format!("Group_{}", replace_delimiters(&group.group)),
                title: format!("group {}", group.group),
                options: &group.options,
                children: &group.groups,
                is_component: false,
            };
            build_node(&node, &context, session, &mut tree.groups);
        }

        for component in &cbuild.components {
            let node = Node {
                name: replace_delimiters(&component.component),
                title: format!("component {}", component.component),
                options: &component.options,
                children: &[],
                is_component: true,
            };
            build_node(&node, &context, session, &mut tree.components);
        }

        // Constructed files come last so their languages and pre-includes
        // follow the tree's.
        classify_files(&cbuild.constructed_files, session);
        tree
    }
}

fn build_node(node: &Node<'_>, parent: &Inherited, session: &mut BuildSession, out: &mut Vec<Directive>) {
    let options = node.options;
    let build_files = classify_files(&options.files, session);

    if !has_buildable_files(&options.files) && !node.children.iter().any(group_is_buildable) {
        tracing::debug!("skipping empty {}", node.title);
        register_pre_includes(node.children, session);
        return;
    }

    let root = session.context_root.clone();
    let name = node.name.as_str();
    let scope = if build_files.interface {
        Scope::Interface
    } else {
        Scope::Public
    };

    out.push(Directive::Comment(node.title.clone()));
    out.push(Directive::AddLibrary {
        name: name.to_string(),
        kind: library_kind(&build_files),
    });

    // includes
    if node.is_component {
        session.add_component_includes(&build_files.include);
    } else {
        session.add_user_includes(&build_files.include);
    }
    let includes = merge_includes(
        &root,
        &parent.target,
        &parent.includes,
        scope,
        &build_files.include,
        PathOverrides {
            add_path: &options.add_path,
            add_path_asm: &options.add_path_asm,
            del_path: &options.del_path,
        },
    );
    out.push(Directive::IncludeDirectories {
        target: name.to_string(),
        scope,
        parent: Some(includes.parent.clone()),
        includes: includes.includes.clone(),
    });

    // definitions
    let defines = merge_defines(&parent.target, &parent.defines, &options.define, &options.undefine);
    out.push(Directive::CompileDefinitions {
        target: name.to_string(),
        scope,
        parent: Some(defines.parent.clone()),
        defines: defines.defines.clone(),
    });

    let mut define_asm = options.define_asm.clone();
    append_uniquely(&mut define_asm, &parent.define_asm);
    let mut misc_asm = parent.misc_asm.clone();
    append_uniquely(&mut misc_asm, &options.misc.asm);

    // abstractions
    let file_abstractions = has_file_abstractions(&options.files);
    let resolved = CompilerAbstractions::inherit(&parent.abstractions, &options.abstractions);
    let own_languages = build_files.languages();
    let languages = subtree_languages(&options.files, node.children);

    let mut owner = parent.owner.clone();
    let owner_differs = owner
        .as_ref()
        .map_or(true, |(_, abstractions)| *abstractions != resolved);
    if !file_abstractions && !resolved.are_empty(&languages) && owner_differs {
        out.push(Directive::AbstractionsBundle {
            owner: name.to_string(),
            abstractions: resolved.clone(),
            languages: languages.clone(),
        });
        owner = Some((name.to_string(), resolved.clone()));
    }
    let bundle = owner
        .as_ref()
        .filter(|_| !file_abstractions)
        .map(|(owner_name, _)| abstractions_target(owner_name));

    let mut libraries = Vec::new();
    if !build_files.interface && !resolved.are_empty(&own_languages) {
        libraries.extend(bundle.clone());
    }

    // compile options
    let has_children = !node.children.is_empty();
    let compiles = !build_files.source.is_empty() || !build_files.custom.is_empty();
    if compiles || (has_children && !node.is_component) {
        out.push(Directive::CompileOptions {
            target: name.to_string(),
            scope,
            parent: Some(parent.target.clone()),
            misc: options.misc.clone(),
            pre_includes: build_files.pre_include_local.clone(),
        });
    }

    // link libraries
    session.add_libraries(&build_files.library);
    libraries.extend(build_files.library.iter().cloned());
    libraries.extend(build_files.object.iter().cloned());
    if !libraries.is_empty() {
        out.push(Directive::LinkLibraries {
            target: name.to_string(),
            scope,
            libraries,
        });
    }

    // file level handling
    let mut node_includes = includes.effective.clone();
    if let Some(private) = build_files.include.get(&Scope::Private) {
        for (language, paths) in private {
            append_uniquely(node_includes.entry(*language).or_default(), paths);
        }
    }
    let files = FileContext {
        node: name,
        root: &root,
        node_includes: &node_includes,
        node_private: build_files.include.get(&Scope::Private),
        node_defines: &defines.effective,
        resolved: &resolved,
        file_abstractions,
        bundle: bundle.as_deref(),
        define_asm: &define_asm,
        misc_asm: &misc_asm,
    };
    for file in &options.files {
        if file.is_source() && !file.is_template() {
            build_file(&files, file, session, out);
        }
    }
    out.push(Directive::Blank);

    let inherited = Inherited {
        target: name.to_string(),
        includes: includes.effective,
        defines: defines.effective,
        abstractions: resolved,
        owner,
        define_asm,
        misc_asm,
    };
    for child in node.children {
        let child_node = Node {
            name: format!("{}_{}", name, replace_delimiters(&child.group)),
            title: format!("group {}", child.group),
            options: &child.options,
            children: &child.groups,
            is_component: false,
        };
        build_node(&child_node, &inherited, session, out);
    }

    session.link_units.push(name.to_string());
}

fn library_kind(build_files: &BuildFiles) -> LibraryKind {
    if build_files.interface {
        LibraryKind::Interface
    } else {
        LibraryKind::Object(build_files.source.values().flatten().cloned().collect())
    }
}

/// Node state needed for its files.
struct FileContext<'a> {
    node: &'a str,
    root: &'a str,
    node_includes: &'a LanguageMap,
    node_private: Option<&'a LanguageMap>,
    node_defines: &'a [Define],
    resolved: &'a CompilerAbstractions,
    file_abstractions: bool,
    bundle: Option<&'a str>,
    define_asm: &'a [Define],
    misc_asm: &'a [String],
}

fn build_file(node: &FileContext<'_>, file: &File, session: &mut BuildSession, out: &mut Vec<Directive>) {
    let language = file.language();
    let path = add_root_prefix(node.root, &file.file);

    if file.has_custom_options() {
        let unit = format!("{}_{}", node.node, replace_delimiters(&file.file));
        session.link_units.push(unit.clone());

        out.push(Directive::Blank);
        out.push(Directive::Comment(format!("file {}", file.file)));
        out.push(Directive::AddLibrary {
            name: unit.clone(),
            kind: LibraryKind::Object(vec![path.clone()]),
        });

        let mut private = ScopeMap::new();
        if let Some(languages) = node.node_private {
            private.insert(Scope::Private, languages.clone());
        }
        let includes = merge_includes(
            node.root,
            node.node,
            node.node_includes,
            Scope::Public,
            &private,
            PathOverrides {
                add_path: &file.add_path,
                add_path_asm: &file.add_path_asm,
                del_path: &file.del_path,
            },
        );
        out.push(Directive::IncludeDirectories {
            target: unit.clone(),
            scope: Scope::Public,
            parent: Some(includes.parent),
            includes: includes.includes,
        });

        if language != Language::Asm {
            out.push(Directive::CompileDefinitions {
                target: unit.clone(),
                scope: Scope::Public,
                parent: Some(parent_defines(node.node, node.node_defines, &file.undefine)),
                defines: file.define.clone(),
            });
        }

        out.push(Directive::CompileOptions {
            target: unit.clone(),
            scope: Scope::Public,
            parent: Some(node.node.to_string()),
            misc: Default::default(),
            pre_includes: Vec::new(),
        });

        if !node.file_abstractions && !node.resolved.is_empty_for(language) {
            if let Some(bundle) = node.bundle {
                out.push(Directive::LinkLibraries {
                    target: unit,
                    scope: Scope::Public,
                    libraries: vec![bundle.to_string()],
                });
            }
        }
    }

    let mut properties = FileProperties::new(path.clone(), language);
    properties.compile_options = file.misc.compile_flags(language);

    if language == Language::Asm {
        if !file.del_path.is_empty() {
            tracing::warn!("del-path is not supported for file {}", path);
        }
        if !file.undefine.is_empty() {
            tracing::warn!("undefine is not supported for file {}", path);
        }

        let mut defines = file.define.clone();
        append_uniquely(&mut defines, &file.define_asm);
        append_uniquely(&mut defines, node.define_asm);
        if !defines.is_empty() {
            let mut misc_asm = node.misc_asm.to_vec();
            append_uniquely(&mut misc_asm, &file.misc.asm);
            match asm_syntax(&session.toolchain, &file.file, &misc_asm) {
                Some(syntax) => properties
                    .compile_options
                    .extend(asm_define_flags(syntax, &defines)),
                None => properties.compile_definitions = defines,
            }
        }
    }

    if node.file_abstractions {
        let abstractions = CompilerAbstractions::inherit(node.resolved, &file.abstractions);
        if !abstractions.is_empty_for(language) {
            properties.abstractions = Some(abstractions);
        }
    }

    if !properties.is_empty() {
        out.push(Directive::SourceFileProperties(properties));
    }
}
