//! CMake text rendering.
//!
//! The builder produces [`Directive`]s; this module turns them into CMake
//! statements. The file level layouts live in the submodules: [`context`]
//! for the per-context lists and [`superlists`] for the super project.

pub mod context;
pub mod superlists;

use crate::builder::directives::{abstractions_target, Directive, FileProperties, LibraryKind};
use crate::builder::merge::{ParentDefines, ParentIncludes};
use crate::core::abstractions::CompilerAbstractions;
use crate::core::cbuild::Misc;
use crate::core::define::{join_defines, Define};
use crate::core::language::{Language, LanguageMap, Scope, ScopeMap};
use crate::util::paths::adjust_relative_path;

/// Renders directives of one context.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Context root relative to the solution root
    root: String,
    /// Context languages in stable order
    languages: Vec<Language>,
}

impl Renderer {
    pub fn new(root: impl Into<String>, languages: &[Language]) -> Self {
        let mut languages = languages.to_vec();
        languages.sort();
        Renderer {
            root: root.into(),
            languages,
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Render a sequence of directives.
    pub fn render(&self, directives: &[Directive]) -> String {
        let mut content = String::new();
        for directive in directives {
            content.push_str(&self.render_directive(directive));
        }
        content
    }

    pub fn render_directive(&self, directive: &Directive) -> String {
        match directive {
            Directive::Comment(text) => format!("\n# {}", text),
            Directive::Blank => "\n".to_string(),
            Directive::AddLibrary { name, kind } => add_library(name, kind),
            Directive::IncludeDirectories {
                target,
                scope,
                parent,
                includes,
            } => include_directories(target, *scope, parent.as_ref(), includes),
            Directive::CompileDefinitions {
                target,
                scope,
                parent,
                defines,
            } => compile_definitions(target, *scope, parent.as_ref(), defines),
            Directive::AbstractionsBundle {
                owner,
                abstractions,
                languages,
            } => abstractions_bundle(owner, abstractions, languages),
            Directive::CompileOptions {
                target,
                scope,
                parent,
                misc,
                pre_includes,
            } => self.compile_options(target, *scope, parent.as_deref(), misc, pre_includes),
            Directive::LinkLibraries {
                target,
                scope,
                libraries,
            } => link_libraries(target, *scope, libraries),
            Directive::SourceFileProperties(properties) => source_file_properties(properties),
        }
    }

    /// `target_compile_options` with misc flags expanded per context
    /// language.
    pub fn compile_options(
        &self,
        target: &str,
        scope: Scope,
        parent: Option<&str>,
        misc: &Misc,
        pre_includes: &[String],
    ) -> String {
        let mut content = format!("\ntarget_compile_options({} {}", target, scope.as_str());
        if let Some(parent) = parent {
            content.push_str(&format!(
                "\n  $<TARGET_PROPERTY:{},INTERFACE_COMPILE_OPTIONS>",
                parent
            ));
        }
        for language in &self.languages {
            let options = misc.compile_flags(*language);
            content.push_str(&self.language_options(*language, &options));
        }
        content.push_str(&pre_include_options(pre_includes));
        content.push_str("\n)");
        content
    }

    /// `$<$<COMPILE_LANGUAGE:L>:...>` block, empty without options.
    ///
    /// Relative paths inside options are anchored at the context root.
    pub fn language_options(&self, language: Language, options: &[String]) -> String {
        if options.is_empty() {
            return String::new();
        }
        let mut content = format!("\n  $<$<COMPILE_LANGUAGE:{}>:", language.as_str());
        for option in options {
            content.push_str("\n    ");
            content.push_str(&adjust_relative_path(&self.root, option));
        }
        content.push_str("\n  >");
        content
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text)
}

pub fn pre_include_options(pre_includes: &[String]) -> String {
    pre_includes
        .iter()
        .map(|file| format!("\n  SHELL:${{_PI}}\"{}\"", file))
        .collect()
}

pub fn add_library(name: &str, kind: &LibraryKind) -> String {
    match kind {
        LibraryKind::Interface => format!("\nadd_library({} INTERFACE)", name),
        LibraryKind::Object(sources) => {
            let mut content = format!("\nadd_library({} OBJECT", name);
            for source in sources {
                content.push_str("\n  ");
                content.push_str(&quoted(source));
            }
            content.push_str("\n)");
            content
        }
    }
}

/// Paths of one scope, `ALL` unwrapped and the others behind a language
/// generator expression, at `indent`.
fn language_paths(languages: &LanguageMap, indent: &str) -> String {
    let mut content = String::new();
    for (language, paths) in languages {
        if *language == Language::All {
            for path in paths {
                content.push_str(&format!("\n{}{}", indent, quoted(path)));
            }
        } else {
            content.push_str(&format!(
                "\n{}$<$<COMPILE_LANGUAGE:{}>:",
                indent,
                language.as_str()
            ));
            for path in paths {
                content.push_str(&format!("\n{}  {}", indent, quoted(path)));
            }
            content.push_str(&format!("\n{}>", indent));
        }
    }
    content
}

fn parent_include_paths(parent: Option<&ParentIncludes>, indent: &str) -> String {
    match parent {
        Some(ParentIncludes::Inherited(target)) => format!(
            "\n{}$<TARGET_PROPERTY:{},INTERFACE_INCLUDE_DIRECTORIES>",
            indent, target
        ),
        Some(ParentIncludes::Resolved(languages)) => language_paths(languages, indent),
        None => String::new(),
    }
}

/// `target_include_directories`; the parent part goes to `scope`.
///
/// With more than one scope every scope keyword gets its own line.
pub fn include_directories(
    target: &str,
    scope: Scope,
    parent: Option<&ParentIncludes>,
    includes: &ScopeMap,
) -> String {
    let single = includes.keys().all(|key| *key == scope);
    if single {
        let mut content = format!("\ntarget_include_directories({} {}", target, scope.as_str());
        content.push_str(&parent_include_paths(parent, "  "));
        if let Some(languages) = includes.get(&scope) {
            content.push_str(&language_paths(languages, "  "));
        }
        content.push_str("\n)");
        return content;
    }

    let mut scopes: Vec<Scope> = includes.keys().copied().collect();
    if !scopes.contains(&scope) {
        scopes.push(scope);
        scopes.sort();
    }

    let mut content = format!("\ntarget_include_directories({}", target);
    for current in scopes {
        content.push_str(&format!("\n  {}", current.as_str()));
        if current == scope {
            content.push_str(&parent_include_paths(parent, "    "));
        }
        if let Some(languages) = includes.get(&current) {
            content.push_str(&language_paths(languages, "    "));
        }
    }
    content.push_str("\n)");
    content
}

pub fn compile_definitions(
    target: &str,
    scope: Scope,
    parent: Option<&ParentDefines>,
    defines: &[Define],
) -> String {
    let mut content = format!("\ntarget_compile_definitions({} {}", target, scope.as_str());
    match parent {
        Some(ParentDefines::Inherited(parent)) => content.push_str(&format!(
            "\n  $<TARGET_PROPERTY:{},INTERFACE_COMPILE_DEFINITIONS>",
            parent
        )),
        Some(ParentDefines::Resolved(resolved)) => {
            for define in resolved {
                content.push_str(&format!("\n  {}", define));
            }
        }
        None => {}
    }
    for define in defines {
        content.push_str(&format!("\n  {}", define));
    }
    content.push_str("\n)");
    content
}

/// `cbuild_set_options_flags(<prefix> "o" "d" "w" "std" <variable>)`
fn set_options_flags(abstractions: &CompilerAbstractions, language: Language, variable: &str) -> String {
    let flags: Vec<String> = abstractions
        .options_flags(language)
        .iter()
        .map(|flag| quoted(flag))
        .collect();
    format!(
        "\ncbuild_set_options_flags({} {} {})",
        language.prefix(),
        flags.join(" "),
        variable
    )
}

/// `<owner>_ABSTRACTIONS` interface library carrying the resolved
/// abstractions for every language that has any.
pub fn abstractions_bundle(owner: &str, abstractions: &CompilerAbstractions, languages: &[Language]) -> String {
    let bundle = abstractions_target(owner);
    let mut content = format!("\nadd_library({} INTERFACE)", bundle);
    let mut options = String::new();
    for language in languages {
        if abstractions.is_empty_for(*language) {
            continue;
        }
        let variable = format!("{}_OPTIONS_FLAGS_{}", language.prefix(), owner);
        content.push_str(&set_options_flags(abstractions, *language, &variable));
        options.push_str(&format!(
            "\n  $<$<COMPILE_LANGUAGE:{}>:\n    SHELL:${{{}}}\n  >",
            language.as_str(),
            variable
        ));
    }
    content.push_str(&format!(
        "\ntarget_compile_options({} INTERFACE{}\n)",
        bundle, options
    ));
    content
}

/// One `set_source_files_properties` per file, preceded by the file's
/// abstraction flags when it has its own.
pub fn source_file_properties(properties: &FileProperties) -> String {
    let prefix = properties.language.prefix();
    let mut content = String::new();
    let mut options = properties.compile_options.clone();

    if let Some(abstractions) = &properties.abstractions {
        let variable = format!("{}_OPTIONS_FLAGS", prefix);
        content.push_str(&format!("\nset({})", variable));
        content.push_str(&set_options_flags(abstractions, properties.language, &variable));
        content.push_str(&format!("\nseparate_arguments({})", variable));
        options.push(format!("${{{}}}", variable));
    }

    content.push_str(&format!(
        "\nset_source_files_properties({} PROPERTIES",
        quoted(&properties.file)
    ));
    if !properties.compile_definitions.is_empty() {
        content.push_str(&format!(
            "\n  COMPILE_DEFINITIONS {}",
            quoted(&join_defines(&properties.compile_definitions, ";"))
        ));
    }
    if !options.is_empty() {
        content.push_str(&format!("\n  COMPILE_OPTIONS {}", quoted(&options.join(";"))));
    }
    content.push_str("\n)\n");
    content
}

pub fn link_libraries(target: &str, scope: Scope, libraries: &[String]) -> String {
    let mut content = format!("\ntarget_link_libraries({} {}", target, scope.as_str());
    for library in libraries {
        content.push_str("\n  ");
        content.push_str(library);
    }
    content.push_str("\n)");
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn languages(entries: &[(Language, &[&str])]) -> LanguageMap {
        entries
            .iter()
            .map(|(language, paths)| (*language, strings(paths)))
            .collect()
    }

    #[test]
    fn test_add_library() {
        assert_eq!(
            add_library("Group_Source", &LibraryKind::Interface),
            "\nadd_library(Group_Source INTERFACE)"
        );
        assert_eq!(
            add_library(
                "Group_Source",
                &LibraryKind::Object(strings(&["${SOLUTION_ROOT}/main.c"]))
            ),
            "\nadd_library(Group_Source OBJECT\n  \"${SOLUTION_ROOT}/main.c\"\n)"
        );
    }

    #[test]
    fn test_include_directories_single_scope() {
        let mut includes = ScopeMap::new();
        includes.insert(
            Scope::Public,
            languages(&[(Language::All, &["${SOLUTION_ROOT}/inc"]), (Language::C, &["${SOLUTION_ROOT}/c"])]),
        );
        let parent = ParentIncludes::Inherited("${CONTEXT}".to_string());
        assert_eq!(
            include_directories("Group_Source", Scope::Public, Some(&parent), &includes),
            "\ntarget_include_directories(Group_Source PUBLIC\
             \n  $<TARGET_PROPERTY:${CONTEXT},INTERFACE_INCLUDE_DIRECTORIES>\
             \n  \"${SOLUTION_ROOT}/inc\"\
             \n  $<$<COMPILE_LANGUAGE:C>:\
             \n    \"${SOLUTION_ROOT}/c\"\
             \n  >\
             \n)"
        );
    }

    #[test]
    fn test_include_directories_multiple_scopes() {
        let mut includes = ScopeMap::new();
        includes.insert(Scope::Public, languages(&[(Language::All, &["pub"])]));
        includes.insert(Scope::Private, languages(&[(Language::Asm, &["priv"])]));
        let parent = ParentIncludes::Resolved(languages(&[(Language::All, &["kept"])]));
        assert_eq!(
            include_directories("Unit", Scope::Public, Some(&parent), &includes),
            "\ntarget_include_directories(Unit\
             \n  PRIVATE\
             \n    $<$<COMPILE_LANGUAGE:ASM>:\
             \n      \"priv\"\
             \n    >\
             \n  PUBLIC\
             \n    \"kept\"\
             \n    \"pub\"\
             \n)"
        );
    }

    #[test]
    fn test_compile_definitions() {
        let parent = ParentDefines::Inherited("Group_Source".to_string());
        assert_eq!(
            compile_definitions(
                "Unit",
                Scope::Public,
                Some(&parent),
                &[Define::new("DEBUG"), Define::with_value("LEVEL", "2")]
            ),
            "\ntarget_compile_definitions(Unit PUBLIC\
             \n  $<TARGET_PROPERTY:Group_Source,INTERFACE_COMPILE_DEFINITIONS>\
             \n  DEBUG\
             \n  LEVEL=2\
             \n)"
        );
    }

    #[test]
    fn test_abstractions_bundle() {
        let abstractions = CompilerAbstractions {
            optimize: "size".to_string(),
            language_c: "c11".to_string(),
            ..Default::default()
        };
        assert_eq!(
            abstractions_bundle("Group_Source", &abstractions, &[Language::Asm, Language::C]),
            "\nadd_library(Group_Source_ABSTRACTIONS INTERFACE)\
             \ncbuild_set_options_flags(ASM \"size\" \"\" \"\" \"\" ASM_OPTIONS_FLAGS_Group_Source)\
             \ncbuild_set_options_flags(CC \"size\" \"\" \"\" \"c11\" CC_OPTIONS_FLAGS_Group_Source)\
             \ntarget_compile_options(Group_Source_ABSTRACTIONS INTERFACE\
             \n  $<$<COMPILE_LANGUAGE:ASM>:\
             \n    SHELL:${ASM_OPTIONS_FLAGS_Group_Source}\
             \n  >\
             \n  $<$<COMPILE_LANGUAGE:C>:\
             \n    SHELL:${CC_OPTIONS_FLAGS_Group_Source}\
             \n  >\
             \n)"
        );
    }

    #[test]
    fn test_compile_options_per_language() {
        let renderer = Renderer::new("project", &[Language::C, Language::Asm]);
        let misc = Misc {
            c: strings(&["-include", "./config.h"]),
            asm: strings(&["-masm=auto"]),
            ..Default::default()
        };
        assert_eq!(
            renderer.compile_options(
                "Group_Source",
                Scope::Public,
                Some("${CONTEXT}"),
                &misc,
                &strings(&["${SOLUTION_ROOT}/pre.h"])
            ),
            "\ntarget_compile_options(Group_Source PUBLIC\
             \n  $<TARGET_PROPERTY:${CONTEXT},INTERFACE_COMPILE_OPTIONS>\
             \n  $<$<COMPILE_LANGUAGE:ASM>:\
             \n    -masm=auto\
             \n  >\
             \n  $<$<COMPILE_LANGUAGE:C>:\
             \n    -include\
             \n    ${SOLUTION_ROOT}/project/config.h\
             \n  >\
             \n  SHELL:${_PI}\"${SOLUTION_ROOT}/pre.h\"\
             \n)"
        );
    }

    #[test]
    fn test_source_file_properties() {
        let mut properties = FileProperties::new("${SOLUTION_ROOT}/project/main.c", Language::C);
        properties.compile_options = strings(&["-Wextra"]);
        properties.compile_definitions = vec![Define::new("A"), Define::with_value("B", "1")];
        properties.abstractions = Some(CompilerAbstractions {
            optimize: "none".to_string(),
            ..Default::default()
        });
        assert_eq!(
            source_file_properties(&properties),
            "\nset(CC_OPTIONS_FLAGS)\
             \ncbuild_set_options_flags(CC \"none\" \"\" \"\" \"\" CC_OPTIONS_FLAGS)\
             \nseparate_arguments(CC_OPTIONS_FLAGS)\
             \nset_source_files_properties(\"${SOLUTION_ROOT}/project/main.c\" PROPERTIES\
             \n  COMPILE_DEFINITIONS \"A;B=1\"\
             \n  COMPILE_OPTIONS \"-Wextra;${CC_OPTIONS_FLAGS}\"\
             \n)\n"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = Renderer::new("project", &[Language::C]);
        let directives = vec![
            Directive::Comment("group Source".to_string()),
            Directive::AddLibrary {
                name: "Group_Source".to_string(),
                kind: LibraryKind::Interface,
            },
            Directive::LinkLibraries {
                target: "Group_Source".to_string(),
                scope: Scope::Interface,
                libraries: strings(&["lib.a"]),
            },
            Directive::Blank,
        ];
        let first = renderer.render(&directives);
        assert_eq!(first, renderer.render(&directives));
        assert_eq!(
            first,
            "\n# group Source\nadd_library(Group_Source INTERFACE)\
             \ntarget_link_libraries(Group_Source INTERFACE\n  lib.a\n)\n"
        );
    }
}
