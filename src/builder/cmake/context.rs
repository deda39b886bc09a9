//! Per-context lists: `CMakeLists.txt`, `toolchain.cmake`, `groups.cmake`
//! and `components.cmake`.

use crate::builder::cmake::{
    abstractions_bundle, compile_definitions, include_directories, link_libraries,
    pre_include_options, Renderer,
};
use crate::builder::link::LinkerPlan;
use crate::builder::processor::processor_variables;
use crate::builder::ContextBuild;
use crate::core::cbuild::{Cbuild, Processor};
use crate::core::define::join_defines;
use crate::core::language::{Language, Scope, ScopeMap};
use crate::resolver::SelectedToolchain;
use crate::util::paths::add_root_prefix;

/// Name and contents of every file of a context directory.
pub fn render_context(cbuild: &Cbuild, build: &ContextBuild) -> Vec<(&'static str, String)> {
    let renderer = Renderer::new(build.root.as_str(), &build.languages);
    vec![
        ("CMakeLists.txt", context_lists(cbuild, build, &renderer)),
        ("toolchain.cmake", toolchain_cmake(&build.toolchain)),
        (
            "groups.cmake",
            format!("# groups.cmake\n{}", renderer.render(&build.tree.groups)),
        ),
        (
            "components.cmake",
            format!("# components.cmake\n{}", renderer.render(&build.tree.components)),
        ),
    ]
}

/// `toolchain.cmake`: the selected installation and its configuration.
pub fn toolchain_cmake(toolchain: &SelectedToolchain) -> String {
    format!(
        "# toolchain.cmake\n\
         \n\
         set(REGISTERED_TOOLCHAIN_ROOT \"{}\")\n\
         set(REGISTERED_TOOLCHAIN_VERSION \"{}\")\n\
         include(\"${{CMSIS_COMPILER_ROOT}}/{}\")\n",
        toolchain.root, toolchain.version, toolchain.config
    )
}

fn processor_options(processor: &Processor) -> String {
    processor_variables(processor)
        .into_iter()
        .map(|(variable, value)| format!("\nset({} {})", variable, value))
        .collect()
}

/// Context level compile options: processor flags, global misc and global
/// pre-includes.
fn global_compile_options(cbuild: &Cbuild, build: &ContextBuild, renderer: &Renderer) -> String {
    let processor = &cbuild.processor;
    let mut content = "\ntarget_compile_options(${CONTEXT} PUBLIC".to_string();
    for language in renderer.languages() {
        let prefix = language.prefix();
        let mut options = vec![
            format!("SHELL:${{{}_CPU}}", prefix),
            format!("SHELL:${{{}_FLAGS}}", prefix),
        ];
        if !processor.trustzone.is_empty() {
            options.push(format!("${{{}_SECURE}}", prefix));
        }
        if !processor.branch_protection.is_empty() {
            options.push(format!("${{{}_BRANCHPROT}}", prefix));
        }
        if !processor.endian.is_empty() {
            options.push(format!("${{{}_BYTE_ORDER}}", prefix));
        }
        options.extend(cbuild.misc.compile_flags(*language));
        content.push_str(&renderer.language_options(*language, &options));
    }
    content.push_str(&pre_include_options(&build.session.pre_include_global));
    content.push_str("\n)");
    content
}

fn system_includes(languages: &[Language]) -> String {
    languages
        .iter()
        .filter(|language| matches!(language, Language::C | Language::Cxx))
        .map(|language| {
            format!(
                "\nset(CMAKE_{0}_STANDARD_INCLUDE_DIRECTORIES ${{CMAKE_{0}_IMPLICIT_INCLUDE_DIRECTORIES}})",
                language.as_str()
            )
        })
        .collect()
}

fn linker_variables(linker: &LinkerPlan) -> String {
    let mut content = format!("\nset(LD_SCRIPT \"{}\")", linker.script);
    if let Some(regions) = &linker.regions {
        content.push_str(&format!("\nset(LD_REGIONS \"{}\")", regions));
    }
    if !linker.defines.is_empty() {
        content.push_str(&format!(
            "\nset(LD_SCRIPT_PP_DEFINES\n  {}\n)",
            join_defines(&linker.defines, "\n  ")
        ));
    }
    match &linker.preprocessed {
        Some(file) => content.push_str(&format!(
            "\nset(LD_SCRIPT_PP \"${{CMAKE_CURRENT_BINARY_DIR}}/{}\")",
            file
        )),
        None => content.push_str("\nset(LD_SCRIPT_PP ${LD_SCRIPT})"),
    }
    content
}

fn linker_options(cbuild: &Cbuild, build: &ContextBuild, linker: &LinkerPlan) -> String {
    let mut content = "\n# Linker options\ntarget_link_options(${CONTEXT} PUBLIC\
                       \n  SHELL:${LD_CPU}\n  SHELL:${_LS}\"${LD_SCRIPT_PP}\""
        .to_string();
    if !cbuild.processor.trustzone.is_empty() {
        content.push_str("\n  SHELL:${LD_SECURE}");
    }
    for option in &build.link_options {
        content.push_str("\n  ");
        content.push_str(option);
    }
    content.push_str("\n)");
    content.push_str("\nset_target_properties(${CONTEXT} PROPERTIES LINK_DEPENDS ${LD_SCRIPT})");
    if linker.preprocessed.is_some() {
        content.push_str(
            "\n\n# Linker script pre-processing\
             \nadd_custom_command(TARGET ${CONTEXT} PRE_LINK COMMAND ${CPP} ARGS ${CPP_ARGS_LD_SCRIPT} BYPRODUCTS ${LD_SCRIPT_PP})",
        );
    }
    content
}

/// The context `CMakeLists.txt`.
pub fn context_lists(cbuild: &Cbuild, build: &ContextBuild, renderer: &Renderer) -> String {
    let outputs = &build.outputs;
    let out_dir = add_root_prefix(&build.root, &cbuild.output_dirs.outdir);

    let byproducts: String = outputs
        .byproducts
        .iter()
        .map(|(variable, file)| format!("\nset({} \"{}\")", variable, file))
        .collect();
    let (linker_vars, linker_opts) = match &build.linker {
        Some(linker) => (linker_variables(linker), linker_options(cbuild, build, linker)),
        None => (String::new(), String::new()),
    };
    let conversions: String = outputs
        .conversions
        .iter()
        .map(|conversion| {
            format!(
                "\n\n# {} Conversion\n add_custom_command(TARGET ${{CONTEXT}} POST_BUILD COMMAND ${{CMAKE_OBJCOPY}} {})",
                conversion.title(),
                conversion.arguments()
            )
        })
        .collect();

    let languages = if build.languages.is_empty() {
        "NONE".to_string()
    } else {
        build
            .languages
            .iter()
            .map(Language::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let (target_command, directory_property) = match outputs.kind {
        Some(kind) => (kind.command(), kind.output_directory_property()),
        None => ("add_library", "ARCHIVE_OUTPUT_DIRECTORY"),
    };

    let mut includes = ScopeMap::new();
    if !build.includes.is_empty() {
        includes.insert(Scope::Public, build.includes.clone());
    }

    let abstractions = if cbuild.abstractions.are_empty(renderer.languages()) {
        String::new()
    } else {
        format!(
            "\n\n# Compile Options Abstractions{}",
            abstractions_bundle("${CONTEXT}", &cbuild.abstractions, renderer.languages())
        )
    };

    let mut content = format!(
        "cmake_minimum_required(VERSION 3.22)\n\
         \n\
         set(CONTEXT {context})\n\
         set(TARGET ${{CONTEXT}})\n\
         set(OUT_DIR \"{out_dir}\")\n\
         set(CMAKE_EXPORT_COMPILE_COMMANDS ON){byproducts}{linker_vars}\n\
         \n\
         # Processor Options{processor}\n\
         \n\
         # Toolchain config map\n\
         include(\"toolchain.cmake\")\n\
         \n\
         # Setup project\n\
         project(${{CONTEXT}} LANGUAGES {languages})\n\
         \n\
         # Compilation database\n\
         add_custom_target(database\n  \
         COMMAND ${{CMAKE_COMMAND}} -E make_directory \"${{OUT_DIR}}\"\n  \
         COMMAND ${{CMAKE_COMMAND}} -E copy_if_different \"${{CMAKE_CURRENT_BINARY_DIR}}/compile_commands.json\" \"${{OUT_DIR}}\"\n\
         ){system_includes}\n\
         \n\
         # Setup context\n\
         {target_command}(${{CONTEXT}})\n\
         set_target_properties(${{CONTEXT}} PROPERTIES PREFIX \"\" SUFFIX \"{extension}\" OUTPUT_NAME \"{name}\")\n\
         set_target_properties(${{CONTEXT}} PROPERTIES {directory_property} ${{OUT_DIR}})\n",
        context = cbuild.context,
        out_dir = out_dir,
        byproducts = byproducts,
        linker_vars = linker_vars,
        processor = processor_options(&cbuild.processor),
        languages = languages,
        system_includes = system_includes(&build.languages),
        target_command = target_command,
        extension = outputs.extension,
        name = outputs.name,
        directory_property = directory_property,
    );

    content.push_str("\n# Includes");
    content.push_str(&include_directories("${CONTEXT}", Scope::Public, None, &includes));
    content.push_str("\n\n# Defines");
    content.push_str(&compile_definitions("${CONTEXT}", Scope::Public, None, &cbuild.define));
    content.push_str("\n\n# Compile options");
    content.push_str(&global_compile_options(cbuild, build, renderer));
    content.push_str(&abstractions);
    content.push_str("\n\n# Add groups and components\ninclude(\"groups.cmake\")\ninclude(\"components.cmake\")\n");
    content.push_str(&link_libraries("${CONTEXT}", Scope::Public, &build.link_libraries));
    content.push('\n');
    content.push_str(&linker_opts);
    content.push_str(&conversions);
    content.push('\n');
    content
}
