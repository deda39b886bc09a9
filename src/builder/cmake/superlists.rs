//! Super project lists: `CMakeLists.txt` orchestrating one external project
//! per context, and `roots.cmake`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::builder::graph::BuildDependencies;
use crate::core::index::Execute;
use crate::util::paths::add_root_prefix;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(input|output)(?:\((\d+)\))?\$").expect("valid placeholder pattern")
});

/// A context as seen by the super project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperContext {
    pub name: String,
    /// Build byproducts, root prefixed
    pub outputs: Vec<String>,
}

impl SuperContext {
    /// `outputs` are file names inside `outdir`, both relative to
    /// `context_root`.
    pub fn new(name: impl Into<String>, context_root: &str, outdir: &str, outputs: &[String]) -> Self {
        let outputs = outputs
            .iter()
            .map(|file| {
                let file = if outdir.is_empty() {
                    file.clone()
                } else {
                    format!("{}/{}", outdir.trim_end_matches('/'), file)
                };
                add_root_prefix(context_root, &file)
            })
            .collect();
        SuperContext {
            name: name.into(),
            outputs,
        }
    }
}

/// Everything the super project lists need.
#[derive(Debug, Clone)]
pub struct SuperProject<'a> {
    /// `csolution` path of the build index
    pub csolution: &'a str,
    pub contexts: &'a [SuperContext],
    pub executes: &'a [Execute],
    pub dependencies: &'a BuildDependencies,
    pub generator: &'a str,
    /// Pass `--verbose` to context builds and keep step logs on the terminal
    pub verbose: bool,
}

/// Project name: the solution file name without `.csolution.yml`.
fn project_name(csolution: &str) -> &str {
    let base = csolution.rsplit(['/', '\\']).next().unwrap_or(csolution);
    base.strip_suffix(".csolution.yml")
        .or_else(|| base.strip_suffix(".csolution.yaml"))
        .unwrap_or(base)
}

fn generator_argument(generator: &str) -> String {
    if generator.contains(' ') {
        format!("\"{}\"", generator)
    } else {
        generator.to_string()
    }
}

/// `roots.cmake`: cached root directories, overridable on the command line.
pub fn roots_cmake(pack_root: &str, compiler_root: &str, solution_root: &str) -> String {
    let mut content = "# roots.cmake\n".to_string();
    for (variable, value, description) in [
        ("CMSIS_PACK_ROOT", pack_root, "CMSIS pack root"),
        ("CMSIS_COMPILER_ROOT", compiler_root, "CMSIS compiler root"),
        ("SOLUTION_ROOT", solution_root, "CMSIS solution root"),
    ] {
        content.push_str(&format!(
            "set({0} \"{1}\" CACHE PATH \"{2}\")\n\
             cmake_path(ABSOLUTE_PATH {0} NORMALIZE OUTPUT_VARIABLE {0})\n",
            variable, value, description
        ));
    }
    content
}

/// The super project `CMakeLists.txt`.
pub fn super_lists(project: &SuperProject<'_>) -> String {
    let mut contexts = String::new();
    let mut dirs = String::new();
    let mut outputs = String::new();
    for (index, context) in project.contexts.iter().enumerate() {
        contexts.push_str(&format!("  \"{}\"\n", context.name.replace(' ', "_")));
        dirs.push_str(&format!("  \"${{CMAKE_CURRENT_SOURCE_DIR}}/{}\"\n", context.name));
        outputs.push_str(&format!("\nset(OUTPUTS_{}\n", index + 1));
        for output in &context.outputs {
            outputs.push_str(&format!("  \"{}\"\n", output));
        }
        outputs.push(')');
    }

    let (verbosity, log_configure, step_log) = if project.verbose {
        (" --verbose", "", "")
    } else {
        (
            "",
            "\n    LOG_CONFIGURE         ON\n    LOG_OUTPUT_ON_FAILURE ON",
            "\n    LOG               TRUE",
        )
    };
    let generator = generator_argument(project.generator);

    format!(
        r#"cmake_minimum_required(VERSION 3.27)
include(ExternalProject)

project("{name}" NONE)

# Roots
include("roots.cmake")

# Context specific lists
set(CONTEXTS
{contexts})
list(LENGTH CONTEXTS CONTEXTS_LENGTH)
math(EXPR CONTEXTS_LENGTH "${{CONTEXTS_LENGTH}}-1")

set(DIRS
{dirs})
{outputs}

set(ARGS
  "-DSOLUTION_ROOT=${{SOLUTION_ROOT}}"
  "-DCMSIS_PACK_ROOT=${{CMSIS_PACK_ROOT}}"
  "-DCMSIS_COMPILER_ROOT=${{CMSIS_COMPILER_ROOT}}"
)

# Compilation database
add_custom_target(database)

# Iterate over contexts
foreach(INDEX RANGE ${{CONTEXTS_LENGTH}})

  math(EXPR N "${{INDEX}}+1")
  list(GET CONTEXTS ${{INDEX}} CONTEXT)
  list(GET DIRS ${{INDEX}} DIR)

  # Create external project, set configure and build steps
  ExternalProject_Add(${{CONTEXT}}
    PREFIX                ${{DIR}}
    SOURCE_DIR            ${{DIR}}
    BINARY_DIR            ${{N}}
    INSTALL_COMMAND       ""
    TEST_COMMAND          ""
    CONFIGURE_COMMAND     ${{CMAKE_COMMAND}} -G {generator} -S <SOURCE_DIR> -B <BINARY_DIR> ${{ARGS}}
    BUILD_COMMAND         ${{CMAKE_COMMAND}} -E echo "Building CMake target '${{CONTEXT}}'"
    COMMAND               ${{CMAKE_COMMAND}} --build <BINARY_DIR>{verbosity}
    BUILD_ALWAYS          TRUE
    BUILD_BYPRODUCTS      ${{OUTPUTS_${{N}}}}{log_configure}
    USES_TERMINAL_BUILD   ON
  )

  # Executes command step
  ExternalProject_Add_Step(${{CONTEXT}} executes
    DEPENDEES         build
  )

  ExternalProject_Add_StepTargets(${{CONTEXT}} build configure executes)

  # Debug
  message(VERBOSE "Configure Context: ${{CMAKE_COMMAND}} -G {generator} -S ${{DIR}} -B ${{N}}")

  # Database generation step
  ExternalProject_Add_Step(${{CONTEXT}} database
    COMMAND           ${{CMAKE_COMMAND}} --build <BINARY_DIR> --target database{verbosity}
    ALWAYS            TRUE{step_log}
    USES_TERMINAL     ON
    DEPENDEES         configure
  )
  ExternalProject_Add_StepTargets(${{CONTEXT}} database)
  add_dependencies(database ${{CONTEXT}}-database)

endforeach(){executes}{dependencies}
"#,
        name = project_name(project.csolution),
        contexts = contexts,
        dirs = dirs,
        outputs = outputs,
        generator = generator,
        verbosity = verbosity,
        log_configure = log_configure,
        step_log = step_log,
        executes = executes_commands(project.executes),
        dependencies = build_dependencies(project.dependencies),
    )
}

/// Replace `$input$`, `$input(i)$`, `$output$` and `$output(i)$` with the
/// variables set for the step.
fn expand_placeholders(run: &str) -> String {
    PLACEHOLDER
        .replace_all(run, |captures: &Captures<'_>| {
            let variable = captures[1].to_uppercase();
            match captures.get(2) {
                Some(index) => format!("${{{}_{}}}", variable, index.as_str()),
                None => format!("${{{}}}", variable),
            }
        })
        .into_owned()
}

fn file_list(variable: &str, files: &[String]) -> String {
    if files.is_empty() {
        return String::new();
    }
    let files: Vec<String> = files.iter().map(|file| add_root_prefix("", file)).collect();
    let mut content = format!("\nset({}", variable);
    for file in &files {
        content.push_str(&format!("\n  \"{}\"", file));
    }
    content.push_str("\n)");
    for (index, file) in files.iter().enumerate() {
        content.push_str(&format!("\nset({}_{} \"{}\")", variable, index, file));
    }
    content
}

/// Custom targets for the execute steps of the index.
///
/// Steps marked `always` run on every build; the others run when an output
/// is missing or older than an input.
pub fn executes_commands(executes: &[Execute]) -> String {
    let mut content = String::new();
    for execute in executes {
        content.push_str(&format!("\n\n# Execute: {}", execute.execute));
        content.push_str(&file_list("INPUT", &execute.input));
        content.push_str(&file_list("OUTPUT", &execute.output));

        let run = expand_placeholders(&execute.run);
        if execute.always || execute.output.is_empty() {
            content.push_str(&format!(
                "\nadd_custom_target({} ALL\n  COMMAND {}\n  USES_TERMINAL\n)",
                execute.execute, run
            ));
        } else {
            let depends = if execute.input.is_empty() {
                ""
            } else {
                " DEPENDS ${INPUT}"
            };
            content.push_str(&format!(
                "\nadd_custom_target({} ALL DEPENDS ${{OUTPUT}})\
                 \nadd_custom_command(OUTPUT ${{OUTPUT}}{}\n  COMMAND {}\n  USES_TERMINAL\n)",
                execute.execute, depends, run
            ));
        }
    }
    content
}

/// `add_dependencies` for every step with dependencies.
pub fn build_dependencies(dependencies: &BuildDependencies) -> String {
    if dependencies.is_empty() {
        return String::new();
    }
    let mut content = "\n\n# Build dependencies".to_string();
    for (step, steps) in dependencies.entries() {
        content.push_str(&format!("\nadd_dependencies({}", step));
        for dependency in steps {
            content.push_str(&format!("\n  {}", dependency));
        }
        content.push_str("\n)");
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::CbuildRef;

    fn execute(name: &str, run: &str, always: bool, depends_on: &[&str]) -> Execute {
        Execute {
            execute: name.to_string(),
            run: run.to_string(),
            always,
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("../solution/test.csolution.yml"), "test");
        assert_eq!(project_name("test.csolution.yaml"), "test");
        assert_eq!(project_name("other.yml"), "other.yml");
    }

    #[test]
    fn test_roots_cmake() {
        assert_eq!(
            roots_cmake("/packs", "/etc", "/solution"),
            "# roots.cmake\
             \nset(CMSIS_PACK_ROOT \"/packs\" CACHE PATH \"CMSIS pack root\")\
             \ncmake_path(ABSOLUTE_PATH CMSIS_PACK_ROOT NORMALIZE OUTPUT_VARIABLE CMSIS_PACK_ROOT)\
             \nset(CMSIS_COMPILER_ROOT \"/etc\" CACHE PATH \"CMSIS compiler root\")\
             \ncmake_path(ABSOLUTE_PATH CMSIS_COMPILER_ROOT NORMALIZE OUTPUT_VARIABLE CMSIS_COMPILER_ROOT)\
             \nset(SOLUTION_ROOT \"/solution\" CACHE PATH \"CMSIS solution root\")\
             \ncmake_path(ABSOLUTE_PATH SOLUTION_ROOT NORMALIZE OUTPUT_VARIABLE SOLUTION_ROOT)\n"
        );
    }

    #[test]
    fn test_super_context_outputs() {
        let context = SuperContext::new(
            "project.debug+target",
            "project",
            "out/project/target/debug",
            &["project.axf".to_string(), "project.map".to_string()],
        );
        assert_eq!(
            context.outputs,
            vec![
                "${SOLUTION_ROOT}/project/out/project/target/debug/project.axf",
                "${SOLUTION_ROOT}/project/out/project/target/debug/project.map",
            ]
        );

        let flat = SuperContext::new("lib.release+target", ".", "", &["lib.a".to_string()]);
        assert_eq!(flat.outputs, vec!["${SOLUTION_ROOT}/lib.a"]);
    }

    #[test]
    fn test_build_dependencies_text() {
        let contexts = vec![CbuildRef {
            project: "project".to_string(),
            configuration: ".debug+target".to_string(),
            ..Default::default()
        }];
        let executes = vec![
            execute("RunAlways", "${CMAKE_COMMAND} -E echo always", true, &[]),
            execute("PostBuild", "${CMAKE_COMMAND} -E echo post", false, &["project.debug+target"]),
        ];
        let dependencies = BuildDependencies::new(&contexts, &executes).unwrap();
        assert_eq!(
            build_dependencies(&dependencies),
            "\n\n# Build dependencies\
             \nadd_dependencies(project.debug+target-build\n  RunAlways\n)\
             \nadd_dependencies(PostBuild\n  project.debug+target-build\n  RunAlways\n)\
             \nadd_dependencies(project.debug+target-executes\n  PostBuild\n  RunAlways\n)"
        );
        assert_eq!(build_dependencies(&BuildDependencies::default()), "");
    }

    #[test]
    fn test_executes_commands() {
        let mut archive = execute(
            "Archive",
            "${CMAKE_COMMAND} -E tar cf $output$ $input(0)$ $input(1)$",
            false,
            &[],
        );
        archive.input = vec!["out/a.bin".to_string(), "out/b.bin".to_string()];
        archive.output = vec!["out/archive.zip".to_string()];
        let always = execute("Generate", "${CMAKE_COMMAND} -E echo hello", true, &[]);

        assert_eq!(
            executes_commands(&[archive, always]),
            "\n\n# Execute: Archive\
             \nset(INPUT\n  \"${SOLUTION_ROOT}/out/a.bin\"\n  \"${SOLUTION_ROOT}/out/b.bin\"\n)\
             \nset(INPUT_0 \"${SOLUTION_ROOT}/out/a.bin\")\
             \nset(INPUT_1 \"${SOLUTION_ROOT}/out/b.bin\")\
             \nset(OUTPUT\n  \"${SOLUTION_ROOT}/out/archive.zip\"\n)\
             \nset(OUTPUT_0 \"${SOLUTION_ROOT}/out/archive.zip\")\
             \nadd_custom_target(Archive ALL DEPENDS ${OUTPUT})\
             \nadd_custom_command(OUTPUT ${OUTPUT} DEPENDS ${INPUT}\
             \n  COMMAND ${CMAKE_COMMAND} -E tar cf ${OUTPUT} ${INPUT_0} ${INPUT_1}\
             \n  USES_TERMINAL\n)\
             \n\n# Execute: Generate\
             \nadd_custom_target(Generate ALL\n  COMMAND ${CMAKE_COMMAND} -E echo hello\n  USES_TERMINAL\n)"
        );
    }

    #[test]
    fn test_super_lists() {
        let contexts = vec![SuperContext::new(
            "project.debug+target",
            "project",
            "out",
            &["project.axf".to_string()],
        )];
        let dependencies = BuildDependencies::default();
        let project = SuperProject {
            csolution: "solution.csolution.yml",
            contexts: &contexts,
            executes: &[],
            dependencies: &dependencies,
            generator: "Ninja",
            verbose: false,
        };
        let lists = super_lists(&project);
        assert!(lists.starts_with(
            "cmake_minimum_required(VERSION 3.27)\ninclude(ExternalProject)\n\nproject(\"solution\" NONE)\n"
        ));
        assert!(lists.contains("set(CONTEXTS\n  \"project.debug+target\"\n)\n"));
        assert!(lists.contains("set(DIRS\n  \"${CMAKE_CURRENT_SOURCE_DIR}/project.debug+target\"\n)\n"));
        assert!(lists.contains("\nset(OUTPUTS_1\n  \"${SOLUTION_ROOT}/project/out/project.axf\"\n)\n"));
        assert!(lists.contains("-G Ninja -S <SOURCE_DIR>"));
        assert!(lists.contains("LOG_CONFIGURE         ON"));
        assert!(lists.ends_with("endforeach()\n"));

        let verbose = SuperProject {
            verbose: true,
            generator: "Unix Makefiles",
            ..project
        };
        let lists = super_lists(&verbose);
        assert!(lists.contains("--build <BINARY_DIR> --verbose\n"));
        assert!(lists.contains("-G \"Unix Makefiles\" -S"));
        assert!(!lists.contains("LOG_CONFIGURE"));
    }
}
