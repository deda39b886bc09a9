//! Link step planning: primary output, byproducts, linker script handling
//! and the libraries linked into the context target.

use crate::core::cbuild::{Linker, Misc, Output, OutputType};
use crate::core::define::Define;
use crate::core::language::Language;
use crate::util::paths::add_root_prefix;

/// CMake target type of the primary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Executable,
    Library,
}

impl TargetKind {
    pub fn command(&self) -> &'static str {
        match self {
            TargetKind::Executable => "add_executable",
            TargetKind::Library => "add_library",
        }
    }

    pub fn output_directory_property(&self) -> &'static str {
        match self {
            TargetKind::Executable => "RUNTIME_OUTPUT_DIRECTORY",
            TargetKind::Library => "ARCHIVE_OUTPUT_DIRECTORY",
        }
    }
}

/// Post-link conversion of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Hex,
    Bin,
}

impl Conversion {
    pub fn title(&self) -> &'static str {
        match self {
            Conversion::Hex => "Hex",
            Conversion::Bin => "Bin",
        }
    }

    /// Objcopy arguments variable provided by the toolchain configuration.
    pub fn arguments(&self) -> &'static str {
        match self {
            Conversion::Hex => "${ELF2HEX}",
            Conversion::Bin => "${ELF2BIN}",
        }
    }
}

/// Outputs of a context sorted into link target, byproducts and
/// conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPlan {
    pub kind: Option<TargetKind>,
    /// Primary file name without extension
    pub name: String,
    /// Extension of the primary file, including the dot
    pub extension: String,
    /// `(variable, file)` pairs set before the processor options
    pub byproducts: Vec<(&'static str, String)>,
    pub conversions: Vec<Conversion>,
}

impl OutputPlan {
    pub fn new(outputs: &[Output]) -> Self {
        let mut plan = OutputPlan::default();
        for output in outputs {
            match output.kind {
                OutputType::Hex => {
                    plan.byproducts.push(("HEX_FILE", output.file.clone()));
                    plan.conversions.push(Conversion::Hex);
                }
                OutputType::Bin => {
                    plan.byproducts.push(("BIN_FILE", output.file.clone()));
                    plan.conversions.push(Conversion::Bin);
                }
                OutputType::CmseLib => plan.byproducts.push(("CMSE_LIB", output.file.clone())),
                OutputType::Elf | OutputType::Lib => {
                    plan.kind = Some(if output.kind == OutputType::Elf {
                        TargetKind::Executable
                    } else {
                        TargetKind::Library
                    });
                    let (name, extension) = split_extension(&output.file);
                    plan.name = name.to_string();
                    plan.extension = extension.to_string();
                }
                OutputType::Map | OutputType::Other => {}
            }
        }
        plan
    }

    pub fn is_executable(&self) -> bool {
        self.kind == Some(TargetKind::Executable)
    }
}

fn split_extension(file: &str) -> (&str, &str) {
    let name_start = file.rfind('/').map_or(0, |index| index + 1);
    match file[name_start..].rfind('.') {
        Some(index) => file.split_at(name_start + index),
        None => (file, ""),
    }
}

/// Linker script handling of an executable context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkerPlan {
    pub script: String,
    pub regions: Option<String>,
    pub defines: Vec<Define>,
    /// Name of the preprocessed script in the binary directory
    pub preprocessed: Option<String>,
}

impl LinkerPlan {
    pub fn new(root: &str, linker: &Linker) -> Self {
        let preprocessed = needs_preprocessing(linker).then(|| {
            let base = linker.script.rsplit('/').next().unwrap_or(&linker.script);
            base.strip_suffix(".src").unwrap_or(base).to_string()
        });
        LinkerPlan {
            script: add_root_prefix(root, &linker.script),
            regions: (!linker.regions.is_empty()).then(|| add_root_prefix(root, &linker.regions)),
            defines: linker.define.clone(),
            preprocessed,
        }
    }
}

/// A script must go through the preprocessor when it is a `.src`
/// template, or when regions or defines are given.
pub fn needs_preprocessing(linker: &Linker) -> bool {
    linker.script.ends_with(".src") || !linker.regions.is_empty() || !linker.define.is_empty()
}

/// Linker flags: `Link`, then `Link-C` and `Link-CPP` for the languages
/// present.
pub fn link_options(misc: &Misc, languages: &[Language]) -> Vec<String> {
    let mut options = misc.link.clone();
    for language in languages {
        match language {
            Language::C => options.extend(misc.link_c.iter().cloned()),
            Language::Cxx => options.extend(misc.link_cpp.iter().cloned()),
            _ => {}
        }
    }
    options
}

/// Libraries linked into the context target after the generated units.
///
/// GCC resolves symbols in a single pass, so with more than one library all
/// of them are wrapped in a rescanned group.
pub fn link_libraries(toolchain: &str, misc_libraries: &[String], global_libraries: &[String]) -> Vec<String> {
    let mut libraries = misc_libraries.to_vec();
    if toolchain == "GCC" && misc_libraries.len() + global_libraries.len() > 1 {
        libraries.extend(global_libraries.iter().cloned());
        libraries.insert(0, "-Wl,--start-group".to_string());
        libraries.push("-Wl,--end-group".to_string());
    }
    libraries
}
