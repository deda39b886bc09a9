//! Per-context build description (`*.cbuild.yml`).
//!
//! A context is one build configuration (project × build-type ×
//! target-type). It owns a recursive group tree, a flat component list and
//! the link step description. Derived state collected while walking the tree
//! is kept in [`crate::builder::session::BuildSession`], never here.

use serde::{Deserialize, Serialize};

use crate::core::abstractions::CompilerAbstractions;
use crate::core::define::Define;
use crate::core::language::{Language, Scope};

/// Top-level document of a `*.cbuild.yml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CbuildDocument {
    pub build: Cbuild,
}

/// One build context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Cbuild {
    pub generated_by: String,
    pub solution: String,
    pub project: String,
    pub context: String,
    /// Toolchain requirement, `Name` or `Name@constraint`
    pub compiler: String,
    pub board: String,
    pub device: String,
    pub processor: Processor,
    #[serde(flatten)]
    pub abstractions: CompilerAbstractions,
    pub misc: Misc,
    pub define: Vec<Define>,
    pub define_asm: Vec<Define>,
    pub add_path: Vec<String>,
    pub add_path_asm: Vec<String>,
    pub output_dirs: OutputDirs,
    pub output: Vec<Output>,
    pub components: Vec<Component>,
    pub linker: Linker,
    pub groups: Vec<Group>,
    pub constructed_files: Vec<File>,
}

/// Processor attributes, translated through fixed lookup tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Processor {
    pub core: String,
    pub fpu: String,
    pub dsp: String,
    pub mve: String,
    pub endian: String,
    pub trustzone: String,
    pub branch_protection: String,
}

/// Tool specific flags per language and link step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Misc {
    #[serde(rename = "ASM", skip_serializing_if = "Vec::is_empty")]
    pub asm: Vec<String>,
    #[serde(rename = "C", skip_serializing_if = "Vec::is_empty")]
    pub c: Vec<String>,
    #[serde(rename = "CPP", skip_serializing_if = "Vec::is_empty")]
    pub cpp: Vec<String>,
    #[serde(rename = "C-CPP", skip_serializing_if = "Vec::is_empty")]
    pub c_cpp: Vec<String>,
    #[serde(rename = "Link", skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
    #[serde(rename = "Link-C", skip_serializing_if = "Vec::is_empty")]
    pub link_c: Vec<String>,
    #[serde(rename = "Link-CPP", skip_serializing_if = "Vec::is_empty")]
    pub link_cpp: Vec<String>,
    #[serde(rename = "Library", skip_serializing_if = "Vec::is_empty")]
    pub library: Vec<String>,
}

impl Misc {
    /// True when no compile flag (ASM, C, CPP, C-CPP) is set.
    pub fn is_compile_empty(&self) -> bool {
        self.asm.is_empty() && self.c.is_empty() && self.cpp.is_empty() && self.c_cpp.is_empty()
    }

    /// Compile flags applying to a single language.
    ///
    /// C and C++ receive their own flags followed by the shared `C-CPP` flags.
    pub fn compile_flags(&self, language: Language) -> Vec<String> {
        match language {
            Language::Asm => self.asm.clone(),
            Language::C => self.c.iter().chain(&self.c_cpp).cloned().collect(),
            Language::Cxx => self.cpp.iter().chain(&self.c_cpp).cloned().collect(),
            Language::CCxx | Language::All => Vec::new(),
        }
    }
}

/// Intermediate and output directories, relative to the context file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    pub intdir: String,
    pub outdir: String,
}

/// Kind of a declared output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputType {
    Elf,
    Lib,
    Hex,
    Bin,
    CmseLib,
    Map,
    #[serde(other)]
    Other,
}

/// A declared output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: OutputType,
}

/// Linker settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Linker {
    pub script: String,
    pub regions: String,
    pub define: Vec<Define>,
}

/// Override surface shared by groups and components.
///
/// An empty field inherits the parent's value; removal needs an explicit
/// `undefine` or `del-path` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NodeOptions {
    #[serde(flatten)]
    pub abstractions: CompilerAbstractions,
    pub misc: Misc,
    pub define: Vec<Define>,
    pub define_asm: Vec<Define>,
    pub undefine: Vec<String>,
    pub add_path: Vec<String>,
    pub add_path_asm: Vec<String>,
    pub del_path: Vec<String>,
    pub files: Vec<File>,
}

/// A named node of the recursive group tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub group: String,
    #[serde(flatten)]
    pub options: NodeOptions,
    pub groups: Vec<Group>,
}

/// A software component, flat under its context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub component: String,
    #[serde(flatten)]
    pub options: NodeOptions,
}

/// A file entry of a group, component or the constructed file list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct File {
    pub file: String,
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub attr: String,
    #[serde(flatten)]
    pub abstractions: CompilerAbstractions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub define: Vec<Define>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub define_asm: Vec<Define>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub undefine: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_path_asm: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub del_path: Vec<String>,
    pub misc: Misc,
}

impl File {
    /// Convenience constructor used by fixtures and constructed files.
    pub fn new(file: impl Into<String>, category: impl Into<String>) -> Self {
        File {
            file: file.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Source categories: `source`, `sourceAsm`, `sourceC`, `sourceCpp`.
    pub fn is_source(&self) -> bool {
        self.category.starts_with("source")
    }

    pub fn is_template(&self) -> bool {
        self.attr == "template"
    }

    pub fn is_config(&self) -> bool {
        self.attr == "config"
    }

    /// Language by category, then `language:` attribute, then extension.
    pub fn language(&self) -> Language {
        Language::from_category(&self.category)
            .or_else(|| Language::from_attribute(&self.language))
            .or_else(|| Language::from_extension(&self.file))
            .unwrap_or(Language::All)
    }

    pub fn scope(&self) -> Scope {
        Scope::from_attribute(&self.scope)
    }

    /// Whether the file needs its own compilation unit.
    ///
    /// Path overrides always do; define overrides only for non-assembly
    /// files, since assembly defines go through file properties.
    pub fn has_custom_options(&self) -> bool {
        if !self.add_path.is_empty() || !self.add_path_asm.is_empty() {
            return true;
        }
        if self.language() == Language::Asm {
            return false;
        }
        !self.del_path.is_empty() || !self.define.is_empty() || !self.undefine.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cbuild() {
        let yaml = r#"
build:
  context: project.debug+target
  compiler: AC6@>=6.18.0
  processor:
    core: Cortex-M4
    fpu: sp
    branch-protection: bti
  optimize: size
  language-C: c11
  misc:
    C:
      - -Wno-unused
    Link:
      - --map
  define:
    - DEBUG
    - VALUE: 3
  output-dirs:
    outdir: out/project
  output:
    - type: elf
      file: project.axf
    - type: hex
      file: project.hex
  groups:
    - group: Source Files
      optimize: speed
      files:
        - file: ./main.c
          category: sourceC
      groups:
        - group: Nested
          del-path:
            - ./inc
  components:
    - component: ARM::CMSIS:CORE@6.0.0
      files:
        - file: ${CMSIS_PACK_ROOT}/ARM/CMSIS/6.0.0/Include/core_cm4.h
          category: header
          attr: config
"#;
        let doc: CbuildDocument = serde_yaml::from_str(yaml).unwrap();
        let cbuild = doc.build;
        assert_eq!(cbuild.context, "project.debug+target");
        assert_eq!(cbuild.processor.branch_protection, "bti");
        assert_eq!(cbuild.abstractions.optimize, "size");
        assert_eq!(cbuild.abstractions.language_c, "c11");
        assert_eq!(cbuild.misc.c, vec!["-Wno-unused"]);
        assert_eq!(cbuild.define[1].to_string(), "VALUE=3");
        assert_eq!(cbuild.output[1].kind, OutputType::Hex);
        assert_eq!(cbuild.groups[0].options.abstractions.optimize, "speed");
        assert_eq!(cbuild.groups[0].groups[0].options.del_path, vec!["./inc"]);
        assert!(cbuild.components[0].options.files[0].is_config());
    }

    #[test]
    fn test_file_language() {
        let mut file = File::new("file.c", "headerCpp");
        assert_eq!(file.language(), Language::Cxx);
        file.category = "source".to_string();
        assert_eq!(file.language(), Language::C);
        file.language = "asm".to_string();
        assert_eq!(file.language(), Language::Asm);
        assert_eq!(File::new("file.txt", "other").language(), Language::All);
    }

    #[test]
    fn test_custom_options() {
        let mut file = File::new("startup.s", "sourceAsm");
        file.define.push(Define::new("ASM_DEF"));
        assert!(!file.has_custom_options());
        file.add_path_asm.push("./inc".to_string());
        assert!(file.has_custom_options());

        let mut file = File::new("main.c", "sourceC");
        assert!(!file.has_custom_options());
        file.undefine.push("X".to_string());
        assert!(file.has_custom_options());
    }

    #[test]
    fn test_misc_compile_flags() {
        let misc = Misc {
            c: vec!["-c".to_string()],
            cpp: vec!["-cpp".to_string()],
            c_cpp: vec!["-both".to_string()],
            ..Default::default()
        };
        assert_eq!(misc.compile_flags(Language::C), vec!["-c", "-both"]);
        assert_eq!(misc.compile_flags(Language::Cxx), vec!["-cpp", "-both"]);
        assert!(misc.compile_flags(Language::Asm).is_empty());
        assert!(!misc.is_compile_empty());
    }
}
