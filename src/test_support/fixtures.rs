//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built description documents and a complete
//! on-disk solution with a compiler root and a registered toolchain.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A context with one C source, an AC6 requirement and an executable output.
pub const MINIMAL_CBUILD: &str = r#"build:
  generated-by: csolution version 2.6.0
  solution: ../solution.csolution.yml
  project: project.cproject.yml
  context: project.debug+target
  compiler: AC6@>=6.18.0
  device: ARMCM4
  processor:
    core: Cortex-M4
    fpu: sp
    endian: little
  optimize: debug
  debug: on
  define:
    - ARMCM4
    - _RTE_
  add-path:
    - ./RTE/_debug_target
  output-dirs:
    intdir: tmp
    outdir: out
  output:
    - type: elf
      file: project.axf
    - type: hex
      file: project.hex
  linker:
    script: ./RTE/Device/ARMCM4/ac6_linker_script.sct
  groups:
    - group: Source Files
      files:
        - file: ./main.c
          category: sourceC
        - file: ./main.h
          category: header
  components:
    - component: ARM::CMSIS:CORE@6.1.0
      files:
        - file: ${CMSIS_PACK_ROOT}/ARM/CMSIS/6.1.0/CMSIS/Core/Include/core_cm4.h
          category: header
    - component: ARM::Device:Startup&C Startup@2.2.0
      files:
        - file: ./RTE/Device/ARMCM4/startup_ARMCM4.c
          category: sourceC
          attr: config
        - file: ./RTE/Device/ARMCM4/system_ARMCM4.c
          category: sourceC
          attr: config
  constructed-files:
    - file: ./RTE/_debug_target/RTE_Components.h
      category: header
"#;

/// Write a context description at `relative` below `root`.
pub fn write_cbuild(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Write a build index listing `cbuilds` as `(file, project, configuration)`.
pub fn write_index(root: &Path, name: &str, cbuilds: &[(&str, &str, &str)]) -> PathBuf {
    let mut content = String::from(
        "build-idx:\n  generated-by: csolution version 2.6.0\n  csolution: solution.csolution.yml\n  cbuilds:\n",
    );
    for (file, project, configuration) in cbuilds {
        content.push_str(&format!(
            "    - cbuild: {}\n      project: {}\n      configuration: {}\n",
            file, project, configuration
        ));
    }
    let path = root.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A solution on disk with its compiler root.
#[derive(Debug)]
pub struct SolutionFixture {
    dir: TempDir,
}

impl SolutionFixture {
    /// Solution root, holding the build index.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn index_path(&self) -> PathBuf {
        self.root().join("solution.cbuild-idx.yml")
    }

    /// Directory with `AC6.6.18.0.cmake`.
    pub fn compiler_root(&self) -> PathBuf {
        self.root().join("etc")
    }

    /// Environment pointing at the compiler root and registering AC6 6.21.0.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            (
                "CMSIS_COMPILER_ROOT".to_string(),
                self.compiler_root().to_string_lossy().replace('\\', "/"),
            ),
            ("CMSIS_PACK_ROOT".to_string(), "/packs".to_string()),
            (
                "AC6_TOOLCHAIN_6_21_0".to_string(),
                "/opt/ac621/bin".to_string(),
            ),
        ]
    }
}

/// Create a solution with one context `project.debug+target`.
pub fn solution_fixture() -> SolutionFixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_cbuild(root, "project/project.debug+target.cbuild.yml", MINIMAL_CBUILD);
    write_index(
        root,
        "solution.cbuild-idx.yml",
        &[("project/project.debug+target.cbuild.yml", "project", ".debug+target")],
    );
    fs::create_dir_all(root.join("etc")).unwrap();
    fs::write(root.join("etc").join("AC6.6.18.0.cmake"), "# AC6\n").unwrap();
    SolutionFixture { dir }
}
