//! Build index (`*.cbuild-idx.yml`).
//!
//! The index lists the context descriptions of a solution, their
//! cross-context dependencies and the solution level execute steps. The
//! directory holding the index is the solution root.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level document of a `*.cbuild-idx.yml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CbuildIndexDocument {
    #[serde(rename = "build-idx")]
    pub build_idx: CbuildIndex,
}

/// Solution build index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CbuildIndex {
    pub generated_by: String,
    pub csolution: String,
    /// Intermediate directory for the generated super project, relative to
    /// the solution root (default `tmp`)
    pub tmpdir: Option<String>,
    pub cprojects: Vec<CprojectRef>,
    pub cbuilds: Vec<CbuildRef>,
    pub executes: Vec<Execute>,
}

/// Reference to a project of the solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CprojectRef {
    pub cproject: String,
}

/// Reference to a context description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CbuildRef {
    /// Path of the `*.cbuild.yml`, relative to the index
    pub cbuild: String,
    pub project: String,
    /// Build and target type suffix, e.g. `.debug+target`
    pub configuration: String,
    pub depends_on: Vec<String>,
}

impl CbuildRef {
    /// Context name: project followed by configuration.
    pub fn context_name(&self) -> String {
        format!("{}{}", self.project, self.configuration)
    }
}

/// A solution level execute step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Execute {
    pub execute: String,
    pub run: String,
    /// Set when the `always:` key is present, whatever its value
    #[serde(deserialize_with = "key_present")]
    pub always: bool,
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub depends_on: Vec<String>,
}

fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        let yaml = r#"
build-idx:
  generated-by: csolution version 2.6.0
  csolution: solution.csolution.yml
  tmpdir: tmp
  cprojects:
    - cproject: project/project.cproject.yml
  cbuilds:
    - cbuild: project/project.debug+target.cbuild.yml
      project: project
      configuration: .debug+target
      depends-on:
        - boot.debug+target
  executes:
    - execute: Archive
      run: ${CMAKE_COMMAND} -E tar cf $output$ $input$
      always:
      input:
        - out/project.axf
      output:
        - out/archive.zip
    - execute: Sign
      run: sign $input$
      depends-on:
        - project.debug+target
"#;
        let doc: CbuildIndexDocument = serde_yaml::from_str(yaml).unwrap();
        let index = doc.build_idx;
        assert_eq!(index.tmpdir.as_deref(), Some("tmp"));
        assert_eq!(index.cbuilds[0].context_name(), "project.debug+target");
        assert_eq!(index.cbuilds[0].depends_on, vec!["boot.debug+target"]);
        assert!(index.executes[0].always);
        assert!(!index.executes[1].always);
        assert_eq!(index.executes[1].depends_on, vec!["project.debug+target"]);
    }
}
