//! Loading of the build index and the context descriptions it references.

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::core::cbuild::{Cbuild, CbuildDocument};
use crate::core::index::{CbuildIndex, CbuildIndexDocument, CbuildRef};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{read_to_string, relative_path, to_slash};

/// Error while reading the build description.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum DescriptionError {
    #[error("invalid file argument: {path}")]
    #[diagnostic(
        code(cbuild2cmake::description::invalid_argument),
        help("pass the solution build index, e.g. `solution.cbuild-idx.yml`")
    )]
    InvalidArgument { path: String },

    #[error("file {path} was not found")]
    #[diagnostic(code(cbuild2cmake::description::not_found))]
    NotFound { path: PathBuf },

    #[error("failed to parse {path}: {reason}")]
    #[diagnostic(
        code(cbuild2cmake::description::parse),
        help("regenerate the build index with `csolution convert`")
    )]
    Parse { path: PathBuf, reason: String },
}

impl DescriptionError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DescriptionError::InvalidArgument { path } => {
                Diagnostic::error(format!("invalid file argument: {}", path))
                    .with_context("expected a file ending in `.cbuild-idx.yml`")
            }
            DescriptionError::NotFound { path } => {
                Diagnostic::error(format!("file {} was not found", path.display()))
            }
            DescriptionError::Parse { path, reason } => {
                Diagnostic::error("failed to parse build description")
                    .with_context(reason.clone())
                    .with_location(path.clone())
                    .with_suggestion(suggestions::REGENERATE_INDEX)
            }
        }
    }
}

/// A context description together with its place in the solution.
#[derive(Debug, Clone)]
pub struct ContextDescription {
    /// Entry of the index referring to this context
    pub reference: CbuildRef,
    /// Context name: project followed by configuration
    pub name: String,
    /// Path of the `*.cbuild.yml`
    pub path: PathBuf,
    /// Directory of the description relative to the solution root
    pub root: String,
    pub cbuild: Cbuild,
}

/// A parsed solution: the index and every context description found.
#[derive(Debug, Clone)]
pub struct Solution {
    pub index_path: PathBuf,
    /// Absolute directory of the index file
    pub root: PathBuf,
    pub index: CbuildIndex,
    pub contexts: Vec<ContextDescription>,
}

impl Solution {
    /// Intermediate directory of the generated super project.
    pub fn tmp_dir(&self) -> PathBuf {
        let tmpdir = self
            .index
            .tmpdir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .unwrap_or("tmp");
        self.root.join(tmpdir)
    }
}

/// Check that `path` names a build index.
pub fn check_index_path(path: &Path) -> Result<(), DescriptionError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.ends_with(".cbuild-idx.yml") && name.len() > ".cbuild-idx.yml".len() {
        Ok(())
    } else {
        Err(DescriptionError::InvalidArgument {
            path: path.display().to_string(),
        })
    }
}

/// Parse a `*.cbuild-idx.yml` document.
pub fn parse_index(path: &Path) -> Result<CbuildIndex> {
    if !path.is_file() {
        return Err(DescriptionError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let content = read_to_string(path)?;
    let document: CbuildIndexDocument =
        serde_yaml::from_str(&content).map_err(|e| DescriptionError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(document.build_idx)
}

/// Parse a `*.cbuild.yml` document.
pub fn parse_cbuild(path: &Path) -> Result<Cbuild> {
    let content = read_to_string(path)?;
    let document: CbuildDocument =
        serde_yaml::from_str(&content).map_err(|e| DescriptionError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(document.build)
}

/// Load the index at `index_path` and the context descriptions it lists.
///
/// Context files that do not exist are reported and skipped.
pub fn load_solution(index_path: &Path) -> Result<Solution> {
    check_index_path(index_path)?;
    let index = parse_index(index_path)?;
    let dir = index_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let root = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());

    let mut contexts = Vec::with_capacity(index.cbuilds.len());
    for reference in &index.cbuilds {
        let path = root.join(&reference.cbuild);
        if !path.is_file() {
            tracing::warn!("file {} was not found", path.display());
            continue;
        }
        let cbuild = parse_cbuild(&path)?;
        let context_dir = path.parent().unwrap_or(&root);
        let context_root = to_slash(&relative_path(&root, context_dir));

        let name = if reference.project.is_empty() {
            cbuild.context.clone()
        } else {
            reference.context_name()
        };
        tracing::debug!("context {} rooted at '{}'", name, context_root);

        contexts.push(ContextDescription {
            reference: reference.clone(),
            name,
            path,
            root: context_root,
            cbuild,
        });
    }

    Ok(Solution {
        index_path: index_path.to_path_buf(),
        root,
        index,
        contexts,
    })
}
