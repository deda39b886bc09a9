//! Removal of intermediate and output directories.

use std::path::PathBuf;

use anyhow::Result;

use crate::ops::parse::{ContextDescription, Solution};
use crate::util::fs::remove_dir_all_if_exists;

/// Directories removed when cleaning `contexts`: the super project
/// directory, then each context's `intdir` and `outdir`.
pub fn clean_targets(solution: &Solution, contexts: &[&ContextDescription]) -> Vec<PathBuf> {
    let mut targets = vec![solution.tmp_dir()];
    for context in contexts {
        let base = context
            .path
            .parent()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_else(|| solution.root.clone());
        let dirs = &context.cbuild.output_dirs;
        for dir in [&dirs.intdir, &dirs.outdir] {
            if dir.is_empty() {
                continue;
            }
            let path = base.join(dir);
            if !targets.contains(&path) {
                targets.push(path);
            }
        }
    }
    targets
}

/// Remove intermediate and output directories of `contexts`.
pub fn clean(solution: &Solution, contexts: &[&ContextDescription]) -> Result<()> {
    for path in clean_targets(solution, contexts) {
        if path.exists() {
            tracing::info!("removing {}", path.display());
        }
        remove_dir_all_if_exists(&path)?;
    }
    Ok(())
}
