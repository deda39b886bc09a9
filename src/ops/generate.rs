//! Implementation of CMakeLists generation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::builder::cmake::context::render_context;
use crate::builder::cmake::superlists::{roots_cmake, super_lists, SuperContext, SuperProject};
use crate::builder::graph::available_executes;
use crate::builder::{build_context, BuildDependencies};
use crate::core::index::CbuildRef;
use crate::ops::clean::clean;
use crate::ops::parse::{load_solution, ContextDescription, Solution};
use crate::resolver::ToolchainCatalog;
use crate::util::fs::{to_slash, update_file};
use crate::util::GlobalContext;

/// Options for generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Glob patterns selecting contexts (empty = all)
    pub contexts: Vec<String>,

    /// Remove intermediate and output directories first
    pub clean: bool,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateResult {
    /// Directory holding the super project
    pub tmp_dir: PathBuf,

    /// Generated contexts, in index order
    pub contexts: Vec<String>,

    /// Files written because their content changed
    pub written: Vec<PathBuf>,

    /// Files left untouched
    pub unchanged: usize,
}

impl GenerateResult {
    fn record(&mut self, path: PathBuf, written: bool) {
        if written {
            self.written.push(path);
        } else {
            self.unchanged += 1;
        }
    }
}

/// Select contexts whose name matches one of `patterns`.
///
/// Every pattern must match at least one context.
pub fn select_contexts<'a>(
    contexts: &'a [ContextDescription],
    patterns: &[String],
) -> Result<Vec<&'a ContextDescription>> {
    if patterns.is_empty() {
        return Ok(contexts.iter().collect());
    }

    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let glob = glob::Pattern::new(pattern)
            .with_context(|| format!("invalid context pattern `{}`", pattern))?;
        if !contexts.iter().any(|context| glob.matches(&context.name)) {
            bail!(
                "context `{}` was not found\n\
                 available contexts: {}",
                pattern,
                if contexts.is_empty() {
                    "(none)".to_string()
                } else {
                    contexts
                        .iter()
                        .map(|context| context.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            );
        }
        compiled.push(glob);
    }

    Ok(contexts
        .iter()
        .filter(|context| compiled.iter().any(|glob| glob.matches(&context.name)))
        .collect())
}

/// Generate the super project and the lists of every selected context of
/// the solution indexed by `index_path`.
pub fn generate(gctx: &GlobalContext, index_path: &Path, opts: &GenerateOptions) -> Result<GenerateResult> {
    let solution = load_solution(index_path)?;
    let selected = select_contexts(&solution.contexts, &opts.contexts)?;
    let tmp_dir = solution.tmp_dir();

    if gctx.is_debug() {
        dump_descriptions(&solution, &selected);
    }

    if opts.clean {
        clean(&solution, &selected)?;
    }

    let roots = gctx.roots();
    let catalog = if selected.is_empty() {
        ToolchainCatalog::default()
    } else {
        ToolchainCatalog::discover(Path::new(&roots.compiler_root), gctx.env_vars(), gctx.config())?
    };

    let rendered: Vec<(String, Vec<(&'static str, String)>)> = selected
        .par_iter()
        .map(|context| {
            let toolchain = catalog
                .select(&context.cbuild.compiler)
                .with_context(|| format!("processing context {}", context.name))?;
            tracing::debug!(
                "context {}: {} {} with {}",
                context.name,
                toolchain.name,
                toolchain.version,
                toolchain.config
            );
            let build = build_context(&context.cbuild, &context.root, toolchain);
            Ok((context.name.clone(), render_context(&context.cbuild, &build)))
        })
        .collect::<Result<_>>()?;

    let references: Vec<CbuildRef> = selected.iter().map(|context| graph_reference(context)).collect();
    let executes = available_executes(&references, &solution.index.executes);
    let dependencies = BuildDependencies::new(&references, &executes)?;

    let mut result = GenerateResult {
        tmp_dir: tmp_dir.clone(),
        ..Default::default()
    };

    let super_contexts: Vec<SuperContext> = selected.iter().map(|context| super_context(context)).collect();
    let project = SuperProject {
        csolution: &solution.index.csolution,
        contexts: &super_contexts,
        executes: &executes,
        dependencies: &dependencies,
        generator: gctx.config().generator(),
        verbose: gctx.is_verbose(),
    };
    let solution_root = to_slash(&solution.root);
    for (file, content) in [
        ("CMakeLists.txt", super_lists(&project)),
        (
            "roots.cmake",
            roots_cmake(&roots.pack_root, &roots.compiler_root, &solution_root),
        ),
    ] {
        let path = tmp_dir.join(file);
        let written = update_file(&path, &content)?;
        result.record(path, written);
    }

    for (name, files) in rendered {
        let dir = tmp_dir.join(&name);
        for (file, content) in files {
            let path = dir.join(file);
            let written = update_file(&path, &content)?;
            result.record(path, written);
        }
        result.contexts.push(name);
    }

    log_summary(&solution, &result);
    Ok(result)
}

/// Index entry whose context name is the generated context's name.
fn graph_reference(context: &ContextDescription) -> CbuildRef {
    CbuildRef {
        project: context.name.clone(),
        configuration: String::new(),
        ..context.reference.clone()
    }
}

fn super_context(context: &ContextDescription) -> SuperContext {
    let outputs: Vec<String> = context
        .cbuild
        .output
        .iter()
        .map(|output| output.file.clone())
        .collect();
    SuperContext::new(
        context.name.as_str(),
        &context.root,
        &context.cbuild.output_dirs.outdir,
        &outputs,
    )
}

/// Log the parsed documents as JSON.
fn dump_descriptions(solution: &Solution, selected: &[&ContextDescription]) {
    match serde_json::to_string_pretty(&solution.index) {
        Ok(json) => tracing::debug!("{}:\n{}", solution.index_path.display(), json),
        Err(e) => tracing::debug!("cannot dump {}: {}", solution.index_path.display(), e),
    }
    for context in selected {
        match serde_json::to_string_pretty(&context.cbuild) {
            Ok(json) => tracing::debug!("{}:\n{}", context.path.display(), json),
            Err(e) => tracing::debug!("cannot dump {}: {}", context.path.display(), e),
        }
    }
}

fn log_summary(solution: &Solution, result: &GenerateResult) {
    for path in &result.written {
        tracing::debug!("updated {}", path.display());
    }
    tracing::debug!(
        "{} of {} files unchanged for {}",
        result.unchanged,
        result.unchanged + result.written.len(),
        solution.index_path.display()
    );
    tracing::info!(
        "CMakeLists were successfully generated in the {} directory",
        to_slash(&result.tmp_dir)
    );
}
