//! CMakeLists generation command

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use cbuild2cmake::ops::{self, GenerateOptions};
use cbuild2cmake::util::GlobalContext;

use crate::cli::Cli;

/// Exactly one argument naming a build index is accepted.
fn index_argument(inputs: &[PathBuf]) -> Result<&Path> {
    match inputs {
        [input] => {
            ops::parse::check_index_path(input)?;
            Ok(input.as_path())
        }
        _ => bail!("invalid arguments: expected a single <name>.cbuild-idx.yml file"),
    }
}

pub fn execute(cli: &Cli) -> Result<()> {
    let index = index_argument(&cli.inputs)?;
    let solution_root = index
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut ctx = GlobalContext::new(solution_root)?;
    ctx.set_debug(cli.debug);
    ctx.set_verbose(cli.verbose);

    tracing::info!("Generate CMakeLists {}", env!("CARGO_PKG_VERSION"));

    let opts = GenerateOptions {
        contexts: cli.contexts.clone(),
        clean: cli.clean,
    };
    ops::generate(&ctx, index, &opts)?;

    Ok(())
}
