//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

/// cbuild2cmake - Generate CMakeLists from a CMSIS solution build index
#[derive(Parser)]
#[command(name = "cbuild2cmake")]
#[command(author, about, long_about = None, disable_version_flag = true)]
#[command(override_usage = "cbuild2cmake <name>.cbuild-idx.yml [options]")]
pub struct Cli {
    /// Solution build index (<name>.cbuild-idx.yml)
    #[arg(value_name = "INDEX")]
    pub inputs: Vec<PathBuf>,

    /// Print version
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Suppress output messages except build invocations
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug messages
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose messages from toolchain builds
    #[arg(short, long)]
    pub verbose: bool,

    /// Remove intermediate and output directories
    #[arg(short = 'C', long)]
    pub clean: bool,

    /// Generate only the contexts matching a glob pattern
    #[arg(long = "context", value_name = "PATTERN")]
    pub contexts: Vec<String>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub completions: Option<Shell>,
}
