//! High-level operations.
//!
//! This module contains the generation pipeline: loading the solution,
//! resolving toolchains, building and rendering every context, and writing
//! the lists.

pub mod clean;
pub mod generate;
pub mod parse;

pub use clean::{clean, clean_targets};
pub use generate::{generate, select_contexts, GenerateOptions, GenerateResult};
pub use parse::{load_solution, ContextDescription, DescriptionError, Solution};
