//! cbuild2cmake - CMake generation for CMSIS solutions
//!
//! This crate translates a solution build index and its per-context build
//! descriptions into a CMake super project orchestrating one CMake project
//! per context, including toolchain selection and step dependencies.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for cbuild2cmake unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides on-disk solution fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{cbuild::Cbuild, index::CbuildIndex};

pub use resolver::{SelectedToolchain, ToolchainCatalog};
pub use util::context::GlobalContext;
