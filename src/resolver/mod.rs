//! Toolchain resolution.
//!
//! Each context names a compiler, optionally with a version constraint
//! (`AC6@>=6.18.0`). Resolution picks the newest registered installation
//! that is compatible with one of the toolchain configuration files in the
//! compiler root and satisfies the constraint. Catalog discovery does all
//! the I/O up front; selection itself is pure.

pub mod catalog;
pub mod errors;
pub mod resolve;
pub mod version;

pub use catalog::Toolchain;
pub use errors::ToolchainError;
pub use resolve::{resolve_toolchain, Requirement, SelectedToolchain, ToolchainCatalog};
pub use version::Constraint;
