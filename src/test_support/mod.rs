//! Test utilities for cbuild2cmake unit tests.
//!
//! Fixtures write real description files into temporary directories, so
//! the pipeline is exercised end to end without mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use cbuild2cmake::test_support::solution_fixture;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = solution_fixture();
//!     let solution = load_solution(&fixture.index_path()).unwrap();
//!     assert_eq!(solution.contexts.len(), 1);
//! }
//! ```

pub mod fixtures;

// Re-export fixtures for convenience
pub use fixtures::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_fixture_layout() {
        let fixture = solution_fixture();
        assert!(fixture.index_path().is_file());
        assert!(fixture.compiler_root().join("AC6.6.18.0.cmake").is_file());
        assert!(fixture
            .root()
            .join("project/project.debug+target.cbuild.yml")
            .is_file());
    }
}
