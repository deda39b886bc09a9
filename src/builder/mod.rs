//! Translation of build contexts into CMake targets.
//!
//! A context is classified and walked into a [`TargetTree`] of directives,
//! together with the context level settings the emitter needs. Contexts are
//! independent of each other; only the step dependency graph
//! ([`graph`]) needs the whole solution.

pub mod asm;
pub mod classify;
pub mod cmake;
pub mod directives;
pub mod graph;
pub mod link;
pub mod merge;
pub mod processor;
pub mod session;
pub mod target_tree;

pub use directives::Directive;
pub use graph::{BuildDependencies, GraphError};
pub use session::BuildSession;
pub use target_tree::TargetTree;

use crate::core::cbuild::Cbuild;
use crate::core::language::{Language, LanguageMap};
use crate::resolver::SelectedToolchain;

use link::{link_libraries, link_options, LinkerPlan, OutputPlan};
use target_tree::context_interface_includes;

/// Everything generated for one context, ready for rendering.
#[derive(Debug, Clone)]
pub struct ContextBuild {
    /// Context directory relative to the solution root
    pub root: String,
    pub toolchain: SelectedToolchain,
    /// Source languages in discovery order
    pub languages: Vec<Language>,
    pub tree: TargetTree,
    pub session: BuildSession,
    /// Public include directories of the context target
    pub includes: LanguageMap,
    pub outputs: OutputPlan,
    /// Present for executables only
    pub linker: Option<LinkerPlan>,
    pub link_libraries: Vec<String>,
    pub link_options: Vec<String>,
}

/// Build the target tree and context settings of `cbuild`.
///
/// `root` is the directory of the context file relative to the solution
/// root.
pub fn build_context(cbuild: &Cbuild, root: &str, toolchain: SelectedToolchain) -> ContextBuild {
    let mut session = BuildSession::new(root, toolchain.name.as_str());
    let tree = TargetTree::build(cbuild, &mut session);
    let languages = session.languages().to_vec();

    let includes = context_interface_includes(cbuild, root);

    let outputs = OutputPlan::new(&cbuild.output);
    let linker = outputs
        .is_executable()
        .then(|| LinkerPlan::new(root, &cbuild.linker));

    let mut libraries = session.link_units.clone();
    libraries.extend(link_libraries(
        &toolchain.name,
        &cbuild.misc.library,
        &session.library_global,
    ));

    let options = link_options(&cbuild.misc, &languages)
        .iter()
        .map(|option| crate::util::paths::adjust_relative_path(root, option))
        .collect();

    tracing::debug!(
        "context {}: {} link units, languages {:?}",
        cbuild.context,
        session.link_units.len(),
        languages
    );

    ContextBuild {
        root: root.to_string(),
        toolchain,
        languages,
        tree,
        session,
        includes,
        outputs,
        linker,
        link_libraries: libraries,
        link_options: options,
    }
}
