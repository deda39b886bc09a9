//! Cross-context and execute step dependency graph.
//!
//! Every context contributes a `<context>-build` step and a
//! `<context>-executes` anchor; every execute of the index is a step of its
//! own. Execute steps marked `always` without dependencies run before
//! everything else, so they are added as dependencies of every other step
//! instead of depending on anything themselves.

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::core::index::{CbuildRef, Execute};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::list::append_uniquely;

/// Error in the step dependency graph.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum GraphError {
    #[error("dependency cycle between build steps: {}", .steps.join(" -> "))]
    #[diagnostic(
        code(cbuild2cmake::graph::cycle),
        help("remove one of the `depends-on` entries that close the cycle")
    )]
    Cycle { steps: Vec<String> },
}

impl GraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::Cycle { steps } => Diagnostic::error("dependency cycle between build steps")
                .with_context(format!("cycle: {}", steps.join(" -> ")))
                .with_suggestion(suggestions::BREAK_CYCLE),
        }
    }
}

/// Build step of a context.
pub fn build_step(context: &str) -> String {
    format!("{}-build", context)
}

/// Anchor step collecting the executes that follow a context build.
pub fn executes_step(context: &str) -> String {
    format!("{}-executes", context)
}

/// Executes of the index that can run with the generated `contexts`.
///
/// An execute is dropped when one of its dependencies is neither a
/// generated context nor a kept execute, which happens for contexts that
/// were filtered out or whose description is missing.
pub fn available_executes(contexts: &[CbuildRef], executes: &[Execute]) -> Vec<Execute> {
    let known: Vec<String> = contexts.iter().map(CbuildRef::context_name).collect();
    let mut kept: Vec<&Execute> = executes.iter().collect();
    loop {
        let before = kept.len();
        let names: Vec<&str> = kept.iter().map(|&execute| execute.execute.as_str()).collect();
        let (available, dropped): (Vec<&Execute>, Vec<&Execute>) =
            kept.into_iter().partition(|execute| {
                execute
                    .depends_on
                    .iter()
                    .all(|dependency| known.contains(dependency) || names.contains(&dependency.as_str()))
            });
        for execute in dropped {
            tracing::warn!(
                "skipping execute {}: its dependencies are not generated",
                execute.execute
            );
        }
        kept = available;
        if kept.len() == before {
            break;
        }
    }
    kept.into_iter().cloned().collect()
}

/// Step dependencies of a solution, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildDependencies {
    entries: Vec<(String, Vec<String>)>,
}

impl BuildDependencies {
    /// Assemble the dependencies of `contexts` and `executes`.
    ///
    /// Dependencies on names that are neither a context nor an execute are
    /// dropped. Fails when the declared dependencies form a cycle.
    pub fn new(contexts: &[CbuildRef], executes: &[Execute]) -> Result<Self, GraphError> {
        let known: Vec<String> = contexts.iter().map(CbuildRef::context_name).collect();
        let resolve = |step: &str, names: &[String]| -> Vec<String> {
            names
                .iter()
                .filter_map(|name| {
                    if known.contains(name) {
                        Some(build_step(name))
                    } else if executes.iter().any(|execute| execute.execute == *name) {
                        Some(name.clone())
                    } else {
                        tracing::warn!("{} depends on {}, which is not generated", step, name);
                        None
                    }
                })
                .collect()
        };

        let always: Vec<String> = executes
            .iter()
            .filter(|execute| execute.always && execute.depends_on.is_empty())
            .map(|execute| execute.execute.clone())
            .collect();

        let mut entries = Vec::new();

        for (context, name) in contexts.iter().zip(&known) {
            let mut dependencies = resolve(name.as_str(), &context.depends_on);
            append_uniquely(&mut dependencies, &always);
            entries.push((build_step(name), dependencies));
        }

        for execute in executes {
            let mut dependencies = Vec::new();
            append_uniquely(&mut dependencies, &resolve(execute.execute.as_str(), &execute.depends_on));
            if !execute.always {
                append_uniquely(&mut dependencies, &always);
            }
            entries.push((execute.execute.clone(), dependencies));
        }

        for name in &known {
            let mut dependencies: Vec<String> = executes
                .iter()
                .filter(|execute| !execute.always)
                .filter(|execute| reaches(execute, name, executes, &mut Vec::new()))
                .map(|execute| execute.execute.clone())
                .collect();
            append_uniquely(&mut dependencies, &always);
            entries.push((executes_step(name), dependencies));
        }

        entries.retain(|(_, dependencies)| !dependencies.is_empty());
        let graph = BuildDependencies { entries };
        graph.check_acyclic(&known)?;
        Ok(graph)
    }

    /// `(step, dependencies)` pairs; steps without dependencies are omitted.
    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_acyclic(&self, contexts: &[String]) -> Result<(), GraphError> {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut node = |graph: &mut DiGraph<String, ()>, name: &str| {
            *nodes
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for (step, dependencies) in &self.entries {
            let from = node(&mut graph, step);
            for dependency in dependencies {
                let to = node(&mut graph, dependency);
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        for context in contexts {
            let from = node(&mut graph, &executes_step(context));
            let to = node(&mut graph, &build_step(context));
            if !graph.contains_edge(from, to) {
                graph.add_edge(from, to, ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                let start = cycle.node_id();
                let component = tarjan_scc(&graph)
                    .into_iter()
                    .find(|component| component.contains(&start))
                    .unwrap_or_else(|| vec![start]);
                let mut steps: Vec<String> =
                    component.iter().map(|index| graph[*index].clone()).collect();
                steps.sort();
                Err(GraphError::Cycle { steps })
            }
        }
    }
}

/// Whether `execute` leads to `context` through non-always executes.
fn reaches(execute: &Execute, context: &str, executes: &[Execute], visited: &mut Vec<String>) -> bool {
    if visited.contains(&execute.execute) {
        return false;
    }
    visited.push(execute.execute.clone());

    execute.depends_on.iter().any(|dependency| {
        dependency == context
            || executes
                .iter()
                .filter(|other| !other.always && other.execute == *dependency)
                .any(|other| reaches(other, context, executes, visited))
    })
}
