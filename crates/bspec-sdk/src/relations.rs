//! Cross-document relationship checks.
//!
//! Documents reference each other by id through two optional array members:
//! `depends_on` (hard prerequisites) and `enables` (documents this one
//! unlocks). A dangling `depends_on` entry or a dependency cycle is an error;
//! a dangling `enables` entry is only a warning.

use std::collections::HashMap;

use bspec_store::{Document, DocumentStore};
use serde_json::Value;

use crate::validator::{ValidationReport, Violation, ViolationKind};

pub const DEPENDS_ON_FIELD: &str = "depends_on";
pub const ENABLES_FIELD: &str = "enables";

/// String entries of an id-list member. Non-string entries are skipped.
fn references<'a>(document: &'a Document, field: &str) -> impl Iterator<Item = &'a str> {
    document
        .field(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Check every document's references against the store.
///
/// Returns one report per document with findings, in insertion order.
pub fn check_relationships(documents: &DocumentStore) -> Vec<ValidationReport> {
    let cycles = dependency_cycles(documents);

    documents
        .iter()
        .filter_map(|document| {
            let id = document.id().as_str();
            let mut violations = Vec::new();

            for dep in references(document, DEPENDS_ON_FIELD) {
                if !documents.contains(dep) {
                    violations.push(Violation::error(
                        DEPENDS_ON_FIELD,
                        ViolationKind::MissingDependency,
                        format!("dependency {dep:?} not found"),
                    ));
                }
            }
            for enabled in references(document, ENABLES_FIELD) {
                if !documents.contains(enabled) {
                    violations.push(Violation::warning(
                        ENABLES_FIELD,
                        ViolationKind::MissingEnabledDocument,
                        format!("enabled document {enabled:?} not found"),
                    ));
                }
            }
            if let Some(cycle) = cycles.get(id) {
                violations.push(Violation::error(
                    DEPENDS_ON_FIELD,
                    ViolationKind::CircularDependency,
                    format!("circular dependency: {}", cycle.join(" -> ")),
                ));
            }

            (!violations.is_empty()).then(|| ValidationReport {
                document_id: Some(id.to_string()),
                violations,
            })
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Map every document on a `depends_on` cycle to that cycle, written as a
/// closed path starting and ending at the document itself.
///
/// Iterative depth-first search in insertion order, so deep chains cannot
/// overflow the stack and results are deterministic.
fn dependency_cycles<'a>(documents: &'a DocumentStore) -> HashMap<&'a str, Vec<&'a str>> {
    let mut marks: HashMap<&str, Mark> = documents
        .ids()
        .map(|id| (id.as_str(), Mark::Unvisited))
        .collect();
    let mut cycles: HashMap<&str, Vec<&str>> = HashMap::new();

    for root in documents.iter() {
        let root = root.id().as_str();
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // `path` is the current chain; each stack frame holds the
        // dependencies of the matching path entry still to be explored.
        let mut path: Vec<&str> = vec![root];
        let mut stack: Vec<Vec<&str>> = vec![dependencies(documents, root)];
        marks.insert(root, Mark::OnPath);

        while let Some(pending) = stack.last_mut() {
            let Some(dep) = pending.pop() else {
                if let Some(done) = path.pop() {
                    marks.insert(done, Mark::Done);
                }
                stack.pop();
                continue;
            };
            match marks.get(dep).copied() {
                // Dangling references are reported separately.
                None | Some(Mark::Done) => {}
                Some(Mark::OnPath) => {
                    let start = path.iter().position(|&p| p == dep).unwrap_or(0);
                    let members = &path[start..];
                    for (offset, &member) in members.iter().enumerate() {
                        cycles.entry(member).or_insert_with(|| {
                            let mut closed: Vec<&str> = members[offset..]
                                .iter()
                                .chain(&members[..offset])
                                .copied()
                                .collect();
                            closed.push(member);
                            closed
                        });
                    }
                }
                Some(Mark::Unvisited) => {
                    marks.insert(dep, Mark::OnPath);
                    path.push(dep);
                    stack.push(dependencies(documents, dep));
                }
            }
        }
    }

    cycles
}

/// `depends_on` entries of `id`, reversed so popping visits them in order.
fn dependencies<'a>(documents: &'a DocumentStore, id: &str) -> Vec<&'a str> {
    let mut deps: Vec<&str> = documents
        .get(id)
        .map(|d| references(d, DEPENDS_ON_FIELD).collect())
        .unwrap_or_default();
    deps.reverse();
    deps
}
