//! Propagation of the draft marker along composition edges.

use std::collections::{BTreeSet, HashSet};

use crate::csn::{Csn, Kind, DRAFT_ENABLED};
use crate::diagnostic::{CompilerError, Diagnostics};

/// Outcome of one collection run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DraftCollection {
    pub enabled: BTreeSet<String>,
    /// One message per root and annotated root it composes.
    pub conflicts: Vec<String>,
}

impl DraftCollection {
    /// The draft-enabled set, or the conflicts as a fatal error.
    pub fn into_result(self) -> Result<BTreeSet<String>, CompilerError> {
        if self.conflicts.is_empty() {
            Ok(self.enabled)
        } else {
            Err(CompilerError::DraftConflicts {
                conflicts: self.conflicts,
            })
        }
    }
}

/// Collects every entity that takes part in a draft tree.
///
/// Roots are service entities annotated with `@odata.draft.enabled: true`.
/// From each root, composition targets are followed depth first. Reaching
/// another annotated root is a conflict; the conflicting entity and anything
/// below it are left out. Targets outside of any service are skipped.
pub fn collect_draft_enabled(csn: &Csn, diagnostics: &mut Diagnostics) -> DraftCollection {
    let mut collection = DraftCollection::default();
    let mut conflicting = BTreeSet::new();
    let mut trees = Vec::new();

    let roots = csn.definitions.iter().filter(|(name, definition)| {
        definition.is_kind(Kind::Entity)
            && definition.annotation_is_true(DRAFT_ENABLED)
            && csn.service_of(name).is_some()
    });

    for (root, _) in roots {
        let mut tree = Tree {
            root,
            visited: HashSet::new(),
            reported: HashSet::new(),
        };
        tree.visit(csn, root, &mut collection.conflicts, &mut conflicting, diagnostics);
        trees.push(tree);
    }

    for tree in trees.iter().filter(|t| !conflicting.contains(t.root)) {
        collection.enabled.extend(tree.visited.iter().map(|name| name.to_string()));
    }
    tracing::debug!(count = collection.enabled.len(), "draft-enabled entities collected");
    collection
}

/// The entities reachable from one root.
struct Tree<'a> {
    root: &'a str,
    visited: HashSet<&'a str>,
    /// Annotated roots this tree already reported as conflicting.
    reported: HashSet<&'a str>,
}

impl<'a> Tree<'a> {
    fn visit(
        &mut self,
        csn: &'a Csn,
        name: &'a str,
        conflicts: &mut Vec<String>,
        conflicting: &mut BTreeSet<&'a str>,
        diagnostics: &mut Diagnostics,
    ) {
        if !self.visited.insert(name) {
            return;
        }
        let Some(definition) = csn.definition(name) else {
            return;
        };

        for (element_name, element) in csn.all_elements(definition) {
            if !element.is_composition() {
                continue;
            }
            let Some(target) = element.target.as_deref() else {
                continue;
            };
            if self.visited.contains(target) {
                continue;
            }
            let Some(target_definition) = csn.definition(target) else {
                continue;
            };
            if csn.service_of(target).is_none() {
                diagnostics.warn(
                    target,
                    format!(
                        "composition '{}.{}' leaves the service; not propagating drafts from '{}'",
                        name, element_name, self.root
                    ),
                );
                continue;
            }
            match target_definition.annotation(DRAFT_ENABLED).and_then(|v| v.as_bool()) {
                Some(true) if !self.reported.insert(target) => {}
                Some(true) => {
                    let message = format!(
                        "'{}' is draft-enabled on its own but also composed by draft root '{}'",
                        target, self.root
                    );
                    diagnostics.error(target, message.clone());
                    conflicts.push(message);
                    conflicting.insert(target);
                }
                Some(false) => {}
                None => self.visit(csn, target, conflicts, conflicting, diagnostics),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn composition(target: &str) -> serde_json::Value {
        json!({ "type": "cds.Composition", "target": target, "cardinality": { "max": "*" } })
    }

    fn collect(value: serde_json::Value) -> (DraftCollection, Diagnostics) {
        let csn = Csn::from_value(value).unwrap();
        let mut diagnostics = Diagnostics::new();
        let collection = collect_draft_enabled(&csn, &mut diagnostics);
        (collection, diagnostics)
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn propagates_through_compositions() {
        let (collection, diagnostics) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "a": composition("S.A") } },
                "S.A": { "kind": "entity", "elements": {
                    "b": composition("S.B"),
                    "other": { "type": "cds.Association", "target": "S.C" }
                } },
                "S.B": { "kind": "entity", "elements": { "up": composition("S.A") } },
                "S.C": { "kind": "entity" }
            }
        }));
        assert_eq!(names(&collection.enabled), vec!["S.A", "S.B", "S.R"]);
        assert!(collection.conflicts.is_empty());
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn ignores_roots_outside_services() {
        let (collection, _) = collect(json!({
            "definitions": {
                "db.R": { "kind": "entity", "@odata.draft.enabled": true }
            }
        }));
        assert!(collection.enabled.is_empty());
    }

    #[test]
    fn skips_targets_outside_services_with_warning() {
        let (collection, diagnostics) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "x": composition("db.X") } },
                "db.X": { "kind": "entity" }
            }
        }));
        assert_eq!(names(&collection.enabled), vec!["S.R"]);
        assert_eq!(diagnostics.entries().len(), 1);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn shared_children_are_marked_once() {
        let (collection, _) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R1": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "c": composition("S.C") } },
                "S.R2": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "c": composition("S.C") } },
                "S.C": { "kind": "entity" }
            }
        }));
        assert_eq!(names(&collection.enabled), vec!["S.C", "S.R1", "S.R2"]);
    }

    #[test]
    fn explicit_opt_out_ends_the_branch() {
        let (collection, diagnostics) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "a": composition("S.A") } },
                "S.A": { "kind": "entity", "@odata.draft.enabled": false, "elements": { "b": composition("S.B") } },
                "S.B": { "kind": "entity" }
            }
        }));
        assert_eq!(names(&collection.enabled), vec!["S.R"]);
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn nested_roots_conflict() {
        let (collection, diagnostics) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "a": composition("S.A") } },
                "S.A": { "kind": "entity", "elements": { "b": composition("S.B") } },
                "S.B": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "c": composition("S.C") } },
                "S.C": { "kind": "entity" }
            }
        }));
        assert!(!collection.enabled.contains("S.B"));
        assert!(!collection.enabled.contains("S.C"));
        assert!(collection.enabled.contains("S.A"));
        assert_eq!(collection.conflicts.len(), 1);
        assert!(diagnostics.has_errors());
        assert!(matches!(
            collection.into_result().unwrap_err(),
            CompilerError::DraftConflicts { conflicts } if conflicts.len() == 1
        ));
    }

    #[test]
    fn conflict_composed_twice_is_reported_once() {
        let (collection, diagnostics) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R": { "kind": "entity", "@odata.draft.enabled": true, "elements": {
                    "first": composition("S.B"),
                    "second": composition("S.B"),
                    "a": composition("S.A")
                } },
                "S.A": { "kind": "entity", "elements": { "b": composition("S.B") } },
                "S.B": { "kind": "entity", "@odata.draft.enabled": true }
            }
        }));
        assert_eq!(collection.conflicts.len(), 1);
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn every_root_reports_its_own_conflict() {
        let (collection, _) = collect(json!({
            "definitions": {
                "S": { "kind": "service" },
                "S.R1": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "b": composition("S.B") } },
                "S.R2": { "kind": "entity", "@odata.draft.enabled": true, "elements": { "b": composition("S.B") } },
                "S.B": { "kind": "entity", "@odata.draft.enabled": true }
            }
        }));
        assert_eq!(collection.conflicts.len(), 2);
        assert!(collection.conflicts[0].contains("'S.R1'"));
        assert!(collection.conflicts[1].contains("'S.R2'"));
    }
}
