//! Key closure of entities, and the foreign keys associations contribute.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::resolver::{chase_type, MAX_DEPTH};
use crate::csn::{Csn, Definition};
use crate::diagnostic::CompilerError;

/// Flattened key elements, in declaration order, by their flattened name.
pub type KeyElements<'a> = IndexMap<String, &'a Definition>;

/// Lazily computes and memoizes the keys of entities.
#[derive(Debug)]
pub struct KeyPropagator<'a> {
    csn: &'a Csn,
    memo: RefCell<HashMap<String, KeyElements<'a>>>,
    in_progress: RefCell<HashSet<String>>,
}

impl<'a> KeyPropagator<'a> {
    pub fn new(csn: &'a Csn) -> Self {
        Self {
            csn,
            memo: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    /// All keys of `entity`: inherited and own, with key associations
    /// replaced by the keys of their target (`<assoc>_<key>`).
    pub fn keys_of(&self, entity: &str) -> Result<KeyElements<'a>, CompilerError> {
        self.keys_at(entity, 0)
    }

    /// The foreign keys a managed association contributes to its owner, named
    /// relative to the association (`ID` for `author_ID`).
    pub fn foreign_keys(&self, association: &'a Definition) -> Result<KeyElements<'a>, CompilerError> {
        self.foreign_keys_at(association, 0)
    }

    fn keys_at(&self, entity: &str, depth: usize) -> Result<KeyElements<'a>, CompilerError> {
        if let Some(keys) = self.memo.borrow().get(entity) {
            return Ok(keys.clone());
        }
        if depth > MAX_DEPTH {
            return Err(CompilerError::RecursionLimit {
                name: entity.to_string(),
                limit: MAX_DEPTH,
            });
        }
        let Some(definition) = self.csn.definition(entity) else {
            return Ok(KeyElements::new());
        };
        if !self.in_progress.borrow_mut().insert(entity.to_string()) {
            tracing::debug!(entity, "key cycle, not expanding further");
            return Ok(KeyElements::new());
        }

        let mut keys = KeyElements::new();
        let mut result = Ok(());
        for (name, element) in self.csn.all_elements(definition) {
            if !element.key {
                continue;
            }
            match self.expand(name, element, depth) {
                Ok(expanded) => keys.extend(expanded),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.in_progress.borrow_mut().remove(entity);
        result?;

        self.memo.borrow_mut().insert(entity.to_string(), keys.clone());
        Ok(keys)
    }

    /// A single element as flattened key elements: itself, or the foreign keys
    /// it stands for when it is a managed association.
    fn expand(&self, name: &str, element: &'a Definition, depth: usize) -> Result<KeyElements<'a>, CompilerError> {
        let association = chase_type(self.csn, element)?;
        let mut expanded = KeyElements::new();
        if association.is_managed_to_one() {
            for (suffix, key) in self.foreign_keys_at(association, depth + 1)? {
                expanded.insert(format!("{}_{}", name, suffix), key);
            }
        } else if !association.is_association() {
            expanded.insert(name.to_string(), element);
        }
        Ok(expanded)
    }

    fn foreign_keys_at(&self, association: &'a Definition, depth: usize) -> Result<KeyElements<'a>, CompilerError> {
        let Some(target) = association.target.as_deref() else {
            return Ok(KeyElements::new());
        };
        let Some(explicit) = &association.keys else {
            return self.keys_at(target, depth + 1);
        };
        let Some(target_definition) = self.csn.definition(target) else {
            return Ok(KeyElements::new());
        };

        let mut foreign_keys = KeyElements::new();
        let target_elements = self.csn.all_elements(target_definition);
        for foreign_key in explicit {
            let Some(head) = foreign_key.path.first() else {
                continue;
            };
            let Some(element) = target_elements.get(head.as_str()) else {
                tracing::debug!(target, key = head.as_str(), "foreign key not found in target");
                continue;
            };
            let alias = foreign_key.suffix();
            let nested = chase_type(self.csn, element)?;
            if nested.is_managed_to_one() {
                for (suffix, key) in self.foreign_keys_at(nested, depth + 1)? {
                    foreign_keys.insert(format!("{}_{}", alias, suffix), key);
                }
            } else {
                foreign_keys.insert(alias, element);
            }
        }
        Ok(foreign_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Csn {
        Csn::from_value(json!({
            "definitions": {
                "cuid": { "kind": "aspect", "elements": { "ID": { "key": true, "type": "cds.UUID" } } },
                "A": { "kind": "entity", "includes": ["cuid"], "elements": {
                    "ID": { "key": true, "type": "cds.UUID" },
                    "name": { "key": true, "type": "cds.String" },
                    "label": { "type": "cds.String" }
                } },
                "B": { "kind": "entity", "elements": {
                    "ref": { "type": "cds.Association", "target": "A" }
                } },
                "C": { "kind": "entity", "elements": {
                    "parent": { "key": true, "type": "cds.Association", "target": "A" },
                    "pos": { "key": true, "type": "cds.Integer" }
                } },
                "D": { "kind": "entity", "elements": {
                    "c": { "type": "cds.Association", "target": "C", "keys": [{ "ref": ["parent"] }, { "ref": ["pos"], "as": "position" }] }
                } },
                "Loop": { "kind": "entity", "elements": {
                    "self": { "key": true, "type": "cds.Association", "target": "Loop" }
                } }
            }
        }))
        .unwrap()
    }

    fn names(keys: &KeyElements<'_>) -> Vec<String> {
        keys.keys().cloned().collect()
    }

    #[test]
    fn collects_inherited_and_own_keys() {
        let csn = model();
        let keys = KeyPropagator::new(&csn).keys_of("A").unwrap();
        assert_eq!(names(&keys), vec!["ID", "name"]);
    }

    #[test]
    fn expands_key_associations() {
        let csn = model();
        let keys = KeyPropagator::new(&csn).keys_of("C").unwrap();
        assert_eq!(names(&keys), vec!["parent_ID", "parent_name", "pos"]);
    }

    #[test]
    fn foreign_keys_default_to_target_keys() {
        let csn = model();
        let propagator = KeyPropagator::new(&csn);
        let reference = &csn.definition("B").unwrap().elements.as_ref().unwrap()["ref"];
        let keys = propagator.foreign_keys(reference).unwrap();
        assert_eq!(names(&keys), vec!["ID", "name"]);
        assert_eq!(keys["name"].type_name(), Some("cds.String"));
    }

    #[test]
    fn explicit_foreign_keys_follow_aliases() {
        let csn = model();
        let propagator = KeyPropagator::new(&csn);
        let c = &csn.definition("D").unwrap().elements.as_ref().unwrap()["c"];
        let keys = propagator.foreign_keys(c).unwrap();
        assert_eq!(names(&keys), vec!["parent_ID", "parent_name", "position"]);
    }

    #[test]
    fn key_cycles_terminate() {
        let csn = model();
        let keys = KeyPropagator::new(&csn).keys_of("Loop").unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn memoizes_results() {
        let csn = model();
        let propagator = KeyPropagator::new(&csn);
        propagator.keys_of("C").unwrap();
        assert!(propagator.memo.borrow().contains_key("A"));
        assert!(propagator.memo.borrow().contains_key("C"));
    }
}
