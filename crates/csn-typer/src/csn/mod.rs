//! The compiled model (CSN) consumed by the compiler.
//!
//! The model is produced by an upstream compiler and is expected to be fully
//! linked: every association names its target, every element carries its
//! resolved type. Nothing here validates the model beyond what deserialization
//! needs.

mod definition;

pub use definition::{Cardinality, Definition, EnumValue, ForeignKey, Kind, TypeRef};

use std::collections::HashSet;
use std::path::Path;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::diagnostic::CompilerError;

/// Annotation marking the root of a draft-enabled composition tree.
pub const DRAFT_ENABLED: &str = "@odata.draft.enabled";
/// Annotation carried by foreign key elements the upstream compiler generated.
pub const FOREIGN_KEY_FOR: &str = "@odata.foreignKey4";
pub const SINGULAR: &str = "@singular";
pub const PLURAL: &str = "@plural";
pub const MANDATORY: &str = "@mandatory";
pub const RFC_PARAMETER_CATEGORY: &str = "@RFC.parameterCategory";

/// A compiled model document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Csn {
    #[serde(default)]
    pub definitions: IndexMap<String, Definition>,
}

impl Csn {
    pub fn from_json_str(content: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(content).map_err(|e| CompilerError::InvalidModel {
            message: e.to_string(),
        })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CompilerError> {
        serde_json::from_value(value).map_err(|e| CompilerError::InvalidModel {
            message: e.to_string(),
        })
    }

    /// Loads a model from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompilerError::io(path, e.to_string()))?;
        Self::from_json_str(&content)
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.definitions.get(name).and_then(|d| d.kind)
    }

    /// Names of all service definitions, in document order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .iter()
            .filter(|(_, d)| d.kind == Some(Kind::Service))
            .map(|(name, _)| name.as_str())
    }

    /// The innermost service whose namespace contains `name`.
    pub fn service_of(&self, name: &str) -> Option<&str> {
        self.services()
            .filter(|service| {
                name.len() > service.len()
                    && name.starts_with(service)
                    && name.as_bytes()[service.len()] == b'.'
            })
            .max_by_key(|service| service.len())
    }

    /// All elements of a definition, including those contributed by its
    /// `includes` ancestors. Ancestor elements come first; own elements
    /// override inherited ones of the same name.
    pub fn all_elements<'a>(&'a self, definition: &'a Definition) -> IndexMap<&'a str, &'a Definition> {
        let mut elements = IndexMap::new();
        let mut visited = HashSet::new();
        self.collect_elements(definition, &mut elements, &mut visited);
        elements
    }

    fn collect_elements<'a>(
        &'a self,
        definition: &'a Definition,
        into: &mut IndexMap<&'a str, &'a Definition>,
        visited: &mut HashSet<&'a str>,
    ) {
        for ancestor in definition.includes() {
            if !visited.insert(ancestor.as_str()) {
                continue;
            }
            if let Some(parent) = self.definitions.get(ancestor) {
                self.collect_elements(parent, into, visited);
            }
        }
        if let Some(elements) = &definition.elements {
            for (name, element) in elements {
                into.insert(name.as_str(), element);
            }
        }
    }

    /// Whether an element of this name is contributed by any ancestor of `definition`.
    pub fn is_inherited(&self, definition: &Definition, element: &str) -> bool {
        definition.includes().iter().any(|ancestor| {
            self.definitions
                .get(ancestor)
                .map(|parent| self.all_elements(parent).contains_key(element))
                .unwrap_or(false)
        })
    }
}
