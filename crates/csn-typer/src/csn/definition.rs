//! Model definitions and elements.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// What a definition declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Entity,
    Type,
    Aspect,
    Service,
    Context,
    Event,
    Action,
    Function,
    Annotation,
    #[serde(other)]
    Other,
}

impl Kind {
    /// Kinds that only contribute a namespace segment.
    pub fn is_namespace_like(self) -> bool {
        matches!(self, Kind::Service | Kind::Context)
    }

    pub fn is_operation(self) -> bool {
        matches!(self, Kind::Action | Kind::Function)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Entity => "entity",
            Kind::Type => "type",
            Kind::Aspect => "aspect",
            Kind::Service => "service",
            Kind::Context => "context",
            Kind::Event => "event",
            Kind::Action => "action",
            Kind::Function => "function",
            Kind::Annotation => "annotation",
            Kind::Other => "other",
        }
    }
}

/// The `type` of an element: a name, or a reference path into another definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Name(String),
    Ref {
        #[serde(rename = "ref")]
        path: Vec<String>,
    },
}

/// Multiplicity of an association, composition or array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cardinality {
    #[serde(default)]
    pub max: Option<Value>,
}

impl Cardinality {
    pub fn is_many(&self) -> bool {
        match &self.max {
            Some(Value::String(s)) => s == "*",
            Some(Value::Number(n)) => n.as_u64().map(|n| n > 1).unwrap_or(false),
            _ => false,
        }
    }
}

/// An explicit foreign key of a managed association.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForeignKey {
    #[serde(rename = "ref")]
    pub path: Vec<String>,
    #[serde(rename = "as", default)]
    pub alias: Option<String>,
}

impl ForeignKey {
    /// The suffix appended to the association name, e.g. `ID` for `author_ID`.
    pub fn suffix(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.path.join("_"))
    }
}

/// A single enum entry. Entries without `val` use their own name as value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnumValue {
    #[serde(default)]
    pub val: Option<Value>,
    #[serde(default)]
    pub doc: Option<String>,
}

/// A node of the model graph. Top-level definitions, elements, parameters and
/// return types all share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default)]
    pub kind: Option<Kind>,
    #[serde(rename = "type", default)]
    pub type_ref: Option<TypeRef>,
    #[serde(default)]
    pub elements: Option<IndexMap<String, Definition>>,
    #[serde(default)]
    pub items: Option<Box<Definition>>,
    #[serde(default)]
    pub actions: Option<IndexMap<String, Definition>>,
    #[serde(default)]
    pub params: Option<IndexMap<String, Definition>>,
    #[serde(default)]
    pub returns: Option<Box<Definition>>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub cardinality: Option<Cardinality>,
    #[serde(default)]
    pub keys: Option<Vec<ForeignKey>>,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<IndexMap<String, EnumValue>>,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    #[serde(default)]
    pub on: Option<Value>,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub doc: Option<String>,
    /// Every other property. Annotations are the `@`-prefixed ones.
    #[serde(flatten)]
    pub annotations: IndexMap<String, Value>,
}

impl Definition {
    pub fn type_name(&self) -> Option<&str> {
        match &self.type_ref {
            Some(TypeRef::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn includes(&self) -> &[String] {
        self.includes.as_deref().unwrap_or(&[])
    }

    pub fn annotation(&self, name: &str) -> Option<&Value> {
        self.annotations.get(name)
    }

    pub fn annotation_str(&self, name: &str) -> Option<&str> {
        self.annotation(name).and_then(Value::as_str)
    }

    pub fn annotation_is_true(&self, name: &str) -> bool {
        matches!(self.annotation(name), Some(Value::Bool(true)))
    }

    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind == Some(kind)
    }

    pub fn is_association(&self) -> bool {
        matches!(self.type_name(), Some("cds.Association" | "cds.Composition"))
    }

    pub fn is_composition(&self) -> bool {
        self.type_name() == Some("cds.Composition")
    }

    pub fn is_to_many(&self) -> bool {
        self.cardinality.as_ref().map(Cardinality::is_many).unwrap_or(false)
    }

    /// Managed to-one associations are the ones that get foreign keys.
    pub fn is_managed_to_one(&self) -> bool {
        self.is_association() && self.on.is_none() && !self.is_to_many()
    }

    pub fn is_enum(&self) -> bool {
        self.enum_values.as_ref().map(|e| !e.is_empty()).unwrap_or(false)
    }

    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    pub fn is_mandatory(&self) -> bool {
        self.not_null || self.annotation_is_true(super::MANDATORY)
    }

    pub fn is_self_reference(&self) -> bool {
        self.type_name() == Some("$self")
            || self.items.as_ref().map(|i| i.type_name() == Some("$self")).unwrap_or(false)
    }
}
