//! The result of resolving an element's type.

use indexmap::IndexMap;

use super::builtins::Container;
use crate::csn::Kind;
use crate::emit::Path;
use crate::naming::Inflection;

/// A named definition of the model, as seen from the referencing file.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDefined {
    pub fully_qualified_name: String,
    pub namespace: Path,
    pub scope: Vec<String>,
    pub plain_name: String,
    pub kind: Option<Kind>,
    /// Element path when the reference points into the definition.
    pub property_access: Vec<String>,
    /// Declared through a `{ ref: [...] }` type, i.e. "type of" semantics.
    pub foreign_key_reference: bool,
}

/// Resolution states.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeState {
    Builtin {
        ts_type: String,
    },
    /// An association or composition; `target` is the resolved target entity.
    Association {
        container: Container,
        many: bool,
        target: Box<TypeResolveInfo>,
    },
    UserDefined(UserDefined),
    Library {
        namespace: Path,
        plain_name: String,
    },
    /// `$self`, named after the definition currently being emitted.
    SelfRef {
        plain_name: String,
    },
    /// An anonymous structure.
    Inline {
        members: IndexMap<String, TypeResolveInfo>,
    },
    /// An enum declared in place of a primitive type.
    InlineEnum {
        name: String,
        /// Enum keys and their rendered values.
        values: Vec<(String, String)>,
    },
    Array(Box<TypeResolveInfo>),
}

/// A fully resolved type: its state, printable name and inflection.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeResolveInfo {
    pub state: TypeState,
    pub not_null: bool,
    /// The printable type, already prefixed with the import alias when needed.
    pub type_name: String,
    pub inflection: Inflection,
}

impl TypeResolveInfo {
    pub fn is_builtin(&self) -> bool {
        matches!(self.state, TypeState::Builtin { .. } | TypeState::Association { .. })
    }

    pub fn is_inline_declaration(&self) -> bool {
        matches!(self.state, TypeState::Inline { .. } | TypeState::InlineEnum { .. })
    }

    pub fn is_foreign_key_reference(&self) -> bool {
        matches!(&self.state, TypeState::UserDefined(u) if u.foreign_key_reference)
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self.state,
            TypeState::Array(_) | TypeState::Association { many: true, .. }
        )
    }

    pub fn plain_name(&self) -> Option<&str> {
        match &self.state {
            TypeState::UserDefined(u) => Some(&u.plain_name),
            TypeState::Library { plain_name, .. } | TypeState::SelfRef { plain_name } => Some(plain_name),
            _ => None,
        }
    }

    /// Members of an inline declaration.
    pub fn members(&self) -> Option<&IndexMap<String, TypeResolveInfo>> {
        match &self.state {
            TypeState::Inline { members } => Some(members),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(state: TypeState) -> TypeResolveInfo {
        TypeResolveInfo {
            state,
            not_null: false,
            type_name: "T".into(),
            inflection: Inflection::uninflected("T"),
        }
    }

    #[test]
    fn exactly_one_base_state_holds() {
        let states = vec![
            info(TypeState::Builtin { ts_type: "string".into() }),
            info(TypeState::Inline { members: IndexMap::new() }),
            info(TypeState::Library { namespace: Path::from_namespace("cds.hana"), plain_name: "CHAR".into() }),
        ];
        for s in &states {
            let user_defined_like = !s.is_builtin() && !s.is_inline_declaration();
            let count = [s.is_builtin(), s.is_inline_declaration(), user_defined_like]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn plain_name_only_for_named_states() {
        assert_eq!(info(TypeState::Builtin { ts_type: "string".into() }).plain_name(), None);
        assert_eq!(info(TypeState::SelfRef { plain_name: "Book".into() }).plain_name(), Some("Book"));
        let array = info(TypeState::Array(Box::new(info(TypeState::Builtin { ts_type: "string".into() }))));
        assert!(array.is_array());
        assert_eq!(array.plain_name(), None);
    }
}
