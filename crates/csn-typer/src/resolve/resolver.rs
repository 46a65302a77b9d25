//! The type resolver: turns an element's type reference into a printable
//! TypeScript type, registering the imports it needs on the way.

use indexmap::IndexMap;
use serde_json::Value;

use super::builtins::{Builtins, Container};
use super::entity::EntityInfo;
use super::info::{TypeResolveInfo, TypeState, UserDefined};
use super::inline::render_object_type;
use crate::csn::{Csn, Definition, EnumValue, Kind, TypeRef};
use crate::diagnostic::CompilerError;
use crate::emit::SourceFile;
use crate::naming::{quote_string, Inflection};
use crate::session::CompilationSession;

/// Maximum nesting of inline declarations and of type alias chains.
pub const MAX_DEPTH: usize = 10;

/// A resolved element: the final type of its property plus the resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Type as it is printed for the property (key wrapper applied).
    pub type_name: String,
    pub info: TypeResolveInfo,
}

/// Follows type aliases (`type A : B; type B : Association to C`) until a
/// definition that is not itself a plain alias of another model type.
pub fn chase_type<'c>(csn: &'c Csn, element: &'c Definition) -> Result<&'c Definition, CompilerError> {
    let mut current = element;
    for _ in 0..MAX_DEPTH {
        let next = current
            .type_name()
            .and_then(|name| csn.definition(name))
            .filter(|d| d.is_kind(Kind::Type) && !d.has_elements() && !d.is_enum());
        match next {
            Some(definition) => current = definition,
            None => return Ok(current),
        }
    }
    Err(CompilerError::RecursionLimit {
        name: element.type_name().unwrap_or_default().to_string(),
        limit: MAX_DEPTH,
    })
}

/// Enum keys and their rendered values. Entries without `val` use their own name.
pub fn enum_entries(values: &IndexMap<String, EnumValue>) -> Vec<(String, String)> {
    values
        .iter()
        .map(|(key, entry)| {
            let rendered = match &entry.val {
                Some(Value::String(s)) => quote_string(s),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(Value::Null) => "null".to_string(),
                Some(other) => quote_string(&other.to_string()),
                None => quote_string(key),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Literal union of enum values, e.g. `'a' | 'b'`.
pub fn enum_union(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return "never".to_string();
    }
    entries.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>().join(" | ")
}

pub struct Resolver<'s, 'a> {
    session: &'s mut CompilationSession<'a>,
}

impl<'s, 'a> Resolver<'s, 'a> {
    pub fn new(session: &'s mut CompilationSession<'a>) -> Self {
        Self { session }
    }

    /// Resolves `element` for use as a property in `file`. `hint` names the
    /// property's owner and is used to synthesize names of inline enums
    /// (`<Entity>_<property>`).
    pub fn resolve_and_require(
        &mut self,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
    ) -> Result<Resolved, CompilerError> {
        let info = self.resolve(element, file, hint)?;
        let type_name = if element.key {
            format!("__.Key<{}>", info.type_name)
        } else {
            info.type_name.clone()
        };
        Ok(Resolved { type_name, info })
    }

    pub fn resolve(
        &mut self,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
    ) -> Result<TypeResolveInfo, CompilerError> {
        self.resolve_at(element, file, hint, 0)
    }

    /// The definition `name` itself as seen from `file`, e.g. `_.cuid`.
    pub fn resolve_definition(&mut self, name: &str, file: &mut SourceFile) -> Result<TypeResolveInfo, CompilerError> {
        self.user_defined(name, Vec::new(), false, file, name, true)
    }

    fn resolve_at(
        &mut self,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
        depth: usize,
    ) -> Result<TypeResolveInfo, CompilerError> {
        if depth > MAX_DEPTH {
            return Err(CompilerError::RecursionLimit {
                name: hint.to_string(),
                limit: MAX_DEPTH,
            });
        }
        let not_null = element.not_null || element.key;

        if let Some(items) = &element.items {
            let inner = self.resolve_at(items, file, hint, depth + 1)?;
            let type_name = format!("Array<{}>", inner.type_name);
            return Ok(TypeResolveInfo {
                inflection: Inflection {
                    type_name: type_name.clone(),
                    singular: inner.type_name.clone(),
                    plural: type_name.clone(),
                },
                state: TypeState::Array(Box::new(inner)),
                not_null,
                type_name,
            });
        }

        let host_is_primitive = element
            .type_name()
            .map(|t| self.session.builtins.is_builtin(t))
            .unwrap_or(element.type_ref.is_none());
        if element.is_enum() && host_is_primitive {
            return Ok(self.inline_enum(element, hint, depth, not_null));
        }

        match &element.type_ref {
            None => self.inline_declaration(element, file, hint, depth, not_null),
            Some(TypeRef::Ref { path }) => {
                let (head, tail) = path.split_first().ok_or_else(|| CompilerError::MalformedReference {
                    reference: String::new(),
                })?;
                self.user_defined(head, tail.to_vec(), true, file, hint, not_null)
            }
            Some(TypeRef::Name(name)) => self.named(name, element, file, hint, not_null),
        }
    }

    fn named(
        &mut self,
        name: &str,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
        not_null: bool,
    ) -> Result<TypeResolveInfo, CompilerError> {
        if name.contains(':') {
            let parts: Vec<&str> = name.split(':').collect();
            if parts.len() > 2 {
                return Err(CompilerError::MalformedReference {
                    reference: name.to_string(),
                });
            }
            let access = parts[1].split('.').map(str::to_string).collect();
            return self.user_defined(parts[0], access, true, file, hint, not_null);
        }

        if let Some(container) = Builtins::container(name) {
            return self.association(container, element, file, hint, not_null);
        }

        if let Some(ts_type) = self.session.builtins.resolve(name) {
            return Ok(TypeResolveInfo {
                state: TypeState::Builtin {
                    ts_type: ts_type.to_string(),
                },
                not_null,
                type_name: ts_type.to_string(),
                inflection: Inflection::uninflected(ts_type),
            });
        }

        if name == "$self" {
            return self.self_reference(file, hint, not_null);
        }

        if self.session.csn.definition(name).is_some() {
            return self.user_defined(name, Vec::new(), false, file, hint, not_null);
        }

        let info = self.session.entities.lookup(name);
        if !info.property_access.is_empty() {
            let access = info.property_access.clone();
            return self.user_defined(&info.definition_name(), access, false, file, hint, not_null);
        }

        if let Some(library_type) = self.session.libraries.lookup(name) {
            file.add_import(&library_type.namespace);
            let type_name = format!("{}.{}", library_type.namespace.as_identifier(), library_type.name);
            tracing::debug!(name, "resolved from library");
            return Ok(TypeResolveInfo {
                inflection: Inflection::uninflected(&type_name),
                state: TypeState::Library {
                    namespace: library_type.namespace,
                    plain_name: library_type.name,
                },
                not_null,
                type_name,
            });
        }

        Err(CompilerError::unresolved(name, hint))
    }

    /// `_ns.` when `info` lives in another file (adding the import), followed
    /// by the enclosing scope, e.g. `_bookshop.Books.`.
    fn qualifier(&self, info: &EntityInfo, file: &mut SourceFile) -> String {
        let mut qualifier = String::new();
        if !info.namespace.is_cwd(file.path()) {
            file.add_import(&info.namespace);
            qualifier.push_str(&info.namespace.as_identifier());
            qualifier.push('.');
        }
        for segment in &info.scope {
            qualifier.push_str(segment);
            qualifier.push('.');
        }
        qualifier
    }

    fn user_defined(
        &mut self,
        definition_name: &str,
        property_access: Vec<String>,
        foreign_key_reference: bool,
        file: &mut SourceFile,
        hint: &str,
        not_null: bool,
    ) -> Result<TypeResolveInfo, CompilerError> {
        let definition = self
            .session
            .csn
            .definition(definition_name)
            .ok_or_else(|| CompilerError::unresolved(definition_name, hint))?;
        let info = self.session.entities.lookup(definition_name);
        let inflection = self.session.entities.inflection(&info);
        let qualifier = self.qualifier(&info, file);

        let singular = format!("{}{}", qualifier, inflection.singular);
        let plural = format!("{}{}", qualifier, inflection.plural);
        let type_name = if property_access.is_empty() {
            singular.clone()
        } else {
            format!(
                "__.DeepRequired<{}>{}",
                singular,
                self.session.inline.member_access(&property_access)
            )
        };

        Ok(TypeResolveInfo {
            state: TypeState::UserDefined(UserDefined {
                fully_qualified_name: definition_name.to_string(),
                namespace: info.namespace.clone(),
                scope: info.scope.clone(),
                plain_name: inflection.singular.clone(),
                kind: definition.kind,
                property_access,
                foreign_key_reference,
            }),
            not_null,
            inflection: Inflection {
                type_name: type_name.clone(),
                singular,
                plural,
            },
            type_name,
        })
    }

    fn association(
        &mut self,
        container: Container,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
        not_null: bool,
    ) -> Result<TypeResolveInfo, CompilerError> {
        let target = element
            .target
            .as_deref()
            .ok_or_else(|| CompilerError::unresolved("association without target", hint))?;
        let many = element.is_to_many();
        let target_info = self.user_defined(target, Vec::new(), false, file, hint, true)?;

        let inner = match (self.session.is_current(target), many) {
            (true, false) => "this".to_string(),
            (true, true) => "this[]".to_string(),
            (false, false) => target_info.inflection.singular.clone(),
            (false, true) => target_info.inflection.plural.clone(),
        };
        let wrapper = match (container, many) {
            (Container::Association, false) => "__.Association.to",
            (Container::Association, true) => "__.Association.to.many",
            (Container::Composition, false) => "__.Composition.of",
            (Container::Composition, true) => "__.Composition.of.many",
        };
        let type_name = format!("{}<{}>", wrapper, inner);

        Ok(TypeResolveInfo {
            inflection: Inflection::uninflected(&type_name),
            state: TypeState::Association {
                container,
                many,
                target: Box::new(target_info),
            },
            not_null: not_null || many,
            type_name,
        })
    }

    fn self_reference(
        &mut self,
        file: &mut SourceFile,
        hint: &str,
        not_null: bool,
    ) -> Result<TypeResolveInfo, CompilerError> {
        let current = self
            .session
            .context
            .last()
            .cloned()
            .ok_or_else(|| CompilerError::unresolved("$self", hint))?;
        let info = self.session.entities.lookup(&current);
        let inflection = self.session.entities.inflection(&info);
        let type_name = format!("{}{}", self.qualifier(&info, file), inflection.singular);
        Ok(TypeResolveInfo {
            inflection: Inflection::uninflected(&type_name),
            state: TypeState::SelfRef {
                plain_name: inflection.singular,
            },
            not_null,
            type_name,
        })
    }

    fn inline_declaration(
        &mut self,
        element: &Definition,
        file: &mut SourceFile,
        hint: &str,
        depth: usize,
        not_null: bool,
    ) -> Result<TypeResolveInfo, CompilerError> {
        let mut members = IndexMap::new();
        if let Some(elements) = &element.elements {
            for (name, member) in elements {
                let member_hint = format!("{}_{}", hint, name);
                let resolved = self.resolve_at(member, file, &member_hint, depth + 1)?;
                members.insert(name.clone(), resolved);
            }
        }
        let type_name = render_object_type(&members, self.session.config.properties_optional);
        Ok(TypeResolveInfo {
            inflection: Inflection {
                type_name: type_name.clone(),
                singular: type_name.clone(),
                plural: format!("Array<{}>", type_name),
            },
            state: TypeState::Inline { members },
            not_null,
            type_name,
        })
    }

    fn inline_enum(&self, element: &Definition, hint: &str, depth: usize, not_null: bool) -> TypeResolveInfo {
        let values = element.enum_values.as_ref().map(enum_entries).unwrap_or_default();
        let type_name = if depth == 0 && !hint.is_empty() {
            hint.to_string()
        } else {
            enum_union(&values)
        };
        TypeResolveInfo {
            inflection: Inflection::uninflected(&type_name),
            state: TypeState::InlineEnum {
                name: hint.to_string(),
                values,
            },
            not_null,
            type_name,
        }
    }
}
