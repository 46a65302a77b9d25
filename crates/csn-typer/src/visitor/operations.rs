//! Actions, functions, events and services.

use std::borrow::Cow;

use super::{add_doc, anonymous_type, append, define_property, Visitor};
use crate::csn::{Definition, Kind, TypeRef, RFC_PARAMETER_CATEGORY};
use crate::diagnostic::CompilerError;
use crate::emit::{Buffer, Path, SourceFile};
use crate::naming::{is_valid_identifier, property_name, quote_string, sanitize_identifier};
use crate::resolve::inline::nullable;
use crate::resolve::resolver::enum_union;
use crate::resolve::{PropertyStyle, TypeState};

/// `{ a?: T; b: U }`, or `{}` without fields.
fn object_type(fields: &[String]) -> String {
    if fields.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", fields.join("; "))
    }
}

/// `$self` in a bound operation is the entity the operation is bound to.
fn bind_self<'d>(element: &'d Definition, binding: Option<&str>) -> Cow<'d, Definition> {
    match binding {
        Some(entity) if element.is_self_reference() => {
            let mut bound = element.clone();
            let target = match bound.items.as_deref_mut() {
                Some(items) => items,
                None => &mut bound,
            };
            target.type_ref = Some(TypeRef::Name(entity.to_string()));
            Cow::Owned(bound)
        }
        _ => Cow::Borrowed(element),
    }
}

impl<'s, 'a> Visitor<'s, 'a> {
    pub(super) fn visit_operation(&mut self, name: &str, definition: &'a Definition) -> Result<(), CompilerError> {
        let info = self.session.entities.lookup(name);
        let plain = sanitize_identifier(&info.entity_name);
        let mut file = self.check_out(&info.namespace);
        let members = self.operation_type(&plain, definition, &mut file, None)?;

        let mut out = Buffer::new();
        add_doc(&mut out, definition.doc.as_deref());
        out.add(format!("export declare const {}: {{", plain));
        out.indent();
        for member in &members {
            out.add(member);
        }
        out.outdent();
        out.add("};");

        let target = if info.scope.is_empty() {
            &mut file.operations
        } else {
            file.class_buffer(&info.scope)
        };
        append(target, &out);
        file.add_operation_name(&plain, &info.entity_name);
        self.check_in(file);
        Ok(())
    }

    /// Members of the object type describing an operation: the call
    /// signatures, `__parameters`, `__returns` and `kind`. Parameters typed
    /// `$self` bind the operation and are left out.
    pub(super) fn operation_type(
        &mut self,
        name: &str,
        definition: &'a Definition,
        file: &mut SourceFile,
        binding: Option<&str>,
    ) -> Result<Vec<String>, CompilerError> {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        let mut destructured = Vec::new();
        let mut named_only = false;

        for (param, element) in definition.params.iter().flatten() {
            if element.is_self_reference() {
                continue;
            }
            named_only |= element.annotation(RFC_PARAMETER_CATEGORY).is_some();
            let hint = sanitize_identifier(&format!("{}_{}", name, param));
            let resolved = self.resolver().resolve_and_require(element, file, &hint)?;
            let type_name = nullable(&resolved.info, &anonymous_type(element, &resolved));
            let separator = if element.not_null || element.is_mandatory() {
                ":"
            } else {
                "?:"
            };
            positional.push(format!("{}: {}", sanitize_identifier(param), type_name));
            named.push(format!("{}{} {}", property_name(param), separator, type_name));
            destructured.push(if is_valid_identifier(param) {
                param.clone()
            } else {
                format!("{}: {}", quote_string(param), sanitize_identifier(param))
            });
        }

        let returns = match definition.returns.as_deref() {
            Some(returns) => {
                let returns = bind_self(returns, binding);
                let hint = format!("{}_return", name);
                let resolved = self.resolver().resolve(&returns, file, &hint)?;
                let type_name = match &resolved.state {
                    TypeState::InlineEnum { values, .. } => enum_union(values),
                    _ => resolved.type_name.clone(),
                };
                nullable(&resolved, &type_name)
            }
            None => "void".to_string(),
        };
        let result = format!("{} | Promise<{}>", returns, returns);
        let parameters = object_type(&named);

        let mut members = Vec::new();
        if !named_only {
            members.push(format!("({}): {};", positional.join(", "), result));
        }
        if !named.is_empty() {
            members.push(format!("({{ {} }}: {}): {};", destructured.join(", "), parameters, result));
        }
        members.push(format!("__parameters: {};", parameters));
        members.push(format!("__returns: {};", returns));
        let kind = if definition.is_kind(Kind::Function) { "function" } else { "action" };
        members.push(format!("readonly kind: '{}';", kind));
        Ok(members)
    }

    /// Events are always fully populated, so their properties are not optional.
    pub(super) fn visit_event(&mut self, name: &str, definition: &'a Definition) -> Result<(), CompilerError> {
        let info = self.session.entities.lookup(name);
        let plain = info.entity_name.clone();
        let mut file = self.check_out(&info.namespace);
        let style = PropertyStyle {
            modifier: "declare ",
            optional: false,
        };

        let mut out = Buffer::new();
        add_doc(&mut out, definition.doc.as_deref());
        out.add(format!("export class {} {{", plain));
        out.indent();
        for (property, element) in definition.elements.iter().flatten() {
            let hint = sanitize_identifier(&format!("{}_{}", plain, property));
            let resolved = self.resolver().resolve_and_require(element, &mut file, &hint)?;
            let type_name = anonymous_type(element, &resolved);
            add_doc(&mut out, element.doc.as_deref());
            self.session
                .inline
                .print_property(&mut out, property, &type_name, &resolved.info, style);
        }
        out.outdent();
        out.add("}");
        out.add(define_property(&plain, "name", &quote_string(name)));

        append(file.class_buffer(&info.scope), &out);
        self.check_in(file);
        Ok(())
    }

    /// The default export of a service file: one static per unbound operation.
    pub(super) fn visit_service(&mut self, name: &str) -> Result<(), CompilerError> {
        let path = Path::from_namespace(name);
        let mut file = self.check_out(&path);
        file.set_service(name);

        let csn = self.session.csn;
        let entities = &self.session.entities;
        let operations: Vec<String> = csn
            .definitions
            .iter()
            .filter(|(_, d)| d.kind.map(Kind::is_operation).unwrap_or(false))
            .map(|(operation, _)| entities.lookup(operation))
            .filter(|info| info.namespace == path && info.scope.is_empty())
            .map(|info| info.entity_name.clone())
            .collect();

        let mut out = Buffer::new();
        out.add_block(
            "export default class {",
            |b| {
                for operation in &operations {
                    b.add(format!(
                        "declare static readonly {}: typeof {};",
                        property_name(operation),
                        sanitize_identifier(operation)
                    ));
                }
            },
            "}",
        );
        append(&mut file.classes, &out);
        self.check_in(file);
        Ok(())
    }
}
