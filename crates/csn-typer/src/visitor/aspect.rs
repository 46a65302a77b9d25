//! Entities, aspects and structured types: a mixin function carrying the
//! properties, and the classes built from it.

use indexmap::IndexMap;

use super::enums::render_enum;
use super::{add_doc, anonymous_type, append, define_property, Visitor};
use crate::csn::{Definition, EnumValue, Kind, FOREIGN_KEY_FOR};
use crate::diagnostic::CompilerError;
use crate::emit::{Buffer, EnumStub, InflectionRecord, SourceFile};
use crate::naming::{property_name, quote_string, sanitize_identifier, Inflection};
use crate::resolve::resolver::chase_type;
use crate::resolve::{EntityInfo, PropertyStyle, TypeState};

/// Statics every generated class has, or inherits from `Function`.
const RESERVED_STATICS: &[&str] = &[
    "name", "length", "prototype", "caller", "arguments", "kind", "keys", "elements", "actions", "drafts",
];

const MIXIN_SIGNATURE: &str = "<TBase extends new (...args: any[]) => object>(Base: TBase)";

/// The ancestors of a definition as referenced from the file being written.
struct Ancestry {
    /// e.g. `_._managedAspect(_._cuidAspect(Base))`
    mixins: String,
    /// Qualified ancestor classes, e.g. `_.cuid`.
    classes: Vec<String>,
}

impl Ancestry {
    /// ` & typeof _.cuid.keys` for every ancestor.
    fn inherited(&self, member: &str) -> String {
        self.classes
            .iter()
            .map(|class| format!(" & typeof {}.{}", class, member))
            .collect()
    }
}

/// An enum declared in place of a property type.
struct InlineEnum<'a> {
    property: String,
    name: String,
    values: &'a IndexMap<String, EnumValue>,
}

impl<'s, 'a> Visitor<'s, 'a> {
    pub(super) fn visit_entity(
        &mut self,
        name: &str,
        definition: &'a Definition,
        kind: Kind,
    ) -> Result<(), CompilerError> {
        let info = self.session.entities.lookup(name);
        let (inflection, issues) = self.session.entities.inflection_with_issues(&info);
        for issue in issues {
            self.session.diagnostics.warn(name, issue.describe());
        }
        if kind == Kind::Entity {
            self.check_collisions(name, &info, &inflection)?;
        }

        let mut file = self.check_out(&info.namespace);
        let mut out = Buffer::new();
        self.render_aspect(name, definition, kind, &inflection, &mut file, &mut out)?;
        self.render_classes(name, definition, kind, &inflection, &mut out);

        let target = if kind == Kind::Aspect && info.scope.is_empty() {
            &mut file.aspects
        } else {
            file.class_buffer(&info.scope)
        };
        append(target, &out);

        if kind == Kind::Entity {
            file.add_inflection(InflectionRecord {
                scope: info.scope.clone(),
                singular: inflection.singular,
                plural: inflection.plural,
                original: info.entity_name.clone(),
            });
        }
        self.check_in(file);
        Ok(())
    }

    /// A singular naming another definition of the namespace is fatal; two
    /// definitions sharing a plural only get logged.
    fn check_collisions(&mut self, name: &str, info: &EntityInfo, inflection: &Inflection) -> Result<(), CompilerError> {
        let mut prefix: Vec<&str> = info.namespace.parts().iter().map(String::as_str).collect();
        prefix.extend(info.scope.iter().map(String::as_str));

        let singular = [prefix.as_slice(), &[inflection.singular.as_str()]].concat().join(".");
        if singular != name && self.session.csn.definition(&singular).is_some() {
            return Err(CompilerError::NameCollision {
                name: inflection.singular.clone(),
                fully_qualified_name: name.to_string(),
                existing: singular,
            });
        }

        let mut scoped = info.scope.clone();
        scoped.push(inflection.plural.clone());
        let key = (info.namespace.as_namespace(), scoped.join("."));
        match self.plurals.get(&key) {
            Some(existing) if existing != name => {
                let message = format!("plural '{}' is already used by '{}'", inflection.plural, existing);
                self.session.diagnostics.error(name, message);
            }
            Some(_) => {}
            None => {
                self.plurals.insert(key, name.to_string());
            }
        }
        Ok(())
    }

    fn render_aspect(
        &mut self,
        name: &str,
        definition: &'a Definition,
        kind: Kind,
        inflection: &Inflection,
        file: &mut SourceFile,
        out: &mut Buffer,
    ) -> Result<(), CompilerError> {
        let singular = &inflection.singular;
        let ancestry = self.ancestry(definition, file)?;

        add_doc(out, definition.doc.as_deref());
        out.add(format!("export function _{}Aspect{} {{", singular, MIXIN_SIGNATURE));
        out.indent();
        out.add(format!("return class {} extends {} {{", singular, ancestry.mixins));
        out.indent();

        self.session.context.push(name.to_string());
        let properties = self.render_properties(name, definition, singular, file, out);
        self.session.context.pop();

        for inline in properties? {
            let mut rendered = Buffer::new();
            let entries = render_enum(&mut rendered, &inline.name, inline.values);
            append(&mut file.enums, &rendered);
            file.add_enum_stub(EnumStub {
                name: inline.name.clone(),
                entries,
            });
            if RESERVED_STATICS.contains(&inline.property.as_str()) {
                tracing::debug!(name, property = inline.property.as_str(), "enum would shadow a reserved static");
                continue;
            }
            out.add(format!("static readonly {} = {};", property_name(&inline.property), inline.name));
        }

        out.add(format!(
            "static readonly kind: 'entity' | 'type' | 'aspect' = '{}';",
            kind.as_str()
        ));
        out.add(format!(
            "declare static readonly keys: __.KeysOf<{}>{};",
            singular,
            ancestry.inherited("keys")
        ));
        out.add(format!(
            "declare static readonly elements: __.ElementsOf<{}>{};",
            singular,
            ancestry.inherited("elements")
        ));
        self.render_bound_actions(name, definition, &ancestry, file, out)?;

        out.outdent();
        out.add("};");
        out.outdent();
        out.add("}");
        Ok(())
    }

    /// Mixins of `includes`, first ancestor innermost.
    fn ancestry(&mut self, definition: &'a Definition, file: &mut SourceFile) -> Result<Ancestry, CompilerError> {
        let mut ancestry = Ancestry {
            mixins: "Base".to_string(),
            classes: Vec::new(),
        };
        for ancestor in definition.includes() {
            let resolved = self.resolver().resolve_definition(ancestor, file)?;
            let class = resolved.inflection.singular.clone();
            let plain = resolved.plain_name().unwrap_or_default();
            let qualifier = &class[..class.len() - plain.len()];
            ancestry.mixins = format!("{}_{}Aspect({})", qualifier, plain, ancestry.mixins);
            ancestry.classes.push(class);
        }
        Ok(ancestry)
    }

    /// Own (not inherited) elements, each followed by the foreign keys it
    /// contributes. Returns the inline enums met on the way.
    fn render_properties(
        &mut self,
        name: &str,
        definition: &'a Definition,
        singular: &str,
        file: &mut SourceFile,
        out: &mut Buffer,
    ) -> Result<Vec<InlineEnum<'a>>, CompilerError> {
        let csn = self.session.csn;
        let mut enums = Vec::new();
        let Some(elements) = &definition.elements else {
            return Ok(enums);
        };
        let all_elements = csn.all_elements(definition);
        let style = PropertyStyle {
            modifier: "declare ",
            optional: self.session.config.properties_optional,
        };

        for (property, element) in elements {
            if csn.is_inherited(definition, property) {
                continue;
            }
            let hint = sanitize_identifier(&format!("{}_{}", singular, property));
            let resolved = self.resolver().resolve_and_require(element, file, &hint)?;
            if let (TypeState::InlineEnum { .. }, Some(values)) = (&resolved.info.state, &element.enum_values) {
                enums.push(InlineEnum {
                    property: property.clone(),
                    name: hint,
                    values,
                });
            }
            add_doc(out, element.doc.as_deref());
            self.session
                .inline
                .print_property(out, property, &resolved.type_name, &resolved.info, style);

            let foreign_keys = ForeignKeyOwner {
                name,
                singular,
                all_elements: &all_elements,
                style,
            };
            self.render_foreign_keys(&foreign_keys, property, element, file, out)?;
        }
        Ok(enums)
    }

    fn render_foreign_keys(
        &mut self,
        owner: &ForeignKeyOwner<'_, 'a>,
        property: &str,
        element: &'a Definition,
        file: &mut SourceFile,
        out: &mut Buffer,
    ) -> Result<(), CompilerError> {
        let association = chase_type(self.session.csn, element)?;
        if !association.is_managed_to_one() {
            return Ok(());
        }
        for (suffix, key) in self.session.keys.foreign_keys(association)? {
            let foreign_key = format!("{}_{}", property, suffix);
            if let Some(declared) = owner.all_elements.get(foreign_key.as_str()) {
                if declared.annotation_str(FOREIGN_KEY_FOR) != Some(property) {
                    self.session.diagnostics.error(
                        owner.name,
                        format!(
                            "foreign key '{}' of association '{}' collides with a declared element and is not emitted",
                            foreign_key, property
                        ),
                    );
                }
                continue;
            }

            let mut synthetic = key.clone();
            synthetic.key = element.key;
            synthetic.not_null = element.not_null;
            synthetic.doc = None;
            let hint = sanitize_identifier(&format!("{}_{}", owner.singular, foreign_key));
            let resolved = self.resolver().resolve_and_require(&synthetic, file, &hint)?;
            let type_name = anonymous_type(&synthetic, &resolved);
            self.session
                .inline
                .print_property(out, &foreign_key, &type_name, &resolved.info, owner.style);
        }
        Ok(())
    }

    fn render_bound_actions(
        &mut self,
        name: &str,
        definition: &'a Definition,
        ancestry: &Ancestry,
        file: &mut SourceFile,
        out: &mut Buffer,
    ) -> Result<(), CompilerError> {
        let mut parts: Vec<String> = ancestry
            .classes
            .iter()
            .map(|class| format!("typeof {}.actions", class))
            .collect();
        let Some(actions) = definition.actions.as_ref().filter(|a| !a.is_empty()) else {
            parts.push("globalThis.Record<never, never>".to_string());
            out.add(format!("declare static readonly actions: {};", parts.join(" & ")));
            return Ok(());
        };

        parts.push("{".to_string());
        out.add(format!("declare static readonly actions: {}", parts.join(" & ")));
        out.indent();
        for (action, operation) in actions {
            let members = self.operation_type(action, operation, file, Some(name))?;
            add_doc(out, operation.doc.as_deref());
            out.add(format!("{}: {{", property_name(action)));
            out.indent();
            for member in &members {
                out.add(member);
            }
            out.outdent();
            out.add("};");
        }
        out.outdent();
        out.add("};");
        Ok(())
    }

    fn render_classes(
        &self,
        name: &str,
        definition: &Definition,
        kind: Kind,
        inflection: &Inflection,
        out: &mut Buffer,
    ) {
        let singular = &inflection.singular;
        let draft = kind == Kind::Entity && self.session.is_draft_enabled(name);
        let fully_qualified = quote_string(name);

        add_doc(out, definition.doc.as_deref());
        let open = format!("export class {} extends _{}Aspect(__.Entity) {{", singular, singular);
        if draft {
            out.add_block(
                open,
                |b| b.add(format!("declare static readonly drafts: __.DraftOf<{}>;", singular)),
                "}",
            );
        } else {
            out.add(format!("{}}}", open));
        }
        out.add(define_property(singular, "name", &fully_qualified));
        out.add(define_property(singular, "is_singular", "true"));

        if kind != Kind::Entity {
            return;
        }
        let plural = &inflection.plural;
        out.add_block(
            format!("export class {} extends Array<{}> {{", plural, singular),
            |b| {
                b.add("$count?: number;");
                if draft {
                    b.add(format!("declare static readonly drafts: __.DraftsOf<{}>;", singular));
                }
            },
            "}",
        );
        out.add(define_property(plural, "name", &fully_qualified));
    }
}

/// The definition foreign keys are rendered for.
struct ForeignKeyOwner<'o, 'a> {
    name: &'o str,
    singular: &'o str,
    all_elements: &'o IndexMap<&'a str, &'a Definition>,
    style: PropertyStyle,
}
