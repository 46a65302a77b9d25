//! Types without elements: named enums and plain aliases.

use indexmap::IndexMap;

use super::{add_doc, append, Visitor};
use crate::csn::{Definition, EnumValue};
use crate::diagnostic::CompilerError;
use crate::emit::{Buffer, EnumStub};
use crate::naming::property_name;
use crate::resolve::resolver::{enum_entries, enum_union};

/// Writes `export const X = {...} as const` and the matching literal union
/// type. Returns the rendered entries for the runtime stub.
pub(super) fn render_enum(out: &mut Buffer, name: &str, values: &IndexMap<String, EnumValue>) -> Vec<(String, String)> {
    let entries = enum_entries(values);
    out.add(format!("export const {} = {{", name));
    out.indent();
    for ((key, rendered), value) in entries.iter().zip(values.values()) {
        add_doc(out, value.doc.as_deref());
        out.add(format!("{}: {},", property_name(key), rendered));
    }
    out.outdent();
    out.add("} as const;");
    out.add(format!("export type {} = {};", name, enum_union(&entries)));
    entries
}

impl<'s, 'a> Visitor<'s, 'a> {
    pub(super) fn visit_type(&mut self, name: &str, definition: &'a Definition) -> Result<(), CompilerError> {
        let info = self.session.entities.lookup(name);
        let plain = info.entity_name.clone();
        let mut file = self.check_out(&info.namespace);
        let mut out = Buffer::new();
        add_doc(&mut out, definition.doc.as_deref());

        if let Some(values) = definition.enum_values.as_ref().filter(|v| !v.is_empty()) {
            let entries = render_enum(&mut out, &plain, values);
            let mut stub_name = info.scope.clone();
            stub_name.push(plain);
            file.add_enum_stub(EnumStub {
                name: stub_name.join("."),
                entries,
            });
            let target = if info.scope.is_empty() {
                &mut file.enums
            } else {
                file.class_buffer(&info.scope)
            };
            append(target, &out);
        } else {
            let resolved = self.resolver().resolve(definition, &mut file, &plain)?;
            out.add(format!("export type {} = {};", plain, resolved.type_name));
            let target = if info.scope.is_empty() {
                &mut file.types
            } else {
                file.class_buffer(&info.scope)
            };
            append(target, &out);
        }

        self.check_in(file);
        Ok(())
    }
}
