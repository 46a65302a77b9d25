//! One output namespace: its imports, its sections and its runtime stub.

use std::collections::BTreeMap;
use indexmap::IndexMap;

use super::buffer::Buffer;
use super::path::{DirectoryOptions, Path};
use crate::naming::{is_valid_identifier, property_name, quote_string};

/// First line of every generated file.
pub const AUTO_GENERATED_BANNER: &str =
    "// This is an automatically generated file. Please do not change its contents manually!";

/// Aliases a runtime entity is re-exported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflectionRecord {
    /// Enclosing entity names for nested definitions, e.g. `["Books"]` for `Books.texts`.
    pub scope: Vec<String>,
    pub singular: String,
    pub plural: String,
    /// Name of the definition relative to the namespace, as the runtime knows it.
    pub original: String,
}

/// A constant object the runtime stub exports for an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumStub {
    pub name: String,
    /// Enum keys and their already rendered values.
    pub entries: Vec<(String, String)>,
}

/// Accumulates the generated code of one namespace.
#[derive(Debug)]
pub struct SourceFile {
    path: Path,
    imports: BTreeMap<String, Path>,
    pub preamble: Buffer,
    pub types: Buffer,
    pub enums: Buffer,
    namespaces: IndexMap<String, Buffer>,
    pub aspects: Buffer,
    pub classes: Buffer,
    pub operations: Buffer,
    inflections: Vec<InflectionRecord>,
    enum_stubs: Vec<EnumStub>,
    /// Exported binding and runtime name of every unbound operation.
    operation_names: Vec<(String, String)>,
    service: Option<String>,
}

impl SourceFile {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            imports: BTreeMap::new(),
            preamble: Buffer::new(),
            types: Buffer::new(),
            enums: Buffer::new(),
            namespaces: IndexMap::new(),
            aspects: Buffer::new(),
            classes: Buffer::new(),
            operations: Buffer::new(),
            inflections: Vec::new(),
            enum_stubs: Vec::new(),
            operation_names: Vec::new(),
            service: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers an import of another namespace. Imports of the file's own
    /// directory are dropped; two paths rendering to the same directory are
    /// imported once. Returns whether a new import was added.
    pub fn add_import(&mut self, target: &Path) -> bool {
        if target.is_cwd(&self.path) {
            return false;
        }
        let directory = target.as_directory(DirectoryOptions {
            relative: Some(&self.path),
            local: true,
            posix: true,
        });
        if self.imports.contains_key(&directory) {
            return false;
        }
        self.imports.insert(directory, target.clone());
        true
    }

    pub fn imports(&self) -> impl Iterator<Item = (&String, &Path)> {
        self.imports.iter()
    }

    /// The buffer of a nested `export namespace`, created on first use.
    pub fn namespace_buffer(&mut self, name: &str) -> &mut Buffer {
        self.namespaces.entry(name.to_string()).or_insert_with(|| {
            let mut buffer = Buffer::new();
            buffer.add(format!("export namespace {} {{", name));
            buffer.indent();
            buffer
        })
    }

    /// The buffer classes for the given scope go into.
    pub fn class_buffer(&mut self, scope: &[String]) -> &mut Buffer {
        if scope.is_empty() {
            &mut self.classes
        } else {
            self.namespace_buffer(&scope.join("."))
        }
    }

    pub fn add_inflection(&mut self, record: InflectionRecord) {
        self.inflections.push(record);
    }

    pub fn inflections(&self) -> &[InflectionRecord] {
        &self.inflections
    }

    pub fn add_enum_stub(&mut self, stub: EnumStub) {
        self.enum_stubs.push(stub);
    }

    /// Exports the runtime name of an operation under the binding its
    /// declared const uses.
    pub fn add_operation_name(&mut self, binding: &str, name: &str) {
        self.operation_names.push((binding.to_string(), name.to_string()));
    }

    pub fn set_service(&mut self, fully_qualified_name: &str) {
        self.service = Some(fully_qualified_name.to_string());
    }

    /// Closes all nested namespaces. Must be called once before rendering.
    pub fn finish(&mut self) {
        for buffer in self.namespaces.values_mut() {
            if buffer.is_closed() {
                continue;
            }
            buffer.outdent();
            buffer.add("}");
            buffer.close();
        }
    }

    /// The type layer (`index.ts`).
    pub fn to_type_definitions(&self) -> String {
        let mut sections: Vec<String> = vec![AUTO_GENERATED_BANNER.to_string()];

        if !self.imports.is_empty() {
            sections.push(
                self.imports
                    .iter()
                    .map(|(directory, path)| {
                        format!("import * as {} from '{}';", path.as_identifier(), directory)
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        for buffer in [&self.preamble, &self.types, &self.enums] {
            if !buffer.is_empty() {
                sections.push(buffer.join("\n"));
            }
        }
        for buffer in self.namespaces.values() {
            sections.push(buffer.join("\n"));
        }
        for buffer in [&self.aspects, &self.classes, &self.operations] {
            if !buffer.is_empty() {
                sections.push(buffer.join("\n"));
            }
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    /// The runtime stub (`index.js`) re-exporting runtime entities under
    /// their generated aliases. Parents are exported before the entities
    /// scoped below them.
    pub fn to_runtime_stub(&self, use_entities_proxy: bool, base: &Path) -> String {
        let mut records: Vec<&InflectionRecord> = self.inflections.iter().collect();
        records.sort_by_key(|record| record.scope.len());

        let mut buffer = Buffer::new();
        buffer.add(AUTO_GENERATED_BANNER);
        let namespace = quote_string(&self.path.as_namespace());

        if use_entities_proxy {
            let base_dir = base.as_directory(DirectoryOptions {
                relative: Some(&self.path),
                local: true,
                posix: true,
            });
            buffer.add(format!("const {{ createEntitiesProxy }} = require({})", quote_string(&base_dir)));
            buffer.add(format!("module.exports = createEntitiesProxy({}, {{", namespace));
            buffer.indent();
            for record in &records {
                let original = scoped(&record.scope, &record.original);
                for (alias, singular) in self.aliases(record) {
                    buffer.add(format!(
                        "{}: [{}, {}],",
                        quote_string(&scoped(&record.scope, &alias)),
                        quote_string(&original),
                        singular
                    ));
                }
            }
            buffer.outdent();
            buffer.add("})");
        } else {
            buffer.add("const cds = require('@sap/cds')");
            buffer.add(format!("const csn = cds.entities({})", namespace));
            for record in &records {
                let original = format!("csn[{}]", quote_string(&scoped(&record.scope, &record.original)));
                buffer.add(format!("// {}", scoped(&record.scope, &record.singular)));
                for (alias, singular) in self.aliases(record) {
                    let target = export_target(&record.scope, &alias);
                    if singular {
                        buffer.add(format!("{} = {{ is_singular: true, __proto__: {} }}", target, original));
                    } else {
                        buffer.add(format!("{} = {}", target, original));
                    }
                }
            }
        }

        if let Some(service) = &self.service {
            buffer.add(format!(
                "Object.defineProperty(module.exports, 'name', {{ value: {} }})",
                quote_string(service)
            ));
        }

        if !self.enum_stubs.is_empty() {
            buffer.add("// enums");
            for stub in &self.enum_stubs {
                let entries: Vec<String> = stub
                    .entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", property_name(key), value))
                    .collect();
                let segments: Vec<&str> = stub.name.split('.').collect();
                buffer.add(format!("{} = {{ {} }}", export_path(&segments), entries.join(", ")));
            }
        }

        if !self.operation_names.is_empty() {
            buffer.add("// actions");
            for (binding, name) in &self.operation_names {
                buffer.add(format!("{} = {}", export_path(&[binding.as_str()]), quote_string(name)));
            }
        }

        let mut out = buffer.join("\n");
        out.push('\n');
        out
    }

    /// Singular first, then plural, then the original name if it differs from both.
    fn aliases(&self, record: &InflectionRecord) -> Vec<(String, bool)> {
        let mut aliases = vec![(record.singular.clone(), true), (record.plural.clone(), false)];
        if record.original != record.singular && record.original != record.plural {
            aliases.push((record.original.clone(), false));
        }
        aliases
    }
}

fn scoped(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope.join("."), name)
    }
}

fn export_target(scope: &[String], alias: &str) -> String {
    let segments: Vec<&str> = scope.iter().map(String::as_str).chain(std::iter::once(alias)).collect();
    export_path(&segments)
}

/// `module.exports.a.b`, with bracket access for segments that are not identifiers.
fn export_path(segments: &[&str]) -> String {
    let mut target = String::from("module.exports");
    for segment in segments {
        if is_valid_identifier(segment) {
            target.push('.');
            target.push_str(segment);
        } else {
            target.push('[');
            target.push_str(&quote_string(segment));
            target.push(']');
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(singular: &str, plural: &str, original: &str) -> InflectionRecord {
        InflectionRecord {
            scope: vec![],
            singular: singular.into(),
            plural: plural.into(),
            original: original.into(),
        }
    }

    #[test]
    fn deduplicates_imports_by_directory() {
        let mut file = SourceFile::new(Path::from_namespace("bookshop"));
        assert!(file.add_import(&Path::from_namespace("sap.common")));
        assert!(!file.add_import(&Path::new(vec!["sap".into(), "common".into()])));
        assert!(!file.add_import(&Path::from_namespace("bookshop")));
        assert_eq!(file.imports().count(), 1);
    }

    #[test]
    fn orders_sections() {
        let mut file = SourceFile::new(Path::from_namespace("bookshop"));
        file.add_import(&Path::from_namespace("_"));
        file.classes.add("export class Book {}");
        file.aspects.add("export function _cuidAspect() {}");
        file.types.add("export type Price = number;");
        file.namespace_buffer("Books").add("export class text {}");
        file.finish();

        let out = file.to_type_definitions();
        let position = |needle: &str| out.find(needle).unwrap();
        assert!(out.starts_with(AUTO_GENERATED_BANNER));
        assert!(position("import * as __ from './../_';") < position("export type Price"));
        assert!(position("export type Price") < position("export namespace Books {"));
        assert!(position("export namespace Books {") < position("_cuidAspect"));
        assert!(position("_cuidAspect") < position("export class Book {}"));
        assert!(out.contains("export namespace Books {\n  export class text {}\n}"));
    }

    #[test]
    #[should_panic(expected = "closed buffer")]
    fn closed_namespace_rejects_writes() {
        let mut file = SourceFile::new(Path::from_namespace("a"));
        file.namespace_buffer("X").add("x");
        file.finish();
        file.namespace_buffer("X").add("late");
    }

    #[test]
    fn renders_direct_runtime_stub() {
        let mut file = SourceFile::new(Path::from_namespace("bookshop"));
        file.add_inflection(record("Book", "Books", "Books"));
        file.add_enum_stub(EnumStub {
            name: "Genre".into(),
            entries: vec![("Fiction".into(), "'fiction'".into())],
        });
        file.add_operation_name("submitOrder", "submitOrder");

        let stub = file.to_runtime_stub(false, &Path::from_namespace("_"));
        assert!(stub.contains("const csn = cds.entities('bookshop')"));
        assert!(stub.contains("module.exports.Book = { is_singular: true, __proto__: csn['Books'] }"));
        assert!(stub.contains("module.exports.Books = csn['Books']"));
        assert!(stub.contains("module.exports.Genre = { Fiction: 'fiction' }"));
        assert!(stub.contains("module.exports.submitOrder = 'submitOrder'"));
    }

    #[test]
    fn renders_original_alias_when_distinct() {
        let mut file = SourceFile::new(Path::from_namespace("zoo"));
        file.add_inflection(record("Mouse", "Mice", "MouseCollection"));
        let stub = file.to_runtime_stub(true, &Path::from_namespace("_"));
        assert!(stub.contains("const { createEntitiesProxy } = require('./../_')"));
        assert!(stub.contains("'Mouse': ['MouseCollection', true],"));
        assert!(stub.contains("'Mice': ['MouseCollection', false],"));
        assert!(stub.contains("'MouseCollection': ['MouseCollection', false],"));
    }

    #[test]
    fn scoped_records_attach_to_parent() {
        let mut file = SourceFile::new(Path::from_namespace("bookshop"));
        file.add_inflection(InflectionRecord {
            scope: vec!["Books".into()],
            singular: "text".into(),
            plural: "texts".into(),
            original: "texts".into(),
        });
        let stub = file.to_runtime_stub(false, &Path::from_namespace("_"));
        assert!(stub.contains("module.exports.Books.text = { is_singular: true, __proto__: csn['Books.texts'] }"));
    }

    #[test]
    fn parents_are_exported_before_scoped_records() {
        let mut file = SourceFile::new(Path::from_namespace("bookshop"));
        file.add_inflection(InflectionRecord {
            scope: vec!["Books".into()],
            singular: "text".into(),
            plural: "texts".into(),
            original: "texts".into(),
        });
        file.add_inflection(record("Book", "Books", "Books"));

        for proxy in [false, true] {
            let stub = file.to_runtime_stub(proxy, &Path::from_namespace("_"));
            let (parent, child) = if proxy {
                ("'Books': ['Books', false]", "'Books.text': ['Books.texts', true]")
            } else {
                ("module.exports.Books = csn['Books']", "module.exports.Books.text =")
            };
            assert!(stub.find(parent).unwrap() < stub.find(child).unwrap(), "{}", stub);
        }
    }

    #[test]
    fn odd_names_use_bracket_access() {
        let mut file = SourceFile::new(Path::from_namespace("shop"));
        file.add_inflection(record("Order-Item", "Order-Items", "Order-Items"));
        file.add_enum_stub(EnumStub {
            name: "Books.sort-order".into(),
            entries: vec![("asc".into(), "'asc'".into())],
        });
        file.add_operation_name("_delete", "delete");

        let stub = file.to_runtime_stub(false, &Path::from_namespace("_"));
        assert!(stub.contains("module.exports['Order-Items'] = csn['Order-Items']"));
        assert!(stub.contains("module.exports.Books['sort-order'] = { asc: 'asc' }"));
        assert!(stub.contains("module.exports._delete = 'delete'"));
    }
}
