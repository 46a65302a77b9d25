//! The single pass over all model definitions that fills the source files.
//!
//! ```text
//!   Csn definitions (document order)
//!          |
//!          v
//!   +-------------+   entity / aspect / type with elements -> aspect.rs
//!   |   Visitor   |   type without elements                -> enums.rs
//!   +-------------+   action / function / event / service  -> operations.rs
//!          |
//!          v
//!   SourceFile per namespace (first-encountered order)
//! ```

mod aspect;
mod enums;
mod operations;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::csn::{Csn, Definition, Kind};
use crate::diagnostic::CompilerError;
use crate::emit::{Buffer, Path, SourceFile};
use crate::resolve::resolver::{enum_union, Resolved};
use crate::resolve::{Resolver, TypeState};
use crate::session::CompilationSession;

/// Walks the model and renders every definition into the file of its namespace.
pub struct Visitor<'s, 'a> {
    session: &'s mut CompilationSession<'a>,
    files: IndexMap<String, SourceFile>,
    /// Plural class names per namespace, to detect two definitions sharing one.
    plurals: HashMap<(String, String), String>,
}

impl<'s, 'a> Visitor<'s, 'a> {
    pub fn new(session: &'s mut CompilationSession<'a>) -> Self {
        Self {
            session,
            files: IndexMap::new(),
            plurals: HashMap::new(),
        }
    }

    pub fn visit_definitions(&mut self) -> Result<(), CompilerError> {
        let csn: &'a Csn = self.session.csn;
        for (name, definition) in &csn.definitions {
            self.visit(name, definition)?;
        }
        Ok(())
    }

    /// The finished files, in the order their namespaces were first encountered.
    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
            .into_values()
            .map(|mut file| {
                file.finish();
                file
            })
            .collect()
    }

    fn visit(&mut self, name: &str, definition: &'a Definition) -> Result<(), CompilerError> {
        if name.starts_with("localized.") {
            return Ok(());
        }
        let Some(kind) = definition.kind else {
            return Ok(());
        };
        tracing::trace!(name, kind = kind.as_str(), "visiting");
        match kind {
            Kind::Entity | Kind::Aspect => self.visit_entity(name, definition, kind),
            Kind::Type if definition.has_elements() => self.visit_entity(name, definition, kind),
            Kind::Type => self.visit_type(name, definition),
            Kind::Action | Kind::Function => self.visit_operation(name, definition),
            Kind::Event => self.visit_event(name, definition),
            Kind::Service => self.visit_service(name),
            Kind::Context | Kind::Annotation | Kind::Other => Ok(()),
        }
    }

    /// Takes the file of `path` out of the map, creating it on first use.
    /// The slot keeps its position; [`Visitor::check_in`] puts the file back.
    fn check_out(&mut self, path: &Path) -> SourceFile {
        let base = self.session.base_path();
        let slot = self.files.entry(path.as_namespace()).or_insert_with(|| {
            let mut file = SourceFile::new(path.clone());
            file.add_import(&base);
            file
        });
        std::mem::replace(slot, SourceFile::new(path.clone()))
    }

    fn check_in(&mut self, file: SourceFile) {
        self.files.insert(file.path().as_namespace(), file);
    }

    fn resolver(&mut self) -> Resolver<'_, 'a> {
        Resolver::new(self.session)
    }
}

/// Type of a resolved element in positions where no named enum constant
/// exists (parameters, foreign keys, events).
fn anonymous_type(element: &Definition, resolved: &Resolved) -> String {
    match &resolved.info.state {
        TypeState::InlineEnum { values, .. } if element.key => format!("__.Key<{}>", enum_union(values)),
        TypeState::InlineEnum { values, .. } => enum_union(values),
        _ => resolved.type_name.clone(),
    }
}

/// Renders `doc` as a JSDoc block.
fn add_doc(buffer: &mut Buffer, doc: Option<&str>) {
    let Some(doc) = doc else {
        return;
    };
    buffer.add("/**");
    for line in doc.lines() {
        buffer.add(format!(" * {}", line.replace("*/", "*\\/")).trim_end());
    }
    buffer.add(" */");
}

/// Appends a rendered definition, separated from the previous one by a blank line.
fn append(target: &mut Buffer, rendered: &Buffer) {
    let opens_block = target.lines().last().map(|l| l.ends_with('{')).unwrap_or(true);
    if !opens_block {
        target.add("");
    }
    target.add_lines(&rendered.join("\n"));
}

/// `Object.defineProperty(<class>, '<property>', { value: <value> })`
fn define_property(class: &str, property: &str, value: &str) -> String {
    format!(
        "Object.defineProperty({}, '{}', {{ value: {} }})",
        class, property, value
    )
}
