//! Predefined type modules that are copied into the output when referenced.
//!
//! Each module is written in TypeScript in the `library/` directory and
//! embedded into the compiler binary using `include_str!`.

use crate::emit::Path;

/// Vendor specific column types of SAP HANA.
pub const CDS_HANA: &str = include_str!("../library/cds.hana.ts");

/// A hand-written type module.
#[derive(Debug, Clone)]
pub struct Library {
    namespace: Path,
    source: &'static str,
    names: Vec<String>,
}

impl Library {
    /// Creates a library for `namespace` whose exported names are read from `source`.
    pub fn new(namespace: &str, source: &'static str) -> Self {
        let names = source
            .lines()
            .filter_map(|line| {
                ["export type ", "export class ", "export interface ", "export const "]
                    .iter()
                    .find_map(|prefix| line.trim_start().strip_prefix(prefix))
            })
            .filter_map(|rest| {
                let name: String = rest
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                    .collect();
                (!name.is_empty()).then_some(name)
            })
            .collect();
        Self {
            namespace: Path::from_namespace(namespace),
            source,
            names,
        }
    }

    pub fn namespace(&self) -> &Path {
        &self.namespace
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn exports(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// A type found in a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryType {
    pub namespace: Path,
    pub name: String,
}

/// The libraries of one compilation and which of them were referenced.
#[derive(Debug, Clone)]
pub struct LibraryRegistry {
    libraries: Vec<Library>,
    referenced: Vec<bool>,
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new(vec![Library::new("cds.hana", CDS_HANA)])
    }
}

impl LibraryRegistry {
    pub fn new(libraries: Vec<Library>) -> Self {
        let referenced = vec![false; libraries.len()];
        Self { libraries, referenced }
    }

    /// Finds the library whose namespace is the prefix of `fully_qualified_name`
    /// and which exports the remaining name. Marks it as referenced.
    pub fn lookup(&mut self, fully_qualified_name: &str) -> Option<LibraryType> {
        let (namespace, name) = fully_qualified_name.rsplit_once('.')?;
        let index = self
            .libraries
            .iter()
            .position(|lib| lib.namespace.as_namespace() == namespace && lib.exports(name))?;
        self.referenced[index] = true;
        Some(LibraryType {
            namespace: self.libraries[index].namespace.clone(),
            name: name.to_string(),
        })
    }

    /// Libraries that were looked up at least once, in registration order.
    pub fn referenced(&self) -> impl Iterator<Item = &Library> {
        self.libraries
            .iter()
            .zip(&self.referenced)
            .filter(|(_, used)| **used)
            .map(|(lib, _)| lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_exported_names() {
        let lib = Library::new("cds.hana", CDS_HANA);
        assert!(lib.exports("VARCHAR"));
        assert!(lib.exports("ST_POINT"));
        assert!(!lib.exports("VARCHAR2"));
    }

    #[test]
    fn marks_only_referenced_libraries() {
        let mut registry = LibraryRegistry::new(vec![
            Library::new("cds.hana", CDS_HANA),
            Library::new("vendor.geo", "export type Point = [number, number]\n"),
        ]);
        assert_eq!(registry.referenced().count(), 0);

        let found = registry.lookup("cds.hana.NCHAR").unwrap();
        assert_eq!(found.name, "NCHAR");
        assert_eq!(found.namespace.as_namespace(), "cds.hana");
        assert!(registry.lookup("cds.hana.Unknown").is_none());
        assert!(registry.lookup("other.hana.NCHAR").is_none());

        let referenced: Vec<_> = registry.referenced().map(|l| l.namespace().as_namespace()).collect();
        assert_eq!(referenced, vec!["cds.hana"]);
    }
}
