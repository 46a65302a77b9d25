//! Decomposition of fully qualified names into namespace, scope, name and
//! property access, cached for the lifetime of one compilation.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::csn::{Csn, Kind, PLURAL, SINGULAR};
use crate::emit::Path;
use crate::naming::inflect::{self, Inflection, NamingIssue};

/// What a fully qualified name refers to.
#[derive(Debug)]
pub struct EntityInfo {
    pub fully_qualified_name: String,
    pub namespace: Path,
    /// Enclosing definitions between namespace and name, e.g. `["Books"]` for `bookshop.Books.texts`.
    pub scope: Vec<String>,
    pub entity_name: String,
    /// Trailing element names, e.g. `["author", "name"]` for `bookshop.Books.author.name`.
    pub property_access: Vec<String>,
    inflection: OnceCell<(Inflection, Vec<NamingIssue>)>,
    parent: OnceCell<Option<Rc<EntityInfo>>>,
}

impl EntityInfo {
    /// Name of the definition without trailing property access.
    pub fn definition_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespace.parts().iter().map(String::as_str).collect();
        parts.extend(self.scope.iter().map(String::as_str));
        parts.push(&self.entity_name);
        parts.join(".")
    }
}

/// Memoized lookups of [`EntityInfo`].
#[derive(Debug)]
pub struct EntityRepository<'a> {
    csn: &'a Csn,
    cache: RefCell<HashMap<String, Rc<EntityInfo>>>,
}

impl<'a> EntityRepository<'a> {
    pub fn new(csn: &'a Csn) -> Self {
        Self {
            csn,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn lookup(&self, fully_qualified_name: &str) -> Rc<EntityInfo> {
        if let Some(info) = self.cache.borrow().get(fully_qualified_name) {
            return Rc::clone(info);
        }
        let info = Rc::new(self.untangle(fully_qualified_name));
        self.cache
            .borrow_mut()
            .insert(fully_qualified_name.to_string(), Rc::clone(&info));
        info
    }

    /// Splits `a.b.C.D.x.y` into namespace `a.b`, scope `[C]`, name `D` and
    /// property access `[x, y]`, using the model to tell which segments are
    /// definitions.
    pub fn untangle(&self, fully_qualified_name: &str) -> EntityInfo {
        let parts: Vec<&str> = fully_qualified_name.split('.').collect();

        // Namespace: the leading segments that are not definitions of their own
        // (or only services and contexts). The last segment is never namespace.
        let mut namespace_len = 0;
        while namespace_len + 1 < parts.len() {
            let prefix = parts[..=namespace_len].join(".");
            match self.csn.kind_of(&prefix) {
                Some(kind) if !kind.is_namespace_like() => break,
                _ => namespace_len += 1,
            }
        }

        // The longest run of remaining segments that names a definition.
        let rest = &parts[namespace_len..];
        let mut definition_len = None;
        for len in (1..=rest.len()).rev() {
            let candidate = parts[..namespace_len + len].join(".");
            if self.csn.definition(&candidate).is_some() {
                definition_len = Some(len);
                break;
            }
        }

        let (scope, entity_name, property_access) = match definition_len {
            Some(len) => {
                let definition = &rest[..len];
                let trailing = &rest[len..];
                let definition_name = parts[..namespace_len + len].join(".");
                let property_access = self.property_path(&definition_name, trailing);
                (
                    definition[..len - 1].iter().map(|s| s.to_string()).collect(),
                    definition[len - 1].to_string(),
                    property_access,
                )
            }
            None => (
                rest[..rest.len().saturating_sub(1)].iter().map(|s| s.to_string()).collect(),
                rest.last().map(|s| s.to_string()).unwrap_or_default(),
                Vec::new(),
            ),
        };

        EntityInfo {
            fully_qualified_name: fully_qualified_name.to_string(),
            namespace: Path::new(parts[..namespace_len].iter().map(|s| s.to_string()).collect()),
            scope,
            entity_name,
            property_access,
            inflection: OnceCell::new(),
            parent: OnceCell::new(),
        }
    }

    /// Trailing segments that walk through elements of the definition.
    fn property_path(&self, definition_name: &str, trailing: &[&str]) -> Vec<String> {
        let mut path = Vec::new();
        let Some(mut current) = self.csn.definition(definition_name) else {
            return path;
        };
        for segment in trailing {
            let elements = self.csn.all_elements(current);
            let Some(element) = elements.get(segment) else {
                tracing::debug!(name = definition_name, segment, "segment is not an element");
                break;
            };
            path.push(segment.to_string());
            current = match element.target.as_deref().and_then(|t| self.csn.definition(t)) {
                Some(target) => target,
                None => element,
            };
        }
        path
    }

    /// Singular and plural of the definition `info` refers to.
    pub fn inflection(&self, info: &EntityInfo) -> Inflection {
        self.inflection_with_issues(info).0
    }

    pub fn inflection_with_issues(&self, info: &EntityInfo) -> (Inflection, Vec<NamingIssue>) {
        info.inflection
            .get_or_init(|| {
                let definition = self.csn.definition(&info.definition_name());
                let uninflected = definition
                    .map(|d| matches!(d.kind, Some(Kind::Type | Kind::Aspect | Kind::Event)))
                    .unwrap_or(true);
                if uninflected {
                    return (Inflection::uninflected(&info.entity_name), Vec::new());
                }
                inflect::derive(
                    &info.entity_name,
                    definition.and_then(|d| d.annotation_str(SINGULAR)),
                    definition.and_then(|d| d.annotation_str(PLURAL)),
                )
            })
            .clone()
    }

    /// The enclosing definition of a scoped definition, e.g. `bookshop.Books`
    /// for `bookshop.Books.texts`.
    pub fn parent(&self, info: &EntityInfo) -> Option<Rc<EntityInfo>> {
        info.parent
            .get_or_init(|| {
                if info.scope.is_empty() {
                    return None;
                }
                let mut parts: Vec<&str> = info.namespace.parts().iter().map(String::as_str).collect();
                parts.extend(info.scope.iter().map(String::as_str));
                Some(self.lookup(&parts.join(".")))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Csn {
        Csn::from_value(json!({
            "definitions": {
                "bookshop.Books": {
                    "kind": "entity",
                    "elements": {
                        "ID": { "key": true, "type": "cds.UUID" },
                        "author": { "type": "cds.Association", "target": "bookshop.Authors" },
                        "texts": { "type": "cds.Composition", "target": "bookshop.Books.texts", "cardinality": { "max": "*" } }
                    }
                },
                "bookshop.Books.texts": { "kind": "entity", "elements": { "locale": { "key": true, "type": "cds.String" } } },
                "bookshop.Authors": { "kind": "entity", "elements": { "name": { "type": "cds.String" } } },
                "bookshop.Price": { "kind": "type", "type": "cds.Decimal" },
                "bookshop.People": { "kind": "entity", "@singular": "Person", "elements": {} },
                "bookshop.CatalogService": { "kind": "service" },
                "bookshop.CatalogService.Books": { "kind": "entity", "elements": {} },
                "a.C": { "kind": "entity", "elements": { "x": { "elements": { "y": { "type": "cds.String" } } } } },
                "a.C.D": { "kind": "entity", "elements": { "x": { "elements": { "y": { "type": "cds.String" } } } } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn untangles_plain_entity() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let info = repo.lookup("bookshop.Books");
        assert_eq!(info.namespace.as_namespace(), "bookshop");
        assert!(info.scope.is_empty());
        assert_eq!(info.entity_name, "Books");
        assert!(info.property_access.is_empty());
    }

    #[test]
    fn untangles_scoped_entity_and_service_namespace() {
        let csn = model();
        let repo = EntityRepository::new(&csn);

        let texts = repo.lookup("bookshop.Books.texts");
        assert_eq!(texts.namespace.as_namespace(), "bookshop");
        assert_eq!(texts.scope, vec!["Books"]);
        assert_eq!(texts.entity_name, "texts");
        assert_eq!(repo.parent(&texts).unwrap().fully_qualified_name, "bookshop.Books");

        let projection = repo.lookup("bookshop.CatalogService.Books");
        assert_eq!(projection.namespace.as_namespace(), "bookshop.CatalogService");
        assert_eq!(projection.entity_name, "Books");
    }

    #[test]
    fn untangles_nested_entities_with_property_access() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let info = repo.lookup("a.C.D.x.y");
        assert_eq!(info.namespace.as_namespace(), "a");
        assert_eq!(info.scope, vec!["C"]);
        assert_eq!(info.entity_name, "D");
        assert_eq!(info.property_access, vec!["x", "y"]);
        assert_eq!(info.definition_name(), "a.C.D");
    }

    #[test]
    fn property_access_follows_associations() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let info = repo.lookup("bookshop.Books.author.name");
        assert_eq!(info.entity_name, "Books");
        assert_eq!(info.property_access, vec!["author", "name"]);
    }

    #[test]
    fn unknown_names_keep_last_segment() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let info = repo.lookup("cds.hana.VARCHAR");
        assert_eq!(info.namespace.as_namespace(), "cds.hana");
        assert_eq!(info.entity_name, "VARCHAR");
    }

    #[test]
    fn caches_lookups() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let a = repo.lookup("bookshop.Books");
        let b = repo.lookup("bookshop.Books");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn inflects_entities_but_not_types() {
        let csn = model();
        let repo = EntityRepository::new(&csn);
        let books = repo.inflection(&repo.lookup("bookshop.Books"));
        assert_eq!((books.singular.as_str(), books.plural.as_str()), ("Book", "Books"));

        let price = repo.inflection(&repo.lookup("bookshop.Price"));
        assert_eq!((price.singular.as_str(), price.plural.as_str()), ("Price", "Price"));

        let people = repo.inflection(&repo.lookup("bookshop.People"));
        assert_eq!((people.singular.as_str(), people.plural.as_str()), ("Person", "People"));
    }
}
