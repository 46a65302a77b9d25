//! Namespace paths and their renderings as directories, namespaces and identifiers.

use std::fmt;
use std::path::PathBuf;

/// Options for [`Path::as_directory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryOptions<'a> {
    /// Render relative to this path instead of the output root.
    pub relative: Option<&'a Path>,
    /// Prefix with `./` so the result can be used as a module specifier.
    pub local: bool,
    /// Always use `/` as separator.
    pub posix: bool,
}

/// An immutable sequence of namespace segments, e.g. `sap.common`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    parts: Vec<String>,
}

impl Path {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// Splits a dotted namespace. The empty string is the root namespace.
    pub fn from_namespace(namespace: &str) -> Self {
        if namespace.is_empty() {
            return Self::default();
        }
        Self {
            parts: namespace.split('.').map(str::to_string).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The path one segment shorter. The parent of the root is the root.
    pub fn parent(&self) -> Path {
        let mut parts = self.parts.clone();
        parts.pop();
        Path { parts }
    }

    pub fn as_namespace(&self) -> String {
        self.parts.join(".")
    }

    /// The alias a file importing this namespace binds it to: `_sap_common`.
    /// The root namespace is `_`.
    pub fn as_identifier(&self) -> String {
        format!("_{}", self.parts.join("_"))
    }

    pub fn as_directory(&self, options: DirectoryOptions<'_>) -> String {
        let own: PathBuf = self.parts.iter().collect();
        let directory = match options.relative {
            Some(base) => {
                let base: PathBuf = base.parts.iter().collect();
                pathdiff::diff_paths(&own, &base).unwrap_or(own)
            }
            None => own,
        };
        let mut rendered = directory.to_string_lossy().into_owned();
        if options.posix {
            rendered = rendered.replace('\\', "/");
        }
        if options.local {
            rendered = if rendered.is_empty() {
                "./".to_string()
            } else {
                format!("./{}", rendered)
            };
        }
        rendered
    }

    /// True iff this path renders as the current directory when seen from `relative_to`.
    pub fn is_cwd(&self, relative_to: &Path) -> bool {
        self.as_directory(DirectoryOptions {
            relative: Some(relative_to),
            ..DirectoryOptions::default()
        })
        .is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_namespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ns: &str) -> Path {
        Path::from_namespace(ns)
    }

    #[test]
    fn renders_namespace_and_identifier() {
        assert_eq!(path("sap.common").as_namespace(), "sap.common");
        assert_eq!(path("sap.common").as_identifier(), "_sap_common");
        assert_eq!(path("").as_identifier(), "_");
        assert_eq!(path("_").as_identifier(), "__");
    }

    #[test]
    fn parent_drops_last_segment() {
        for segments in [vec!["a"], vec!["a", "b"], vec!["a", "b", "c"]] {
            let p = Path::new(segments.iter().map(|s| s.to_string()).collect());
            assert_eq!(p.parent().as_namespace(), segments[..segments.len() - 1].join("."));
        }
        assert_eq!(Path::default().parent().as_namespace(), "");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(path("a.b"), Path::new(vec!["a".into(), "b".into()]));
        assert_ne!(path("a.b"), path("a"));
    }

    #[test]
    fn renders_directories() {
        let target = path("sap.common");
        let from = path("bookshop");
        assert_eq!(target.as_directory(DirectoryOptions::default()), "sap/common");
        assert_eq!(
            target.as_directory(DirectoryOptions { relative: Some(&from), local: true, posix: true }),
            "./../sap/common"
        );
        assert_eq!(
            path("bookshop.CatalogService").as_directory(DirectoryOptions {
                relative: Some(&from),
                local: true,
                posix: true
            }),
            "./CatalogService"
        );
        assert_eq!(
            Path::default().as_directory(DirectoryOptions { relative: Some(&from), local: true, posix: true }),
            "./.."
        );
    }

    #[test]
    fn detects_current_directory() {
        assert!(path("bookshop").is_cwd(&path("bookshop")));
        assert!(!path("bookshop").is_cwd(&path("sap.common")));
        assert!(Path::default().is_cwd(&Path::default()));
    }
}
