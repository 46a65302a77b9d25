//! Mapping of the model's primitive types to TypeScript.

/// Builtins that are containers for a target rather than values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Association,
    Composition,
}

/// The builtin type table for one compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins {
    ieee754_compatible: bool,
}

impl Builtins {
    pub fn new(ieee754_compatible: bool) -> Self {
        Self { ieee754_compatible }
    }

    /// TypeScript type of a primitive, or `None` if `name` is not a builtin.
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        let ts = match name {
            "cds.UUID" | "cds.String" | "cds.LargeString" | "cds.Vector" => "string",
            "cds.Binary" | "cds.LargeBinary" => "__.Binary",
            "cds.Boolean" => "boolean",
            "cds.Integer" | "cds.UInt8" | "cds.Int16" | "cds.Int32" | "cds.Double" => "number",
            "cds.Int64" | "cds.Integer64" | "cds.Decimal" | "cds.DecimalFloat" => {
                if self.ieee754_compatible {
                    "number | string"
                } else {
                    "number"
                }
            }
            "cds.Date" => "__.CdsDate",
            "cds.Time" => "__.CdsTime",
            "cds.DateTime" => "__.CdsDateTime",
            "cds.Timestamp" => "__.CdsTimestamp",
            "cds.Map" => "__.CdsMap",
            "cds.Association" => "__.Association",
            "cds.Composition" => "__.Composition",
            _ => return None,
        };
        Some(ts)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn container(name: &str) -> Option<Container> {
        match name {
            "cds.Association" => Some(Container::Association),
            "cds.Composition" => Some(Container::Composition),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_primitives() {
        let builtins = Builtins::default();
        assert_eq!(builtins.resolve("cds.String"), Some("string"));
        assert_eq!(builtins.resolve("cds.Integer"), Some("number"));
        assert_eq!(builtins.resolve("cds.Boolean"), Some("boolean"));
        assert_eq!(builtins.resolve("cds.Date"), Some("__.CdsDate"));
        assert_eq!(builtins.resolve("bookshop.Books"), None);
    }

    #[test]
    fn widens_numbers_when_ieee754_compatible() {
        assert_eq!(Builtins::new(false).resolve("cds.Decimal"), Some("number"));
        assert_eq!(Builtins::new(true).resolve("cds.Decimal"), Some("number | string"));
        assert_eq!(Builtins::new(true).resolve("cds.Int64"), Some("number | string"));
        assert_eq!(Builtins::new(true).resolve("cds.Integer"), Some("number"));
    }

    #[test]
    fn recognizes_containers() {
        assert_eq!(Builtins::container("cds.Composition"), Some(Container::Composition));
        assert_eq!(Builtins::container("cds.String"), None);
    }
}
