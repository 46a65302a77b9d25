//! Compiler configuration.

use std::path::{Path, PathBuf};
use serde::Deserialize;

use crate::diagnostic::CompilerError;

/// How anonymous nested structures are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineDeclarations {
    /// `x: { a: Integer }` becomes a property `x_a`.
    Flat,
    /// `x: { a: Integer }` becomes a property `x` with a nested object type.
    #[default]
    Structured,
}

impl std::str::FromStr for InlineDeclarations {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "structured" => Ok(Self::Structured),
            other => Err(CompilerError::InvalidConfig {
                message: format!("unknown inline declaration mode '{}', expected 'flat' or 'structured'", other),
            }),
        }
    }
}

/// Configuration for the csn-typer compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Directory the generated namespaces are written to.
    pub output_directory: PathBuf,

    /// Rendering strategy for inline declarations.
    pub inline_declarations: InlineDeclarations,

    /// Whether generated properties are optional (`?:`).
    pub properties_optional: bool,

    /// Widen 64 bit integers and decimals to also accept strings.
    #[serde(rename = "IEEE754Compatible")]
    pub ieee754_compatible: bool,

    /// Bind runtime entities lazily instead of re-exporting them directly.
    pub use_entities_proxy: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("@cds-models"),
            inline_declarations: InlineDeclarations::Structured,
            properties_optional: true,
            ieee754_compatible: false,
            use_entities_proxy: false,
        }
    }
}

impl CompilerConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, CompilerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompilerError::io(path, e.to_string()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(content).map_err(|e| CompilerError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
