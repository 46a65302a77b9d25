//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort the compilation of a model.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{}': {message}", path.display())]
    #[diagnostic(code(csn_typer::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid model: {message}")]
    #[diagnostic(
        code(csn_typer::input::invalid_model),
        help("The input must be a compiled CSN document with a top-level 'definitions' object")
    )]
    InvalidModel {
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(csn_typer::input::invalid_config))]
    InvalidConfig {
        message: String,
    },

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("Cannot resolve type '{name}' of '{element}'")]
    #[diagnostic(
        code(csn_typer::resolve::unresolved_type),
        help("The type is neither a builtin, a model definition nor part of a known library")
    )]
    UnresolvedType {
        name: String,
        element: String,
    },

    #[error("Malformed type reference '{reference}'")]
    #[diagnostic(
        code(csn_typer::resolve::malformed_reference),
        help("References take the form 'Entity:element.path'")
    )]
    MalformedReference {
        reference: String,
    },

    #[error("Type resolution of '{name}' exceeded the depth limit of {limit}")]
    #[diagnostic(
        code(csn_typer::resolve::recursion_limit),
        help("The model probably contains a cyclic type definition")
    )]
    RecursionLimit {
        name: String,
        limit: usize,
    },

    // =========================================================================
    // Naming Errors
    // =========================================================================
    #[error("Derived singular '{name}' of '{fully_qualified_name}' collides with the definition '{existing}'")]
    #[diagnostic(
        code(csn_typer::naming::collision),
        help("Annotate the entity with @singular or @plural to pick distinct names")
    )]
    NameCollision {
        name: String,
        fully_qualified_name: String,
        existing: String,
    },

    // =========================================================================
    // Draft Errors
    // =========================================================================
    #[error("Conflicting draft enablement:\n{}", conflicts.join("\n"))]
    #[diagnostic(
        code(csn_typer::draft::conflict),
        help("Only the root of a composition hierarchy may carry @odata.draft.enabled")
    )]
    DraftConflicts {
        conflicts: Vec<String>,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an unresolved type error.
    pub fn unresolved(name: impl Into<String>, element: impl Into<String>) -> Self {
        Self::UnresolvedType {
            name: name.into(),
            element: element.into(),
        }
    }
}
