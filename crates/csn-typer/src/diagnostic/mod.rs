//! Diagnostic types for error reporting.

mod error;
mod report;

pub use error::CompilerError;
pub use report::{Diagnostic, Diagnostics, Severity};
