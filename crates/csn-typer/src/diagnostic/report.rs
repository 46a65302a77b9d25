//! Non-fatal findings collected while compiling.

use std::fmt;

/// How severe a collected finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A finding that was logged but did not abort the compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Fully qualified name of the definition the finding is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", label, self.subject, self.message)
    }
}

/// Collects findings and forwards each one to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let (subject, message) = (subject.into(), message.into());
        tracing::warn!(subject = %subject, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            subject,
            message,
        });
    }

    pub fn error(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let (subject, message) = (subject.into(), message.into());
        tracing::error!(subject = %subject, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            subject,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("a.B", "first");
        diagnostics.error("a.C", "second");

        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[1].subject, "a.C");
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn display_includes_subject() {
        let d = Diagnostic {
            severity: Severity::Warning,
            subject: "bookshop.Sheep".to_string(),
            message: "singular and plural are equal".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "warning: bookshop.Sheep: singular and plural are equal"
        );
    }
}
