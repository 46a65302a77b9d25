//! State of one compilation.
//!
//! Everything that would otherwise be cached across runs (entity lookups,
//! referenced libraries, the draft-enabled set) lives here. A session is
//! created per compilation and dropped afterwards.

use std::collections::BTreeSet;

use crate::config::CompilerConfig;
use crate::csn::Csn;
use crate::diagnostic::Diagnostics;
use crate::emit::Path;
use crate::library::LibraryRegistry;
use crate::resolve::builtins::Builtins;
use crate::resolve::entity::EntityRepository;
use crate::resolve::inline::{inline_resolver, InlineDeclarationResolver};
use crate::resolve::keys::KeyPropagator;

/// Namespace of the shared base definitions.
pub const BASE_NAMESPACE: &str = "_";

#[derive(Debug)]
pub struct CompilationSession<'a> {
    pub csn: &'a Csn,
    pub config: CompilerConfig,
    pub builtins: Builtins,
    pub entities: EntityRepository<'a>,
    pub keys: KeyPropagator<'a>,
    pub libraries: LibraryRegistry,
    pub inline: Box<dyn InlineDeclarationResolver>,
    pub draft_enabled: BTreeSet<String>,
    pub diagnostics: Diagnostics,
    /// Definitions currently being emitted, innermost last.
    pub context: Vec<String>,
}

impl<'a> CompilationSession<'a> {
    pub fn new(csn: &'a Csn, config: CompilerConfig) -> Self {
        Self {
            csn,
            builtins: Builtins::new(config.ieee754_compatible),
            inline: inline_resolver(config.inline_declarations),
            entities: EntityRepository::new(csn),
            keys: KeyPropagator::new(csn),
            libraries: LibraryRegistry::default(),
            draft_enabled: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
            context: Vec::new(),
            config,
        }
    }

    pub fn base_path(&self) -> Path {
        Path::from_namespace(BASE_NAMESPACE)
    }

    pub fn is_draft_enabled(&self, fully_qualified_name: &str) -> bool {
        self.draft_enabled.contains(fully_qualified_name)
    }

    /// Whether `fully_qualified_name` is the definition currently being emitted.
    pub fn is_current(&self, fully_qualified_name: &str) -> bool {
        self.context.last().map(|c| c == fully_qualified_name).unwrap_or(false)
    }
}
