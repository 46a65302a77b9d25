//! # csn-typer
//!
//! Generates TypeScript type definitions and CommonJS runtime stubs from a
//! compiled CDS model (CSN).
//!
//! ## Architecture
//!
//! ```text
//! CSN (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │     csn      │  Deserialize definitions in document order
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    draft     │  Propagate draft markers along compositions
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   visitor    │  Resolve types, aspectify entities,
//! │  (resolve)   │  fill one SourceFile per namespace
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │     emit     │  index.ts + index.js per namespace
//! └──────────────┘
//! ```
//!
//! All state of a run lives in a [`CompilationSession`]; compiling the same
//! model twice yields byte-identical output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use csn_typer::{Compiler, CompilerConfig};
//!
//! let compiler = Compiler::new(CompilerConfig::default());
//! let result = compiler.compile_file("gen/csn.json".as_ref())?;
//! println!("{} namespaces", result.namespaces);
//! ```

pub mod config;
pub mod csn;
pub mod diagnostic;
pub mod emit;
pub mod library;
pub mod naming;
pub mod resolve;
pub mod session;
pub mod visitor;

use std::path::{Path as FsPath, PathBuf};

pub use config::{CompilerConfig, InlineDeclarations};
pub use csn::Csn;
pub use diagnostic::{CompilerError, Diagnostic, Diagnostics, Severity};
pub use session::CompilationSession;

use emit::{DirectoryOptions, Path, AUTO_GENERATED_BANNER};
use resolve::collect_draft_enabled;
use visitor::Visitor;

/// Type layer of the base namespace.
pub const BASE_TYPES: &str = include_str!("../runtime/base.ts");
/// Runtime of the base namespace.
pub const BASE_RUNTIME: &str = include_str!("../runtime/base.js");

/// Generated code of one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: Path,
    /// Contents of `index.ts`.
    pub type_definitions: String,
    /// Contents of `index.js`. Libraries have none.
    pub runtime: Option<String>,
}

impl EmittedFile {
    /// Directory of the namespace relative to the output root.
    pub fn directory(&self) -> String {
        self.path.as_directory(DirectoryOptions {
            posix: true,
            ..DirectoryOptions::default()
        })
    }
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Base namespace first, then referenced libraries, then the model's
    /// namespaces in the order they were first encountered.
    pub files: Vec<EmittedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn directories(&self) -> Vec<String> {
        self.files.iter().map(EmittedFile::directory).collect()
    }

    pub fn file(&self, namespace: &str) -> Option<&EmittedFile> {
        self.files.iter().find(|f| f.path.as_namespace() == namespace)
    }

    /// Writes `index.ts` (and `index.js` where present) of every namespace
    /// below `out_dir`.
    pub fn write_to(&self, out_dir: &FsPath) -> Result<Vec<PathBuf>, CompilerError> {
        let mut written = Vec::new();
        for file in &self.files {
            let directory = out_dir.join(file.directory());
            std::fs::create_dir_all(&directory)
                .map_err(|e| CompilerError::io(&directory, e.to_string()))?;

            let types = directory.join("index.ts");
            std::fs::write(&types, &file.type_definitions)
                .map_err(|e| CompilerError::io(&types, e.to_string()))?;
            written.push(types);

            if let Some(runtime) = &file.runtime {
                let stub = directory.join("index.js");
                std::fs::write(&stub, runtime).map_err(|e| CompilerError::io(&stub, e.to_string()))?;
                written.push(stub);
            }
        }
        tracing::debug!(files = written.len(), out_dir = %out_dir.display(), "output written");
        Ok(written)
    }
}

/// Compiles a loaded model. Nothing is written.
pub fn compile(csn: &Csn, config: &CompilerConfig) -> Result<CompileOutput, CompilerError> {
    let mut session = CompilationSession::new(csn, config.clone());
    session.draft_enabled = collect_draft_enabled(csn, &mut session.diagnostics).into_result()?;

    let mut visitor = Visitor::new(&mut session);
    visitor.visit_definitions()?;
    let sources = visitor.into_files();

    let base = session.base_path();
    let mut files = vec![EmittedFile {
        path: base.clone(),
        type_definitions: BASE_TYPES.to_string(),
        runtime: Some(BASE_RUNTIME.to_string()),
    }];
    for library in session.libraries.referenced() {
        files.push(EmittedFile {
            path: library.namespace().clone(),
            type_definitions: format!("{}\n\n{}", AUTO_GENERATED_BANNER, library.source()),
            runtime: None,
        });
    }
    for source in &sources {
        files.push(EmittedFile {
            path: source.path().clone(),
            type_definitions: source.to_type_definitions(),
            runtime: Some(source.to_runtime_stub(config.use_entities_proxy, &base)),
        });
    }

    tracing::info!(
        namespaces = sources.len(),
        diagnostics = session.diagnostics.entries().len(),
        "model compiled"
    );
    Ok(CompileOutput {
        files,
        diagnostics: session.diagnostics.into_entries(),
    })
}

/// Loads, compiles and writes models according to a [`CompilerConfig`].
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles the model at `model_path` without writing anything.
    pub fn check_file(&self, model_path: &FsPath) -> Result<CompileOutput, CompilerError> {
        let csn = Csn::load(model_path)?;
        compile(&csn, &self.config)
    }

    /// Compiles the model at `model_path` and writes the result to the
    /// configured output directory.
    pub fn compile_file(&self, model_path: &FsPath) -> Result<CompileResult, CompilerError> {
        let csn = Csn::load(model_path)?;
        let output = compile(&csn, &self.config)?;
        output.write_to(&self.config.output_directory)?;

        Ok(CompileResult {
            namespaces: output.files.len(),
            entities: csn
                .definitions
                .values()
                .filter(|d| d.is_kind(crate::csn::Kind::Entity))
                .count(),
            diagnostics: output.diagnostics,
        })
    }
}

/// Result of a successful compilation.
#[derive(Debug)]
pub struct CompileResult {
    /// Number of namespaces written, base and libraries included.
    pub namespaces: usize,
    /// Number of entities in the model.
    pub entities: usize,
    /// Non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}
