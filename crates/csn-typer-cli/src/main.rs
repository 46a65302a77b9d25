//! csn-typer CLI.
//!
//! Reads a compiled CSN model and writes one `index.ts`/`index.js` pair per namespace.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use csn_typer::{CompileOutput, Compiler, CompilerConfig, InlineDeclarations, Severity};

mod ui;

#[derive(Parser)]
#[command(name = "csn-typer")]
#[command(about = "Generates TypeScript types and runtime stubs from a compiled CDS model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "off")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a model and write the generated namespaces
    Compile {
        #[command(flatten)]
        options: ModelOptions,

        /// Output directory for the generated namespaces
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a model without writing anything
    Check {
        #[command(flatten)]
        options: ModelOptions,
    },
}

#[derive(Args)]
struct ModelOptions {
    /// Compiled CSN model (JSON)
    model: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rendering of inline declarations (flat, structured)
    #[arg(long)]
    inline_declarations: Option<InlineDeclarations>,

    /// Whether generated properties are optional
    #[arg(long)]
    properties_optional: Option<bool>,

    /// Widen 64 bit integers and decimals to also accept strings
    #[arg(long)]
    ieee754_compatible: bool,

    /// Bind runtime entities lazily through a proxy
    #[arg(long)]
    use_entities_proxy: bool,
}

impl ModelOptions {
    /// The configuration file (or the defaults), overridden by explicit flags.
    fn config(&self, output: Option<&Path>) -> miette::Result<CompilerConfig> {
        let mut config = match &self.config {
            Some(path) => CompilerConfig::from_json_file(path)?,
            None => CompilerConfig::default(),
        };
        if let Some(output) = output {
            config.output_directory = output.to_path_buf();
        }
        if let Some(mode) = self.inline_declarations {
            config.inline_declarations = mode;
        }
        if let Some(optional) = self.properties_optional {
            config.properties_optional = optional;
        }
        config.ieee754_compatible |= self.ieee754_compatible;
        config.use_entities_proxy |= self.use_entities_proxy;
        Ok(config)
    }
}

/// `None` for `off`; unknown levels fall back to INFO.
fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_ascii_lowercase().as_str() {
        "off" => None,
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => Some(tracing::Level::INFO),
    }
}

fn init_logging(level: &str) {
    let Some(level) = parse_level(level) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Compile { options, output } => {
            let config = options.config(output.as_deref())?;
            compile_model(&options.model, config)
        }
        Commands::Check { options } => {
            let config = options.config(None)?;
            check_model(&options.model, config)
        }
    }
}

fn compile_model(model: &Path, config: CompilerConfig) -> miette::Result<()> {
    let start = Instant::now();
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));

    let output_directory = config.output_directory.clone();
    let spinner = ui::spinner("Compiling model...");
    let compiler = Compiler::new(config);
    let output = match compiler.check_file(model) {
        Ok(output) => output,
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            return Err(e.into());
        }
    };
    let written = output.write_to(&output_directory)?;
    spinner.finish_and_clear();

    print_diagnostics(&output);
    ui::success(&format!(
        "{} namespaces, {} files",
        output.files.len(),
        written.len()
    ));
    println!();

    ui::box_header("NAMESPACES");
    ui::box_line("");
    for file in &output.files {
        ui::box_line(&ui::namespace_line(&file.directory(), file.runtime.is_some()));
    }
    ui::box_line("");
    ui::box_footer();
    println!();

    ui::info(&format!("Written to {}", output_directory.display()));
    ui::timing("Done", start.elapsed().as_millis());
    println!();
    Ok(())
}

fn check_model(model: &Path, config: CompilerConfig) -> miette::Result<()> {
    let spinner = ui::spinner("Checking model...");
    let compiler = Compiler::new(config);

    match compiler.check_file(model) {
        Ok(output) => {
            spinner.finish_and_clear();
            print_diagnostics(&output);
            ui::looking_good();
            println!();
            println!(
                "    {} namespaces {} {} warnings {} {} errors",
                output.files.len(),
                ui::symbols::DOT,
                count(&output, Severity::Warning),
                ui::symbols::DOT,
                count(&output, Severity::Error)
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            Err(e.into())
        }
    }
}

fn print_diagnostics(output: &CompileOutput) {
    if output.diagnostics.is_empty() {
        return;
    }
    for entry in &output.diagnostics {
        ui::diagnostic(entry);
    }
    ui::dim("The findings above did not stop the compilation.");
    println!();
}

fn count(output: &CompileOutput, severity: Severity) -> usize {
    output
        .diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}
