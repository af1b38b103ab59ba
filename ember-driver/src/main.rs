//! Ember IR Compiler Driver
//!
//! Main entry point for the Ember backend. Reads a typed program in its
//! JSON form and writes textual LLVM IR for the native toolchain.

use clap::{Parser, Subcommand};
use ember_codegen::EmitterConfig;
use ember_common::{CompilerError, ErrorReporter};
use ember_frontend::Frontend;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "emberc")]
#[command(about = "Ember IR backend")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a typed program to IR
    Compile {
        /// Input program (JSON)
        input: PathBuf,

        /// Output IR file, defaults to the input with a .ll extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print IR to stdout
        #[arg(long)]
        print_ir: bool,

        /// Module id written to the IR header, defaults to the input file name
        #[arg(long)]
        module_id: Option<String>,

        #[arg(long)]
        target_triple: Option<String>,

        #[arg(long)]
        data_layout: Option<String>,

        /// Leave out function attribute groups
        #[arg(long)]
        no_attributes: bool,
    },

    /// Translate a typed program and report errors without writing output
    Check {
        /// Input program (JSON)
        input: PathBuf,
    },
}

struct CompileOptions {
    output: Option<PathBuf>,
    print_ir: bool,
    config: EmitterConfig,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let (input, result) = match cli.command {
        Commands::Compile {
            input,
            output,
            print_ir,
            module_id,
            target_triple,
            data_layout,
            no_attributes,
        } => {
            let options = CompileOptions {
                output,
                print_ir,
                config: EmitterConfig {
                    module_id: module_id.unwrap_or_else(|| default_module_id(&input)),
                    target_triple,
                    data_layout,
                    emit_attributes: !no_attributes,
                },
            };
            let result = compile_file(&input, options);
            (input, result)
        }
        Commands::Check { input } => {
            let result = check_file(&input);
            (input, result)
        }
    };

    if let Err(err) = result {
        let mut reporter = ErrorReporter::new();
        reporter
            .report(&err)
            .notes
            .push(format!("while translating {}", input.display()));
        reporter.print_diagnostics();
        eprintln!("{}", reporter.summary());
        std::process::exit(1);
    }
}

fn default_module_id(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| EmitterConfig::default().module_id)
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("ll")
}

fn compile_file(input: &Path, options: CompileOptions) -> Result<(), CompilerError> {
    info!("compiling {}", input.display());
    let source = fs::read_to_string(input)?;
    let text = Frontend::compile_json(&source, options.config)?;

    if options.print_ir {
        print!("{}", text);
    }

    let output = options.output.unwrap_or_else(|| default_output_path(input));
    fs::write(&output, &text)?;
    info!("IR written to {}", output.display());
    Ok(())
}

fn check_file(input: &Path) -> Result<(), CompilerError> {
    let source = fs::read_to_string(input)?;
    let program = Frontend::parse_json(&source)?;
    let module = Frontend::compile(&program, EmitterConfig::default())?;
    println!(
        "{}: ok ({} globals, {} functions)",
        input.display(),
        module.globals.len(),
        module.functions.len()
    );
    Ok(())
}
