//! CLI plumbing: read a JSON diagram, compile, write SVG.

pub mod config;

mod args;

pub use args::Args;

use std::{fs, io, sync::Arc};

use log::{info, warn};
use thiserror::Error;

use armilla::{
    ArmillaError, Compiler,
    ast::DiagramAst,
    collapse::{CollapseState, CollapseStore},
    registry::ShapeRegistry,
};

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse diagram JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse configuration file {0}: {1}")]
    Config(String, String),

    #[error(transparent)]
    Compile(#[from] ArmillaError),
}

/// Runs one compile per the parsed arguments.
pub fn run(args: &Args) -> Result<(), CliError> {
    let mut compile_config = config::load(args.config.as_deref())?;
    if let Some(constraint) = &args.constraint {
        compile_config.set_diagram_type(Some(constraint.clone()));
    }
    if args.strict {
        compile_config.render_mut().set_strict(true);
    }

    info!(input = args.input, output = args.output; "Compiling diagram");
    let content = fs::read_to_string(&args.input)?;
    let ast: DiagramAst = serde_json::from_str(&content)?;

    let mut store = CollapseStore::new();
    for key in &args.collapsed {
        store.set(key, CollapseState::Collapsed);
    }

    let compiler = Compiler::new(Arc::new(ShapeRegistry::with_builtins()), compile_config);
    let output = compiler.compile(&ast, &store)?;

    for warning in &output.warnings {
        warn!("{warning}");
    }

    fs::write(&args.output, &output.svg)?;
    info!(bytes = output.svg.len(); "SVG written");
    Ok(())
}
