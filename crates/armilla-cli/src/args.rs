//! Command-line argument definitions for the Armilla CLI.
//!
//! Arguments control input/output paths, configuration file selection,
//! validation constraints, collapse state, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Armilla diagram compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram (a JSON DiagramAst document)
    #[arg(help = "Path to the input diagram JSON file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Diagram-type constraint to validate against (flowchart, sequence, state)
    #[arg(long)]
    pub constraint: Option<String>,

    /// Emit strict output without interaction-oriented data attributes
    #[arg(long)]
    pub strict: bool,

    /// Collapse state keys to treat as collapsed for this compile
    #[arg(long = "collapse", value_name = "KEY")]
    pub collapsed: Vec<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
