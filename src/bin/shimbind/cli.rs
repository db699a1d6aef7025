//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// shimbind - Declarative interface shims over types you do not control
#[derive(Parser)]
#[command(name = "shimbind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every shim and report diagnostics
    Check(CheckArgs),

    /// Generate adapters and lookup tables
    Generate(GenerateArgs),

    /// Show how each member of an interface binds
    Explain(ExplainArgs),

    /// Display the nested shim graph
    Graph(GraphArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the program model comes from.
#[derive(Args)]
pub struct ModelArgs {
    /// Model file, or a directory of model files (defaults to the current directory)
    #[arg(short, long, env = "SHIMBIND_MODEL")]
    pub model: Option<PathBuf>,

    /// Treat interfaces used without a shim marker as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Renderer to use (csharp, plan)
    #[arg(short, long)]
    pub renderer: Option<String>,

    /// Namespace of generated code
    #[arg(long)]
    pub namespace: Option<String>,

    /// Directory to write generated files to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write one file per adapter
    #[arg(long)]
    pub file_per_adapter: bool,

    /// Render without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Interface to explain
    pub interface: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Print Graphviz DOT instead of a tree
    #[arg(long)]
    pub dot: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
