//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// weir: a rule-driven file-processing engine with content-addressed
/// incremental rebuilds
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Input directory (relative to the project root)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (relative to the project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Working directory used for intermediate artifacts
    #[arg(short = 'W', long)]
    pub working: Option<PathBuf>,

    /// Config file name
    #[arg(short = 'C', long, default_value = "weir.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the pipeline once over input_dir
    Build {
        /// Verify external tool dependencies and configuration, then exit
        /// without running the pipeline.
        #[arg(long)]
        check: bool,

        /// Continue processing remaining files after a transform error,
        /// instead of aborting the build.
        #[arg(long)]
        keep_going: bool,

        /// Delete output_dir and working_dir before building, forcing a
        /// full rebuild instead of an incremental one.
        #[arg(long)]
        clean: bool,
    },

    /// Run the pipeline, then watch input_dir and working_dir for changes
    /// and rebuild automatically.
    Watch {
        #[arg(long)]
        keep_going: bool,
    },

    /// Build once, then serve output_dir over HTTP, rebuilding on change.
    Serve {
        /// Interface to bind on
        #[arg(long, default_value = "127.0.0.1")]
        interface: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        #[arg(long)]
        keep_going: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
