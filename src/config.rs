//! Project configuration: a thin `weir.toml` for the handful of parameters
//! a deployment legitimately wants to override without recompiling, layered
//! under CLI flags. Rules themselves are constructed in code (see
//! [`crate::pipeline`]), not read from this file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use educe::Educe;
use serde::Deserialize;

use crate::cli::{Cli, Commands};

/// Values read from `weir.toml`, all optional: anything left unset falls
/// back to [`weir_core::Settings`]'s own defaults.
#[derive(Debug, Deserialize, Educe)]
#[educe(Default)]
#[serde(default)]
pub struct RawConfig {
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
    pub working_dir: Option<String>,
    #[educe(Default = false)]
    pub keep_going: bool,
    pub serve: ServeConfig,
}

#[derive(Debug, Deserialize, Educe)]
#[educe(Default)]
#[serde(default)]
pub struct ServeConfig {
    #[educe(Default = "127.0.0.1")]
    pub interface: String,
    #[educe(Default = 8080)]
    pub port: u16,
}

/// The fully resolved project configuration, CLI flags layered over
/// `weir.toml` layered over built-in defaults.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub keep_going: bool,
    pub clean: bool,
    pub serve_interface: String,
    pub serve_port: u16,
}

impl ProjectConfig {
    /// Load `weir.toml` (if present) from the current directory and merge
    /// it with CLI overrides. A missing config file is not an error; it is
    /// as if every field had been left unset.
    pub fn load(cli: &Cli) -> Result<Self> {
        let raw = match std::fs::read_to_string(&cli.config) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("failed to parse `{}`", cli.config.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
            Err(e) => return Err(e).with_context(|| format!("failed to read `{}`", cli.config.display())),
        };

        let input_dir = cli
            .input
            .clone()
            .or_else(|| raw.input_dir.as_deref().map(expand_path))
            .unwrap_or_else(|| PathBuf::from("content"));

        let output_dir = cli.output.clone().or_else(|| raw.output_dir.as_deref().map(expand_path));
        let working_dir = cli.working.clone().or_else(|| raw.working_dir.as_deref().map(expand_path));

        let (keep_going, clean, serve_interface, serve_port) = match &cli.command {
            Commands::Build { keep_going, clean, .. } => {
                (*keep_going || raw.keep_going, *clean, raw.serve.interface, raw.serve.port)
            }
            Commands::Watch { keep_going } => (*keep_going || raw.keep_going, false, raw.serve.interface, raw.serve.port),
            Commands::Serve { keep_going, interface, port } => {
                (*keep_going || raw.keep_going, false, interface.clone(), *port)
            }
        };

        Ok(Self { input_dir, output_dir, working_dir, keep_going, clean, serve_interface, serve_port })
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Check whether an external tool required by a transform is present on
/// `PATH`. Mirrors the dependency audit a deployment runs via `weir build
/// --check` before committing to a full build.
pub fn tool_installed(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check a list of required external tools, returning the names of any
/// that are missing.
pub fn audit_dependencies(tools: &[&str]) -> Vec<String> {
    tools.iter().filter(|t| !tool_installed(t)).map(|t| t.to_string()).collect()
}
