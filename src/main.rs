//! weir: a rule-driven file-processing engine with content-addressed
//! incremental rebuilds.

mod cli;
mod config;
mod logger;
mod pipeline;
mod serve;
mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::ProjectConfig;
use crate::log;

/// External tools a full pipeline (including the `fetch_url_stub` demo
/// transform) would shell out to. Checked by `weir build --check`.
const EXTERNAL_TOOLS: &[&str] = &["curl"];

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ProjectConfig::load(&cli)?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            log!("build"; "received interrupt, finishing current step before stopping");
            cancel.store(true, Ordering::SeqCst);
        })?;
    }

    match &cli.command {
        Commands::Build { check, .. } if *check => run_check(),
        Commands::Build { .. } => run_build(&config, &cancel),
        Commands::Watch { .. } => run_watch(&config, &cancel),
        Commands::Serve { .. } => run_serve(&config, &cancel),
    }
}

fn run_check() -> Result<()> {
    let missing = config::audit_dependencies(EXTERNAL_TOOLS);
    if missing.is_empty() {
        log!("build"; "all external dependencies found");
        Ok(())
    } else {
        anyhow::bail!("missing external tools: {}", missing.join(", "));
    }
}

fn run_build(config: &ProjectConfig, cancel: &AtomicBool) -> Result<()> {
    let engine = pipeline::build_engine(config)?;
    let report = engine.run(cancel)?;
    log!("build"; "{} processed, {} skipped, {} dropped, {} orphans removed", report.processed.len(), report.skipped.len(), report.dropped.len(), report.orphans_removed.len());
    for error in &report.errors {
        log!("error"; "{error}");
    }
    Ok(())
}

fn run_watch(config: &ProjectConfig, cancel: &AtomicBool) -> Result<()> {
    let engine = pipeline::build_engine(config)?;
    engine.run(cancel)?;
    watch::watch(&engine, &config.input_dir, cancel)
}

fn run_serve(config: &ProjectConfig, cancel: &AtomicBool) -> Result<()> {
    let engine = pipeline::build_engine(config)?;
    engine.run(cancel)?;

    let output_dir = engine.settings().dirs().output_dir.clone();
    let interface = config.serve_interface.clone();
    let port = config.serve_port;

    std::thread::scope(|scope| {
        scope.spawn(|| {
            if let Err(e) = serve::serve(&output_dir, &interface, port) {
                log!("error"; "serve failed: {e}");
            }
        });
        watch::watch(&engine, &config.input_dir, cancel)
    })
}
