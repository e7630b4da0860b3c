//! The rule set this binary runs. Rules are ordinary Rust values built with
//! [`weir_core::Rule::builder`]; there is no separate rule-definition file
//! format to parse.

use std::path::PathBuf;

use weir_core::{
    Copy, DirName, Engine, ExtensionMatcher, FnTransform, RegexMatcher, Rule, Settings, SourceRef, TransformError,
    TransformOutcome, WebIndex, WithExtension,
};

use crate::config::ProjectConfig;

/// Build the [`Engine`] for this project: static assets are copied
/// through verbatim, Markdown documents are rendered to a pretty-URL HTML
/// page, and a `.url` source demonstrates a non-filesystem dependency kind
/// via [`Engine::with_custom_kind`].
pub fn build_engine(config: &ProjectConfig) -> anyhow::Result<Engine> {
    let mut builder = Settings::builder(&config.input_dir)
        .error_policy(if config.keep_going { weir_core::ErrorPolicy::Continue } else { weir_core::ErrorPolicy::Abort })
        .purge_dirs(config.clean);
    if let Some(output_dir) = &config.output_dir {
        builder = builder.output_dir(output_dir);
    }
    if let Some(working_dir) = &config.working_dir {
        builder = builder.working_dir(working_dir);
    }
    let settings = builder.build()?;

    let assets = Rule::builder("assets")
        .source_dir(DirName::Input)
        .matcher(ExtensionMatcher::new(["png", "jpg", "jpeg", "gif", "svg", "css", "js", "ico"]))
        .path_calc(weir_core::DirRelative::new(DirName::Output))
        .transform(Copy)
        .build()?;

    let pages = Rule::builder("markdown-pages")
        .source_dir(DirName::Input)
        .matcher(ExtensionMatcher::new(["md"]))
        .path_calc(WebIndex::new(DirName::Output, "index.html"))
        .transform(FnTransform(render_markdown))
        .build()?;

    let feed = Rule::builder("feed-source")
        .source_dir(DirName::Input)
        .matcher(RegexMatcher::new(r".*\.url")?)
        .path_calc(WithExtension::new(DirName::Output, "json"))
        .transform(FnTransform(fetch_url_stub))
        .build()?;

    let rules = vec![assets, pages, feed];

    Ok(Engine::new(settings, rules).with_custom_kind("fetched-url", |entry| entry.custom_kind() == Some("fetched-url")))
}

/// Renders a Markdown document to a minimal HTML page. A real deployment
/// would reach for `pulldown-cmark`; this keeps the demo pipeline
/// dependency-free beyond what the engine itself needs.
fn render_markdown(source: SourceRef<'_>, outputs: &[PathBuf]) -> Result<TransformOutcome, TransformError> {
    let dest = &outputs[0];
    let text = std::fs::read_to_string(source.abs_path)?;
    let title = source.rel_path.file_stem().and_then(|s| s.to_str()).unwrap_or("untitled");
    let body = text.replace('\n', "<br>\n");
    let html = format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n"
    );

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, html)?;
    Ok(TransformOutcome::defaults())
}

/// Stand-in for a transform whose freshness depends on something other
/// than a file's content hash, e.g. an HTTP ETag from a remote feed. The
/// fetch itself is not implemented here; this only demonstrates wiring a
/// [`weir_core::custody::CustodyEntry::Custom`] record through
/// `register_kind`.
fn fetch_url_stub(source: SourceRef<'_>, outputs: &[PathBuf]) -> Result<TransformOutcome, TransformError> {
    let dest = &outputs[0];
    let url = std::fs::read_to_string(source.abs_path)?;
    let placeholder = serde_json::json!({ "source_url": url.trim(), "fetched": false });

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, serde_json::to_vec_pretty(&placeholder)?)?;
    Ok(TransformOutcome::defaults())
}
