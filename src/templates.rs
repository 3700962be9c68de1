use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use rust_embed::RustEmbed;

/// Files compiled into the binary: one placeholder body per node depth,
/// the example template description, and the example config.
#[derive(RustEmbed)]
#[folder = "templates"]
struct Assets;

// Placeholder body per nesting depth; deeper nodes reuse the last one.
const LEVELS: [&str; 3] = ["chapter.tex", "section.tex", "subsection.tex"];

fn get_bytes(path: &str) -> Result<Vec<u8>> {
    let file = Assets::get(path).ok_or_else(|| anyhow!("embedded asset `{}` missing", path))?;
    Ok(file.data.as_ref().to_vec())
}

pub fn get_string(path: &str) -> Result<String> {
    let bytes = get_bytes(path)?;
    std::str::from_utf8(&bytes)
        .with_context(|| format!("decoding embedded asset `{}`", path))
        .map(|value| value.to_owned())
}

/// Placeholder document body for a node `depth` levels below the output
/// root, with `$title` and `$label` substituted.
pub fn placeholder(depth: usize, title: &str, label: &str) -> Result<String> {
    let body = get_string(LEVELS[depth.min(LEVELS.len() - 1)])?;
    Ok(body.replace("$title", title).replace("$label", label))
}

/// Copy an embedded example to disk, creating parent directories as
/// needed. Overwrite checks are the caller's business.
pub fn write_example(destination: &Utf8Path, asset: &str) -> Result<()> {
    let bytes = get_bytes(asset)?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }
    fs::write(destination, bytes).with_context(|| format!("writing {}", destination))
}
