use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use serde::Deserialize;

use crate::templates;

pub const DEFAULT_ROOT: &str = ".";
pub const DEFAULT_CHAPTERS_DIR: &str = "chapters";
pub const DEFAULT_MAIN_FILE: &str = "main.tex";
pub const DEFAULT_TEMPLATE: &str = "chapter.json";
pub const DEFAULT_EXTENSION: &str = "tex";

/// Root configuration document loaded from `texkit.toml` by default.
///
/// Every field is optional; the defaults reproduce the conventional thesis
/// layout (`chapters/` next to `main.tex`, `.tex` documents).
#[derive(Debug, Default, Deserialize)]
pub struct TexkitConfig {
    root: Option<String>,
    chapters_dir: Option<String>,
    main_file: Option<String>,
    check: Option<CheckConfig>,
    scaffold: Option<ScaffoldConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckConfig {
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ScaffoldConfig {
    template: Option<String>,
    placeholders: Option<bool>,
}

impl TexkitConfig {
    /// Thesis root, relative to the directory the config file lives in.
    pub fn root(&self) -> &str {
        self.root.as_deref().unwrap_or(DEFAULT_ROOT)
    }

    /// Directory under the root that holds the chapter tree.
    pub fn chapters_dir(&self) -> &str {
        self.chapters_dir.as_deref().unwrap_or(DEFAULT_CHAPTERS_DIR)
    }

    /// The main document, the usual anchor of `\input{}` chains.
    pub fn main_file(&self) -> &str {
        self.main_file.as_deref().unwrap_or(DEFAULT_MAIN_FILE)
    }

    /// Document extensions the input checker scans.
    pub fn extensions(&self) -> Vec<String> {
        self.check
            .as_ref()
            .and_then(|check| check.extensions.clone())
            .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_owned()])
    }

    /// Template description path, relative to the thesis root.
    pub fn template(&self) -> &str {
        self.scaffold
            .as_ref()
            .and_then(|scaffold| scaffold.template.as_deref())
            .unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Whether the scaffolder writes placeholder documents per node.
    pub fn placeholders(&self) -> bool {
        self.scaffold
            .as_ref()
            .and_then(|scaffold| scaffold.placeholders)
            .unwrap_or(true)
    }
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<TexkitConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_example(path, "config/texkit.example.toml")
}

pub fn format_summary(config: &TexkitConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Thesis root: {}", config.root());
    let _ = writeln!(out, "Chapters directory: {}", config.chapters_dir());
    let _ = writeln!(out, "Main document: {}", config.main_file());
    let _ = writeln!(out, "Scan extensions: {}", config.extensions().join(", "));
    let _ = writeln!(out, "Scaffold template: {}", config.template());
    let _ = writeln!(
        out,
        "Placeholder documents: {}",
        if config.placeholders() { "enabled" } else { "disabled" }
    );
    out
}
