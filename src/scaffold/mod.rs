pub mod template;

use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::templates;
use self::template::{NodeSpec, TemplateDescription};

const TEX_FILE: &str = ".tex";

#[derive(Debug, Clone, Copy, Default)]
pub struct ScaffoldOptions {
    /// Write a `<name>.tex` placeholder into every created directory.
    pub placeholders: bool,
    /// Report what would be done without touching the filesystem.
    pub dry_run: bool,
}

/// Everything a build run did (or, under `dry_run`, would have done).
#[derive(Debug, Default)]
pub struct BuildReport {
    pub created_dirs: Vec<Utf8PathBuf>,
    pub created_files: Vec<Utf8PathBuf>,
    pub skipped: Vec<Utf8PathBuf>,
    pub failed: Vec<(Utf8PathBuf, String)>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create the directory tree described by `description` under `root`.
///
/// Existing directories and placeholder files are kept as they are, so
/// rerunning the same description is safe and only fills in what is
/// missing. `base` is the directory that `\input` arguments in generated
/// placeholders are written relative to, normally the directory holding
/// `main.tex`.
///
/// A node that cannot be created is reported in the returned
/// [`BuildReport`] and its subtree skipped; siblings still proceed. Only a
/// missing or uncreatable `root` is fatal.
pub fn build(
    root: &Utf8Path,
    base: &Utf8Path,
    description: &TemplateDescription,
    options: ScaffoldOptions,
) -> Result<BuildReport> {
    let mut report = BuildReport::default();

    if !root.exists() && !options.dry_run {
        fs::create_dir_all(root).with_context(|| format!("creating output directory {}", root))?;
    }

    for chapter in &description.chapters {
        build_node(chapter, root, base, 0, "", options, &mut report);
    }

    Ok(report)
}

fn build_node(
    node: &NodeSpec,
    parent: &Utf8Path,
    base: &Utf8Path,
    depth: usize,
    prefix: &str,
    options: ScaffoldOptions,
    report: &mut BuildReport,
) {
    let dir = parent.join(&node.name);
    if !ensure_dir(&dir, options, report) {
        // Nothing below this node can be created either.
        return;
    }

    for asset in &node.assets {
        ensure_dir(&dir.join(asset), options, report);
    }

    let title = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}-{}", prefix, node.name)
    };

    if options.placeholders {
        write_placeholder(node, &dir, base, depth, &title, options, report);
    }

    for child in &node.sections {
        build_node(child, &dir, base, depth + 1, &title, options, report);
    }
}

// Returns whether the directory exists (or would, under dry_run) so the
// caller knows if descending makes sense.
fn ensure_dir(dir: &Utf8Path, options: ScaffoldOptions, report: &mut BuildReport) -> bool {
    if dir.is_dir() {
        tracing::debug!("{} already exists, keeping it", dir);
        report.skipped.push(dir.to_owned());
        return true;
    }
    if dir.exists() {
        // A file squatting on the node path; the node fails here rather
        // than as a cascade of errors below it.
        report
            .failed
            .push((dir.to_owned(), "exists but is not a directory".to_owned()));
        return false;
    }
    if options.dry_run {
        report.created_dirs.push(dir.to_owned());
        return true;
    }
    match fs::create_dir_all(dir) {
        Ok(()) => {
            report.created_dirs.push(dir.to_owned());
            true
        }
        Err(err) => {
            report.failed.push((dir.to_owned(), err.to_string()));
            false
        }
    }
}

fn write_placeholder(
    node: &NodeSpec,
    dir: &Utf8Path,
    base: &Utf8Path,
    depth: usize,
    title: &str,
    options: ScaffoldOptions,
    report: &mut BuildReport,
) {
    let file = dir.join(format!("{}{}", node.name, TEX_FILE));
    if file.exists() {
        tracing::debug!("{} already exists, keeping it", file);
        report.skipped.push(file);
        return;
    }

    let body = match placeholder_body(node, dir, base, depth, title) {
        Ok(body) => body,
        Err(err) => {
            report.failed.push((file, err.to_string()));
            return;
        }
    };

    if options.dry_run {
        report.created_files.push(file);
        return;
    }
    match fs::write(&file, body) {
        Ok(()) => report.created_files.push(file),
        Err(err) => report.failed.push((file, err.to_string())),
    }
}

// Rendered level template followed by one \input line per direct child,
// pointing at the placeholder the child will carry.
fn placeholder_body(
    node: &NodeSpec,
    dir: &Utf8Path,
    base: &Utf8Path,
    depth: usize,
    title: &str,
) -> Result<String> {
    let mut body = templates::placeholder(depth, title, title)?;
    for child in &node.sections {
        let target = dir
            .join(&child.name)
            .join(format!("{}{}", child.name, TEX_FILE));
        let target = target.strip_prefix(base).unwrap_or(&target);
        let _ = write!(body, "\n\\input{{{}}}\n", target);
    }
    Ok(body)
}
