use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Options for collecting document files under a root.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Extensions (without the dot) that mark a document file.
    pub extensions: Vec<String>,
    /// Skip dotfiles and dot-directories entirely.
    pub ignore_hidden: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            extensions: vec![crate::config::DEFAULT_EXTENSION.to_owned()],
            ignore_hidden: true,
        }
    }
}

// Directories that never hold thesis sources.
fn ignored_dirs() -> HashSet<&'static str> {
    let mut patterns = HashSet::new();
    patterns.insert(".git");
    patterns.insert(".svn");
    patterns.insert(".hg");
    patterns.insert(".vscode");
    patterns.insert(".idea");
    patterns.insert("_build");
    patterns.insert("node_modules");
    patterns.insert("target");
    patterns
}

fn should_ignore(name: &str, ignore_hidden: bool, patterns: &HashSet<&'static str>) -> bool {
    if ignore_hidden && name.starts_with('.') {
        return true;
    }
    patterns.contains(name)
}

/// Recursively collect document files under `root`, sorted for a stable
/// report order.
///
/// The root itself must be readable; unreadable subdirectories are skipped
/// with a warning so one bad permission bit cannot abort a scan.
pub fn collect_documents(root: &Utf8Path, options: &WalkOptions) -> Result<Vec<Utf8PathBuf>> {
    let patterns = ignored_dirs();
    let mut files = Vec::new();
    walk(root, options, &patterns, &mut files, true)?;
    files.sort();
    Ok(files)
}

fn walk(
    dir: &Utf8Path,
    options: &WalkOptions,
    patterns: &HashSet<&'static str>,
    files: &mut Vec<Utf8PathBuf>,
    is_root: bool,
) -> Result<()> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(err) if !is_root => {
            tracing::warn!("skipping unreadable directory {}: {}", dir, err);
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading directory {}", dir));
        }
    };

    let mut entries: Vec<_> = reader.filter_map(|entry| entry.ok()).collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if should_ignore(&name, options.ignore_hidden, patterns) {
            continue;
        }

        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            tracing::warn!("skipping non-UTF-8 path {}", entry.path().display());
            continue;
        };

        let Ok(file_type) = entry.file_type() else {
            tracing::warn!("skipping unreadable entry {}", path);
            continue;
        };

        if file_type.is_dir() {
            walk(&path, options, patterns, files, false)?;
        } else if matches_extension(&path, &options.extensions) {
            files.push(path);
        }
    }

    Ok(())
}

fn matches_extension(path: &Utf8Path, extensions: &[String]) -> bool {
    path.extension()
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    #[test]
    fn collects_matching_documents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        fs::create_dir_all(root.join("chapters/chapter1")).unwrap();
        fs::write(root.join("main.tex"), "x").unwrap();
        fs::write(root.join("chapters/chapter1/chapter1.tex"), "x").unwrap();
        fs::write(root.join("notes.md"), "x").unwrap();

        let files = collect_documents(&root, &WalkOptions::default()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.strip_prefix(&root).unwrap().as_str()).collect();
        assert_eq!(names, vec!["chapters/chapter1/chapter1.tex", "main.tex"]);
    }

    #[test]
    fn hidden_and_vcs_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join(".attic")).unwrap();
        fs::write(root.join(".git/blob.tex"), "x").unwrap();
        fs::write(root.join(".attic/old.tex"), "x").unwrap();
        fs::write(root.join(".hidden.tex"), "x").unwrap();
        fs::write(root.join("visible.tex"), "x").unwrap();

        let files = collect_documents(&root, &WalkOptions::default()).unwrap();
        assert_eq!(files, vec![root.join("visible.tex")]);
    }

    #[test]
    fn extension_filter_accepts_multiple_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        fs::write(root.join("a.tex"), "x").unwrap();
        fs::write(root.join("b.tikz"), "x").unwrap();
        fs::write(root.join("c.bib"), "x").unwrap();

        let options = WalkOptions {
            extensions: vec!["tex".to_owned(), "tikz".to_owned()],
            ..WalkOptions::default()
        };
        let files = collect_documents(&root, &options).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension() != Some("bib")));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path()).join("nope");
        assert!(collect_documents(&root, &WalkOptions::default()).is_err());
    }
}
