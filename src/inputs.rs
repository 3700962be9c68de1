use std::collections::BTreeSet;
use std::fs;
use std::sync::LazyLock;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::walk::{self, WalkOptions};

// Matches `\input{...}`; the capture is the path between the braces.
static INPUT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\input\{([^{}]*)\}").expect("input statement pattern compiles"));

/// One `\input{}` statement extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRef {
    /// Path exactly as written between the braces.
    pub target: String,
    /// 1-based line number of the statement.
    pub line: usize,
}

/// A reference whose target does not exist on disk.
#[derive(Debug, Clone)]
pub struct MissingInput {
    pub document: Utf8PathBuf,
    pub line: usize,
    pub target: String,
    /// The path that was probed, for the report line.
    pub resolved: Utf8PathBuf,
}

/// Everything one scan pass learned about the tree.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub missing: Vec<MissingInput>,
    pub documents: Vec<Utf8PathBuf>,
    /// Documents actually read and scanned.
    pub scanned: usize,
    /// Documents skipped as unreadable.
    pub skipped: usize,
    pub reference_count: usize,
    satisfied: BTreeSet<Utf8PathBuf>,
}

/// Extract every input statement in `text`, in line order.
pub fn find_inputs(text: &str) -> Vec<InputRef> {
    let mut refs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for caps in INPUT_PATTERN.captures_iter(line) {
            refs.push(InputRef {
                target: caps[1].to_owned(),
                line: idx + 1,
            });
        }
    }
    refs
}

/// Scan every document under `scan_root` and verify that each `\input{}`
/// target exists relative to `base`.
///
/// Unreadable documents produce a warning and are skipped; the scan
/// continues with the remaining files.
pub fn scan(scan_root: &Utf8Path, base: &Utf8Path, options: &WalkOptions) -> Result<CheckOutcome> {
    let documents = walk::collect_documents(scan_root, options)?;
    let mut outcome = CheckOutcome::default();

    for document in &documents {
        let text = match fs::read_to_string(document) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("cannot read {}: {}", document, err);
                outcome.skipped += 1;
                continue;
            }
        };
        outcome.scanned += 1;

        for input in find_inputs(&text) {
            outcome.reference_count += 1;
            match resolve(base, &input.target) {
                Some(existing) => {
                    tracing::debug!("{}:{}: {} exists", document, input.line, existing);
                    if let Some(canonical) = canonical(&existing) {
                        outcome.satisfied.insert(canonical);
                    }
                }
                None => outcome.missing.push(MissingInput {
                    resolved: base.join(&input.target),
                    document: document.clone(),
                    line: input.line,
                    target: input.target,
                }),
            }
        }
    }

    outcome.documents = documents;
    Ok(outcome)
}

/// Documents under `chapters_dir` that no scanned `\input{}` references.
/// The main document is the root of the include chain, so it is never an
/// orphan even when the chapters directory contains it.
pub fn orphans(
    outcome: &CheckOutcome,
    chapters_dir: &Utf8Path,
    main_file: &Utf8Path,
) -> Vec<Utf8PathBuf> {
    let Some(chapters) = canonical(chapters_dir) else {
        return Vec::new();
    };
    let main = canonical(main_file);

    outcome
        .documents
        .iter()
        .filter(|document| {
            canonical(document)
                .map(|path| {
                    path.starts_with(&chapters)
                        && main.as_ref() != Some(&path)
                        && !outcome.satisfied.contains(&path)
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Resolve `target` against `base`. LaTeX appends `.tex` to extensionless
/// `\input` arguments, so those get a second probe.
fn resolve(base: &Utf8Path, target: &str) -> Option<Utf8PathBuf> {
    let direct = base.join(target);
    if direct.exists() {
        return Some(direct);
    }
    if direct.extension().is_none() {
        let with_tex = Utf8PathBuf::from(format!("{}.tex", direct));
        if with_tex.exists() {
            return Some(with_tex);
        }
    }
    None
}

fn canonical(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let resolved = path.canonicalize().ok()?;
    Utf8PathBuf::from_path_buf(resolved).ok()
}
