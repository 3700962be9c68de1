use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Directories below `root` whose subtrees contain no files at all, listed
/// descendants-first so a later deletion pass can use plain `remove_dir`.
///
/// "A file" is any entry that is not itself a directory: regular files,
/// symlinks and device nodes all count as content, hidden ones included.
/// A directory is therefore empty iff every entry is an empty directory.
/// The root itself is never a candidate.
pub fn find_empty_dirs(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut empty = Vec::new();
    classify(root, &mut empty, true)?;
    Ok(empty)
}

// Post-order recursion: a directory's verdict needs every child's verdict
// first, which is also what puts descendants ahead of their parents in
// `empty`.
fn classify(dir: &Utf8Path, empty: &mut Vec<Utf8PathBuf>, is_root: bool) -> Result<bool> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(err) if !is_root => {
            // Cannot verify the subtree, so never classify it deletable.
            tracing::warn!("cannot read {}: {}; leaving it alone", dir, err);
            return Ok(false);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading directory {}", dir));
        }
    };

    let mut all_empty = true;

    // Sorted so two runs over an untouched tree report in the same order.
    let mut entries = Vec::new();
    for entry in reader {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                tracing::warn!("cannot list an entry of {}: {}", dir, err);
                all_empty = false;
            }
        }
    }
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(err) => {
                tracing::warn!("cannot stat {}: {}", entry.path().display(), err);
                all_empty = false;
                continue;
            }
        };

        if !is_dir {
            all_empty = false;
            continue;
        }

        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => {
                if classify(&path, empty, false)? {
                    empty.push(path);
                } else {
                    all_empty = false;
                }
            }
            Err(path) => {
                tracing::warn!("skipping non-UTF-8 path {}", path.display());
                all_empty = false;
            }
        }
    }

    Ok(all_empty)
}
