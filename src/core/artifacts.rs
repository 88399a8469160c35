//! Generated artifact scanning: BTT tree files and test stubs.

use crate::core::error::CoverageError;
use crate::core::grammar::{self, TEST_ID, TEST_ID_MARKER};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Regular files under `root` whose extension is `extension`, sorted by path.
pub fn walk_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, CoverageError> {
    fn recurse(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) -> Result<(), CoverageError> {
        if !dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            // Symlinked directories are not descended into; symlinked files still count.
            if entry.file_type()?.is_dir() {
                recurse(&path, ext, out)?;
            } else if path.is_file() && path.extension().is_some_and(|e| e == ext) {
                out.push(path);
            }
        }
        Ok(())
    }

    let ext = extension.trim_start_matches('.');
    let mut out = Vec::new();
    recurse(root, ext, &mut out)?;
    out.sort();
    Ok(out)
}

/// `(path, text)` for every matching file under `root`.
pub fn read_artifacts(
    root: &Path,
    extension: &str,
) -> Result<Vec<(PathBuf, String)>, CoverageError> {
    walk_files(root, extension)?
        .into_iter()
        .map(|path| match fs::read_to_string(&path) {
            Ok(text) => Ok((path, text)),
            Err(source) => Err(CoverageError::ArtifactRead { path, source }),
        })
        .collect()
}

/// Test ids seen by one scanner, plus how many files it read.
#[derive(Debug, Clone, Default)]
pub struct ArtifactScan {
    pub ids: BTreeSet<String>,
    pub files: usize,
}

/// Any test id mentioned anywhere in a tree file counts.
pub fn scan_btt_trees(tree_dir: &Path, extension: &str) -> Result<ArtifactScan, CoverageError> {
    let artifacts = read_artifacts(tree_dir, extension)?;
    let ids = artifacts
        .iter()
        .flat_map(|(_, text)| grammar::tokens(&TEST_ID, text))
        .map(str::to_string)
        .collect();
    Ok(ArtifactScan {
        ids,
        files: artifacts.len(),
    })
}

/// Only ids declared via `TEST-ID: <id>` count; a bare mention is not coverage.
pub fn scan_test_stubs(tests_dir: &Path, extension: &str) -> Result<ArtifactScan, CoverageError> {
    let artifacts = read_artifacts(tests_dir, extension)?;
    let mut ids = BTreeSet::new();
    for (_, text) in &artifacts {
        for caps in TEST_ID_MARKER.captures_iter(text) {
            ids.insert(caps[1].to_string());
        }
    }
    Ok(ArtifactScan {
        ids,
        files: artifacts.len(),
    })
}
