//! Input location resolution.
//!
//! Settings come from three layers, highest precedence first: CLI flags, an
//! optional `tddcov.toml` under the root, and built-in defaults. They are
//! folded once into a [`ResolvedConfig`]; nothing is re-resolved later.

use crate::core::error::CoverageError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "tddcov.toml";
pub const DEFAULT_MANIFEST_NAME: &str = "TEST_MANIFEST.md";
pub const DEFAULT_INVARIANTS_NAME: &str = "invariants.md";
pub const DEFAULT_RISK_MATRIX_NAME: &str = "risk-matrix.md";
pub const DEFAULT_TREE_EXTENSION: &str = "tree";
pub const DEFAULT_STUB_EXTENSION: &str = "cairo";

/// One settings layer. Every key is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub spec_docs_dir: Option<PathBuf>,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub invariants: Option<PathBuf>,
    #[serde(default)]
    pub risk_matrix: Option<PathBuf>,
    #[serde(default)]
    pub btt: Option<PathBuf>,
    #[serde(default)]
    pub tests: Option<PathBuf>,
    #[serde(default)]
    pub tree_extension: Option<String>,
    #[serde(default)]
    pub stub_extension: Option<String>,
    #[serde(default)]
    pub manifest_name: Option<String>,
    #[serde(default)]
    pub invariants_name: Option<String>,
    #[serde(default)]
    pub risk_matrix_name: Option<String>,
}

impl Settings {
    /// Fields set in `over` win; unset ones fall back to `self`.
    pub fn overlay(self, over: Settings) -> Settings {
        Settings {
            spec_docs_dir: over.spec_docs_dir.or(self.spec_docs_dir),
            manifest: over.manifest.or(self.manifest),
            invariants: over.invariants.or(self.invariants),
            risk_matrix: over.risk_matrix.or(self.risk_matrix),
            btt: over.btt.or(self.btt),
            tests: over.tests.or(self.tests),
            tree_extension: over.tree_extension.or(self.tree_extension),
            stub_extension: over.stub_extension.or(self.stub_extension),
            manifest_name: over.manifest_name.or(self.manifest_name),
            invariants_name: over.invariants_name.or(self.invariants_name),
            risk_matrix_name: over.risk_matrix_name.or(self.risk_matrix_name),
        }
    }
}

/// The five input locations, absolute or root-joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub manifest: PathBuf,
    pub invariants: PathBuf,
    pub risk_matrix: PathBuf,
    pub btt_dir: PathBuf,
    pub tests_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub paths: ResolvedPaths,
    pub tree_extension: String,
    pub stub_extension: String,
}

pub fn resolve_root(root: &Path) -> PathBuf {
    fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

/// Load `explicit` (must exist) or `<root>/tddcov.toml` (optional).
pub fn load_settings_file(root: &Path, explicit: Option<&Path>) -> Result<Settings, CoverageError> {
    let config_path = match explicit {
        Some(p) => {
            let path = root.join(p);
            if !path.is_file() {
                return Err(CoverageError::ConfigError(vec![format!(
                    "Missing config file: {}",
                    path.display()
                )]));
            }
            path
        }
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if !path.is_file() {
                return Ok(Settings::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&config_path)?;
    toml::from_str(&content)
        .map_err(|e| CoverageError::ConfigParse(format!("{}: {}", config_path.display(), e)))
}

/// Apply the spec-docs-dir vs explicit-paths rule and anchor everything at `root`.
pub fn resolve(root: &Path, settings: Settings) -> Result<ResolvedConfig, CoverageError> {
    let (manifest, invariants, risk_matrix) = match &settings.spec_docs_dir {
        Some(dir) => {
            let dir = root.join(dir);
            let manifest_name = settings.manifest_name.as_deref();
            let invariants_name = settings.invariants_name.as_deref();
            let risk_matrix_name = settings.risk_matrix_name.as_deref();
            (
                Some(dir.join(manifest_name.unwrap_or(DEFAULT_MANIFEST_NAME))),
                Some(dir.join(invariants_name.unwrap_or(DEFAULT_INVARIANTS_NAME))),
                Some(dir.join(risk_matrix_name.unwrap_or(DEFAULT_RISK_MATRIX_NAME))),
            )
        }
        None => (
            settings.manifest.clone(),
            settings.invariants.clone(),
            settings.risk_matrix.clone(),
        ),
    };

    let mut errors = Vec::new();
    if manifest.is_none() || invariants.is_none() || risk_matrix.is_none() {
        errors.push(
            "Missing spec-docs paths. Provide --spec-docs-dir or explicit \
             --manifest/--invariants/--risk-matrix."
                .to_string(),
        );
    }
    if settings.btt.is_none() {
        errors.push("Missing BTT dir. Provide --btt.".to_string());
    }
    if settings.tests.is_none() {
        errors.push("Missing tests dir. Provide --tests.".to_string());
    }

    match (manifest, invariants, risk_matrix, settings.btt, settings.tests) {
        (Some(manifest), Some(invariants), Some(risk_matrix), Some(btt), Some(tests)) => {
            Ok(ResolvedConfig {
                paths: ResolvedPaths {
                    manifest: root.join(manifest),
                    invariants: root.join(invariants),
                    risk_matrix: root.join(risk_matrix),
                    btt_dir: root.join(btt),
                    tests_dir: root.join(tests),
                },
                tree_extension: settings
                    .tree_extension
                    .unwrap_or_else(|| DEFAULT_TREE_EXTENSION.to_string()),
                stub_extension: settings
                    .stub_extension
                    .unwrap_or_else(|| DEFAULT_STUB_EXTENSION.to_string()),
            })
        }
        _ => Err(CoverageError::ConfigError(errors)),
    }
}

/// Every resolved location must exist before any parsing happens.
pub fn check_paths_exist(paths: &ResolvedPaths) -> Result<(), CoverageError> {
    let checks = [
        (&paths.manifest, "Missing manifest"),
        (&paths.invariants, "Missing invariants file"),
        (&paths.risk_matrix, "Missing risk matrix"),
        (&paths.btt_dir, "Missing BTT dir"),
        (&paths.tests_dir, "Missing tests dir"),
    ];
    let errors: Vec<String> = checks
        .iter()
        .filter(|(path, _)| !path.exists())
        .map(|(path, label)| format!("{}: {}", label, path.display()))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoverageError::ConfigError(errors))
    }
}
