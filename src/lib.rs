//! tddcov: coverage mapping gate for TDD scaffolding.
//!
//! **tddcov checks that a test plan and its generated artifacts agree.**
//!
//! A TDD workflow produces a manifest of test cases, an invariants registry,
//! a risk matrix, behavior-tree (BTT) files and test stubs. tddcov joins them
//! on TEST-ID and fails when any link is missing or dangling.
//!
//! # Checks
//!
//! - All TEST-IDs in `TEST_MANIFEST.md` headings are well-formed
//! - Each TEST-ID appears in at least one `*.tree` file
//! - Each TEST-ID is declared by a stub via `TEST-ID: <id>`
//! - Referenced invariants exist in `invariants.md`
//! - Referenced risks exist in `risk-matrix.md` and map back to the test
//! - No orphan TEST-IDs exist in trees or stubs
//!
//! # Examples
//!
//! ```bash
//! # Documents under one directory
//! tddcov --root . --spec-docs-dir docs/spec --btt test/btt --tests test
//!
//! # Explicit documents, JSON output
//! tddcov --manifest plan/TEST_MANIFEST.md --invariants plan/invariants.md \
//!        --risk-matrix plan/risk-matrix.md --btt trees --tests src --format json
//! ```
//!
//! Any flag can also live in `<root>/tddcov.toml`; flags win over the file.
//!
//! # Crate Structure
//!
//! - [`core`]: identifier grammar, parsers, scanners, configuration and the gate

pub mod core;

use crate::core::{
    config::{self, ResolvedConfig, Settings},
    error::CoverageError,
    output, validate,
};

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "tddcov",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate TEST-ID coverage across manifest, invariants, risk matrix, BTT trees, and test stubs"
)]
pub struct Cli {
    /// Repo root; relative paths below resolve against it.
    #[clap(long, default_value = ".")]
    root: PathBuf,
    /// Config file (defaults to `<root>/tddcov.toml` when present).
    #[clap(long)]
    config: Option<PathBuf>,
    /// Directory holding TEST_MANIFEST.md, invariants.md and risk-matrix.md.
    #[clap(long)]
    spec_docs_dir: Option<PathBuf>,
    /// Path to TEST_MANIFEST.md.
    #[clap(long)]
    manifest: Option<PathBuf>,
    /// Path to invariants.md.
    #[clap(long)]
    invariants: Option<PathBuf>,
    /// Path to risk-matrix.md.
    #[clap(long)]
    risk_matrix: Option<PathBuf>,
    /// BTT tree directory.
    #[clap(long)]
    btt: Option<PathBuf>,
    /// Tests root directory.
    #[clap(long)]
    tests: Option<PathBuf>,
    /// Extension of BTT tree files.
    #[clap(long)]
    tree_ext: Option<String>,
    /// Extension of test stub files.
    #[clap(long)]
    stub_ext: Option<String>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            spec_docs_dir: self.spec_docs_dir.clone(),
            manifest: self.manifest.clone(),
            invariants: self.invariants.clone(),
            risk_matrix: self.risk_matrix.clone(),
            btt: self.btt.clone(),
            tests: self.tests.clone(),
            tree_extension: self.tree_ext.clone(),
            stub_extension: self.stub_ext.clone(),
            ..Settings::default()
        }
    }

    fn json(&self) -> bool {
        self.format == "json"
    }
}

/// Resolve every input location once, failing before any document is parsed.
fn configure(cli: &Cli) -> Result<ResolvedConfig, CoverageError> {
    let root = config::resolve_root(&cli.root);
    let file = config::load_settings_file(&root, cli.config.as_deref())?;
    let resolved = config::resolve(&root, file.overlay(cli.settings()))?;
    config::check_paths_exist(&resolved.paths)?;
    Ok(resolved)
}

fn print_config_failure(cli: &Cli, messages: &[String]) {
    if cli.json() {
        println!("{:#}", output::render_config_error_json(messages));
    } else {
        print!("{}", output::render_failure(messages));
    }
}

pub fn run() -> Result<(), CoverageError> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<(), CoverageError> {
    let resolved = match configure(&cli) {
        Ok(resolved) => resolved,
        Err(CoverageError::ConfigError(messages)) => {
            print_config_failure(&cli, &messages);
            return Err(CoverageError::ConfigError(messages));
        }
        Err(CoverageError::ConfigParse(message)) => {
            print_config_failure(&cli, std::slice::from_ref(&message));
            return Err(CoverageError::ConfigParse(message));
        }
        Err(other) => return Err(other),
    };

    let report = validate::run_validation(&resolved)?;

    if cli.json() {
        println!("{:#}", output::render_json(&report, &resolved.paths));
    } else {
        print!("{}", output::render_text(&report));
    }

    if report.passed() {
        Ok(())
    } else {
        Err(CoverageError::ValidationError(report.errors.len()))
    }
}
