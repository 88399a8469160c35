//! Coverage consistency gate.
//!
//! Joins the manifest against the invariant registry, the risk matrix, the
//! BTT trees and the test stubs, and reports every disagreement. Checks never
//! short-circuit: one run surfaces the complete set of problems.
//!
//! # Checks, in report order
//!
//! - Manifest has at least one `####` test heading
//! - Heading tokens are well-formed TEST-IDs (one aggregated message)
//! - Per valid test, in manifest order:
//!   - present in BTT trees
//!   - declared by a test stub via `TEST-ID:`
//!   - each referenced invariant is defined
//!   - each referenced risk is defined and maps back to the test
//! - Orphans: tree ids, then stub ids, absent from the manifest
//!
//! Set `TDDCOV_TRACE=1` to log each stage to stderr.

use crate::core::artifacts::{self, ArtifactScan};
use crate::core::config::ResolvedConfig;
use crate::core::error::CoverageError;
use crate::core::manifest::{self, Manifest};
use crate::core::output;
use crate::core::registry::{self, RiskRegistry};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;

/// Everything the gate joins, already extracted from disk.
#[derive(Debug, Clone, Default)]
pub struct CoverageInputs {
    pub manifest: Manifest,
    pub invariants: BTreeSet<String>,
    pub risks: RiskRegistry,
    pub btt: ArtifactScan,
    pub stubs: ArtifactScan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub tests: usize,
    pub invalid_headings: usize,
    pub invariants: usize,
    pub risks: usize,
    pub btt_ids: usize,
    pub stub_ids: usize,
    pub btt_files: usize,
    pub stub_files: usize,
}

impl CoverageSummary {
    pub fn of(inputs: &CoverageInputs) -> Self {
        Self {
            tests: inputs.manifest.tests.len(),
            invalid_headings: inputs.manifest.invalid_ids().len(),
            invariants: inputs.invariants.len(),
            risks: inputs.risks.risks.len(),
            btt_ids: inputs.btt.ids.len(),
            stub_ids: inputs.stubs.ids.len(),
            btt_files: inputs.btt.files,
            stub_files: inputs.stubs.files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub summary: CoverageSummary,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

fn fail(errors: &mut Vec<String>, message: String) {
    errors.push(message);
}

fn trace_enabled() -> bool {
    std::env::var("TDDCOV_TRACE").ok().as_deref() == Some("1")
}

fn trace_gate(name: &str) {
    if trace_enabled() {
        eprintln!("tddcov: trace {}", name);
    }
}

fn validate_manifest_headings(manifest: &Manifest, errors: &mut Vec<String>) {
    if manifest.tests.is_empty() {
        fail(errors, "No TEST-IDs found in manifest headings.".to_string());
    }

    let invalid = manifest.invalid_ids();
    if !invalid.is_empty() {
        fail(
            errors,
            format!(
                "Invalid TEST-ID format in manifest headings: {}",
                invalid.join(", ")
            ),
        );
    }
}

fn validate_test_coverage(inputs: &CoverageInputs, errors: &mut Vec<String>) {
    for meta in inputs.manifest.tests.iter().filter(|t| !t.invalid) {
        let tid = meta.id.as_str();

        if !inputs.btt.ids.contains(tid) {
            fail(errors, format!("Missing TEST-ID in BTT trees: {}", tid));
        }
        if !inputs.stubs.ids.contains(tid) {
            fail(errors, format!("Missing TEST-ID in test stubs: {}", tid));
        }

        for inv in &meta.invariants {
            if !inputs.invariants.contains(inv) {
                fail(
                    errors,
                    format!("Invariant {} referenced by {} but not defined", inv, tid),
                );
            }
        }

        for risk in &meta.risks {
            if !inputs.risks.contains(risk) {
                fail(
                    errors,
                    format!("Risk {} referenced by {} but not defined", risk, tid),
                );
            } else if !inputs.risks.covers(risk, tid) {
                fail(
                    errors,
                    format!("Risk {} does not map to {} in risk matrix", risk, tid),
                );
            }
        }
    }
}

fn validate_orphans(inputs: &CoverageInputs, errors: &mut Vec<String>) {
    let declared = &inputs.manifest.all_ids;
    for tid in inputs.btt.ids.difference(declared) {
        fail(
            errors,
            format!("Orphan TEST-ID in BTT trees (not in manifest): {}", tid),
        );
    }
    for tid in inputs.stubs.ids.difference(declared) {
        fail(
            errors,
            format!("Orphan TEST-ID in stubs (not in manifest): {}", tid),
        );
    }
}

/// Every inconsistency between the inputs, in report order. Empty means pass.
pub fn evaluate(inputs: &CoverageInputs) -> Vec<String> {
    let mut errors = Vec::new();
    validate_manifest_headings(&inputs.manifest, &mut errors);
    validate_test_coverage(inputs, &mut errors);
    validate_orphans(inputs, &mut errors);
    errors
}

/// Read each input once and extract the identifier structures.
pub fn load_inputs(config: &ResolvedConfig) -> Result<CoverageInputs, CoverageError> {
    let paths = &config.paths;

    trace_gate("parse_manifest");
    let manifest = manifest::parse_manifest(&fs::read_to_string(&paths.manifest)?);
    trace_gate("parse_invariants");
    let invariants = registry::parse_invariants(&fs::read_to_string(&paths.invariants)?);
    trace_gate("parse_risk_matrix");
    let risks = registry::parse_risk_matrix(&fs::read_to_string(&paths.risk_matrix)?);
    trace_gate("scan_btt_trees");
    let btt = artifacts::scan_btt_trees(&paths.btt_dir, &config.tree_extension)?;
    trace_gate("scan_test_stubs");
    let stubs = artifacts::scan_test_stubs(&paths.tests_dir, &config.stub_extension)?;

    Ok(CoverageInputs {
        manifest,
        invariants,
        risks,
        btt,
        stubs,
    })
}

pub fn run_validation(config: &ResolvedConfig) -> Result<ValidationReport, CoverageError> {
    let inputs = load_inputs(config)?;
    trace_gate("evaluate");
    let errors = evaluate(&inputs);
    let summary = CoverageSummary::of(&inputs);

    if trace_enabled() {
        eprintln!(
            "tddcov: summary tests={} invalid={} btt_files={} stub_files={} errors={}",
            summary.tests,
            summary.invalid_headings,
            summary.btt_files,
            summary.stub_files,
            errors.len()
        );
        if !errors.is_empty() {
            eprintln!(
                "tddcov: failures {}: {}",
                errors.len(),
                output::preview_messages(&errors, 2, 110)
            );
        }
    }

    Ok(ValidationReport { errors, summary })
}
