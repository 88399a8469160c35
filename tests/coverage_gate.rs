use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_tddcov(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tddcov"))
        .current_dir(dir)
        .args(args)
        .env_remove("TDDCOV_TRACE")
        .output()
        .expect("run tddcov")
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write fixture");
}

/// Repo with one fully consistent test, `TEST-AUTH-001` (scenario A).
fn setup_repo() -> TempDir {
    let tmp = TempDir::new().expect("tmpdir");
    let root = tmp.path();
    write(
        root,
        "docs/spec/TEST_MANIFEST.md",
        "# Test Manifest\n\n#### TEST-AUTH-001: rejects expired session\n- Invariants: INV-1\n- Risks: R-1\n",
    );
    write(root, "docs/spec/invariants.md", "# Invariants\n\n## INV-1: sessions expire\n");
    write(
        root,
        "docs/spec/risk-matrix.md",
        "| Risk | Scenario | Tests |\n|---|---|---|\n| R-1 | stale session reuse | TEST-AUTH-001 |\n",
    );
    write(
        root,
        "test/btt/auth.tree",
        "AuthTest\n└── when session expired\n    └── it should revert // TEST-AUTH-001\n",
    );
    write(
        root,
        "test/auth/test_auth.cairo",
        "// TEST-ID: TEST-AUTH-001\n#[test]\nfn test_rejects_expired_session() {}\n",
    );
    tmp
}

const ARGS: &[&str] = &["--spec-docs-dir", "docs/spec", "--btt", "test/btt", "--tests", "test"];

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn bullets(out: &Output) -> Vec<String> {
    stdout(out)
        .lines()
        .filter_map(|l| l.strip_prefix("- ").map(str::to_string))
        .collect()
}

#[test]
fn consistent_repo_passes() {
    let tmp = setup_repo();
    let out = run_tddcov(tmp.path(), ARGS);
    assert!(
        out.status.success(),
        "expected pass, got: {}",
        stdout(&out)
    );
    assert_eq!(stdout(&out), "Coverage validation passed.\n");
}

#[test]
fn stub_mention_without_marker_is_not_coverage() {
    let tmp = setup_repo();
    write(
        tmp.path(),
        "test/auth/test_auth.cairo",
        "// covers TEST-AUTH-001\n#[test]\nfn test_rejects_expired_session() {}\n",
    );

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.starts_with("Coverage validation failed:\n\n"));
    assert_eq!(
        bullets(&out),
        vec!["Missing TEST-ID in test stubs: TEST-AUTH-001"]
    );
}

#[test]
fn malformed_heading_is_one_aggregated_error() {
    let tmp = setup_repo();
    write(
        tmp.path(),
        "docs/spec/TEST_MANIFEST.md",
        "# Test Manifest\n\n#### BOGUS-001: malformed\n- Invariants: INV-404\n- Risks: R-404\n",
    );
    write(tmp.path(), "test/btt/auth.tree", "empty tree\n");
    write(tmp.path(), "test/auth/test_auth.cairo", "fn nothing() {}\n");

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        bullets(&out),
        vec!["Invalid TEST-ID format in manifest headings: BOGUS-001"]
    );
}

#[test]
fn undeclared_tree_id_is_an_orphan() {
    let tmp = setup_repo();
    write(tmp.path(), "test/btt/extra/legacy.tree", "Legacy\n└── TEST-AUTH-999\n");

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        bullets(&out),
        vec!["Orphan TEST-ID in BTT trees (not in manifest): TEST-AUTH-999"]
    );
}

#[test]
fn every_failure_is_reported_in_one_run() {
    let tmp = setup_repo();
    write(
        tmp.path(),
        "docs/spec/TEST_MANIFEST.md",
        "#### TEST-AUTH-001: login\nINV-1 INV-7 R-1 R-2\n\n#### TEST-PAY-001\nR-3\n\n#### nope\n",
    );
    write(tmp.path(), "docs/spec/risk-matrix.md", "R-1 -> TEST-AUTH-001\nR-3 -> (unmapped)\n");
    write(tmp.path(), "test/orphan.cairo", "// TEST-ID: TEST-GONE-001\n");

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        bullets(&out),
        vec![
            "Invalid TEST-ID format in manifest headings: nope",
            "Invariant INV-7 referenced by TEST-AUTH-001 but not defined",
            "Risk R-2 referenced by TEST-AUTH-001 but not defined",
            "Missing TEST-ID in BTT trees: TEST-PAY-001",
            "Missing TEST-ID in test stubs: TEST-PAY-001",
            "Risk R-3 does not map to TEST-PAY-001 in risk matrix",
            "Orphan TEST-ID in stubs (not in manifest): TEST-GONE-001",
        ]
    );
}

#[test]
fn manifest_without_headings_fails() {
    let tmp = setup_repo();
    write(
        tmp.path(),
        "docs/spec/TEST_MANIFEST.md",
        "# Test Manifest\n\nTEST-AUTH-001 is planned.\n",
    );

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(bullets(&out), vec!["No TEST-IDs found in manifest headings."]);
}

#[test]
fn repeated_runs_are_identical() {
    let tmp = setup_repo();
    write(tmp.path(), "test/btt/extra.tree", "TEST-B-002 TEST-A-001\n");
    let first = run_tddcov(tmp.path(), ARGS);
    let second = run_tddcov(tmp.path(), ARGS);
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(
        bullets(&first),
        vec![
            "Orphan TEST-ID in BTT trees (not in manifest): TEST-A-001",
            "Orphan TEST-ID in BTT trees (not in manifest): TEST-B-002",
        ]
    );
}

#[test]
fn json_format_reports_status_and_summary() {
    let tmp = setup_repo();
    let mut args = ARGS.to_vec();
    args.extend(["--format", "json"]);

    let out = run_tddcov(tmp.path(), &args);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json output");
    assert_eq!(value["status"], "passed");
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
    assert_eq!(value["summary"]["tests"], 1);
    assert_eq!(value["summary"]["btt_files"], 1);
    assert_eq!(value["summary"]["stub_files"], 1);
}

#[test]
fn trace_goes_to_stderr_only() {
    let tmp = setup_repo();
    let out = Command::new(env!("CARGO_BIN_EXE_tddcov"))
        .current_dir(tmp.path())
        .args(ARGS)
        .env("TDDCOV_TRACE", "1")
        .output()
        .expect("run tddcov");
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Coverage validation passed.\n");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("tddcov: trace parse_manifest"));
    assert!(stderr.contains("tddcov: trace scan_test_stubs"));
    assert!(stderr.contains("tddcov: summary tests=1"));
}

#[test]
fn undecodable_stub_fails_with_its_path() {
    let tmp = setup_repo();
    let bad = tmp.path().join("test/auth/broken.cairo");
    fs::write(&bad, [0xffu8, 0xfe]).expect("write fixture");

    let out = run_tddcov(tmp.path(), ARGS);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "got: {}", stdout(&out));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("broken.cairo"), "got: {stderr}");
    assert!(stderr.contains("Failed to read"), "got: {stderr}");
}
