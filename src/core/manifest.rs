//! TEST_MANIFEST parsing.
//!
//! The manifest is a markdown document with one `####` heading per test:
//!
//! ```text
//! #### TEST-AUTH-001: rejects expired session
//! Covers INV-1 and mitigates R-2.
//! ```
//!
//! Each heading opens a section. The heading token up to the first `:` is the
//! candidate test id; the section body is scanned for invariant and risk
//! references. Separately, every test-id-shaped token in the whole document
//! is collected so artifacts can be checked for orphans.

use crate::core::grammar::{self, INVARIANT_ID, RISK_ID, TEST_ID};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^####\s+").unwrap());

/// A `(header, body)` pair cut out of a sectioned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub header: &'a str,
    pub body: String,
}

/// Metadata declared for one manifest heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestMeta {
    pub id: String,
    pub invalid: bool,
    pub invariants: BTreeSet<String>,
    pub risks: BTreeSet<String>,
}

impl TestMeta {
    fn invalid(id: &str) -> Self {
        Self {
            id: id.to_string(),
            invalid: true,
            invariants: BTreeSet::new(),
            risks: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// One record per distinct heading token, in first-appearance order.
    pub tests: Vec<TestMeta>,
    /// Every test-id-shaped token anywhere in the manifest text.
    pub all_ids: BTreeSet<String>,
}

impl Manifest {
    pub fn get(&self, id: &str) -> Option<&TestMeta> {
        self.tests.iter().find(|t| t.id == id)
    }

    pub fn invalid_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .tests
            .iter()
            .filter(|t| t.invalid)
            .map(|t| t.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Later sections with the same token replace the earlier record in place.
    fn insert(&mut self, meta: TestMeta) {
        match self.tests.iter_mut().find(|t| t.id == meta.id) {
            Some(slot) => *slot = meta,
            None => self.tests.push(meta),
        }
    }
}

/// Split `text` at fourth-level headings. Text before the first heading is dropped.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    SECTION_HEADING
        .split(text)
        .skip(1)
        .filter_map(|chunk| {
            let mut lines = split_lines(chunk).into_iter();
            let header = lines.next()?.trim();
            let body = lines.collect::<Vec<_>>().join("\n");
            Some(Section { header, body })
        })
        .collect()
}

/// Line breaks recognised when splitting a section: `\n`, `\r`, `\r\n`, vertical
/// tab, form feed, the file/group/record separators, NEL and the Unicode line and
/// paragraph separators. A trailing break does not produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some(&(j, '\n')) => {
                    chars.next();
                    j + 1
                }
                _ => i + 1,
            },
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => i + c.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..i]);
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Heading text up to the first `:`.
fn candidate_id(header: &str) -> &str {
    header.split(':').next().unwrap_or(header).trim()
}

pub fn parse_manifest(text: &str) -> Manifest {
    let mut manifest = Manifest::default();

    for section in split_sections(text) {
        let id = candidate_id(section.header);
        if !grammar::is_test_id(id) {
            manifest.insert(TestMeta::invalid(id));
            continue;
        }
        manifest.insert(TestMeta {
            id: id.to_string(),
            invalid: false,
            invariants: grammar::tokens(&INVARIANT_ID, &section.body)
                .map(str::to_string)
                .collect(),
            risks: grammar::tokens(&RISK_ID, &section.body)
                .map(str::to_string)
                .collect(),
        });
    }

    manifest.all_ids = grammar::tokens(&TEST_ID, text)
        .map(str::to_string)
        .collect();
    manifest
}
