//! Invariant and risk registries.
//!
//! Neither document has a schema. The invariants registry is a flat bag of
//! `INV-n` tokens. The risk matrix is a bag of `R-n` tokens where each risk
//! "covers" whatever test ids follow one of its mentions on the same line.
//!
//! That proximity rule is a heuristic. A mention of `R-1` also matches inside
//! `R-12`, so tests listed against `R-12` are attributed to `R-1` as well.
//! Existing matrices depend on this, so it is kept as is; an explicit
//! per-risk test list would remove the ambiguity.

use crate::core::grammar::{self, INVARIANT_ID, RISK_ID, TEST_ID};
use std::collections::{BTreeMap, BTreeSet};

pub fn parse_invariants(text: &str) -> BTreeSet<String> {
    grammar::tokens(&INVARIANT_ID, text)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct RiskRegistry {
    pub risks: BTreeSet<String>,
    pub coverage: BTreeMap<String, BTreeSet<String>>,
}

impl RiskRegistry {
    pub fn contains(&self, risk: &str) -> bool {
        self.risks.contains(risk)
    }

    pub fn covers(&self, risk: &str, test_id: &str) -> bool {
        self.coverage
            .get(risk)
            .is_some_and(|tests| tests.contains(test_id))
    }
}

/// Test ids on the rest of each line after the first mention of `risk`.
fn tests_following(text: &str, risk: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for line in text.split('\n') {
        if let Some(pos) = line.find(risk) {
            found.extend(grammar::tokens(&TEST_ID, &line[pos..]).map(str::to_string));
        }
    }
    found
}

pub fn parse_risk_matrix(text: &str) -> RiskRegistry {
    let risks: BTreeSet<String> = grammar::tokens(&RISK_ID, text)
        .map(str::to_string)
        .collect();
    let coverage = risks
        .iter()
        .map(|risk| (risk.clone(), tests_following(text, risk)))
        .collect();
    RiskRegistry { risks, coverage }
}
