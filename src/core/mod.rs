//! Core modules for tddcov's coverage gate.
//!
//! Leaves first: the identifier grammar, the document parsers and artifact
//! scanners built on it, configuration, and the gate that joins them.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod grammar;
pub mod manifest;
pub mod output;
pub mod registry;
pub mod validate;
