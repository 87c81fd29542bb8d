//! End-to-end integration tests for logslice.
//!
//! These tests exercise the crates together:
//! - Alert resolution into windows and remote prefixes
//! - Window file selection against a local bucket mirror
//! - Classification and aggregation of plain and gzip logs
//! - Report files and archive manifests

#![cfg(test)]
