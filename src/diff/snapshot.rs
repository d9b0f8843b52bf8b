//! Diffing of successive JSON snapshots.

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde_json::Value;
use std::fmt;

use super::error::{DiffError, DiffResult};
use super::lines::{diff_lines, render};

/// Pretty-print a JSON value with two-space indentation, keeping key order and
/// number text exactly as received.
pub fn pretty(value: &Value) -> DiffResult<String> {
    serde_json::to_string_pretty(value).map_err(DiffError::Render)
}

/// Remembers the previous snapshot and renders a unified-style block for each
/// new one.
#[derive(Debug, Default)]
pub struct SnapshotDiffer {
    prev: String,
    prev_stamp: Option<String>,
    prev_lines: usize,
}

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `value` against the previous snapshot and make it the new baseline.
    ///
    /// The first snapshot is diffed against empty text.
    pub fn push<Tz>(&mut self, value: &Value, now: &DateTime<Tz>) -> DiffResult<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let next = pretty(value)?;
        let next_lines = next.matches('\n').count();
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let patch = render(&diff_lines(&self.prev, &next));
        let block = format!(
            "--- old {}\n+++ new {}\n@@ 0,{} +0,{} @@\n{}\n\n",
            self.prev_stamp.as_deref().unwrap_or("(none)"),
            stamp,
            self.prev_lines,
            next_lines,
            patch
        );

        self.prev = next;
        self.prev_stamp = Some(stamp);
        self.prev_lines = next_lines;
        Ok(block)
    }

    /// Number of newlines in the current baseline.
    pub fn baseline_lines(&self) -> usize {
        self.prev_lines
    }
}
