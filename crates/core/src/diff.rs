// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Positional line diff between two task specifications.
//!
//! Lines are compared index by index; there is no re-alignment after an
//! insertion or deletion. Task specifications are short, ordered and change
//! almost exclusively in `image` values, so positional pairing is enough.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task_spec::TaskSpecification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Same,
    Removed,
    Added,
}

impl LineKind {
    pub fn sign(self) -> char {
        match self {
            LineKind::Same => ' ',
            LineKind::Removed => '-',
            LineKind::Added => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    pub text: String,
}

impl DiffLine {
    fn new(kind: LineKind, text: &str) -> Self {
        Self { kind, text: text.to_string() }
    }
}

/// Rendered diff, previous → candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub lines: Vec<DiffLine>,
}

impl Diff {
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.kind != LineKind::Same)
    }

    /// Differing `(removed, added)` pairs from the common prefix, plus
    /// unpaired trailing lines as `(Some, None)` / `(None, Some)`.
    pub fn changed_pairs(&self) -> Vec<(Option<&str>, Option<&str>)> {
        let mut pairs = Vec::new();
        let mut iter = self.lines.iter().peekable();
        while let Some(line) = iter.next() {
            match line.kind {
                LineKind::Same => {}
                LineKind::Removed => {
                    let added = iter.next_if(|next| next.kind == LineKind::Added);
                    pairs.push((Some(line.text.as_str()), added.map(|a| a.text.as_str())));
                }
                LineKind::Added => pairs.push((None, Some(line.text.as_str()))),
            }
        }
        pairs
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line.kind {
                LineKind::Same => writeln!(f, "{}", line.text)?,
                kind => writeln!(f, "{}{}", kind.sign(), line.text)?,
            }
        }
        Ok(())
    }
}

/// Positional diff of `candidate` against `previous`.
pub fn render(candidate: &str, previous: &str) -> Diff {
    let candidate: Vec<&str> = candidate.split('\n').collect();
    let previous: Vec<&str> = previous.split('\n').collect();
    let common = candidate.len().min(previous.len());

    let mut lines = Vec::with_capacity(candidate.len().max(previous.len()) + 1);
    for (cand, prev) in candidate.iter().zip(previous.iter()) {
        if cand == prev {
            lines.push(DiffLine::new(LineKind::Same, prev));
        } else {
            lines.push(DiffLine::new(LineKind::Removed, prev));
            lines.push(DiffLine::new(LineKind::Added, cand));
        }
    }

    if candidate.len() > common {
        lines.extend(candidate[common..].iter().map(|l| DiffLine::new(LineKind::Added, l)));
    } else {
        lines.extend(previous[common..].iter().map(|l| DiffLine::new(LineKind::Removed, l)));
    }

    Diff { lines }
}

/// Diff of the canonical text of two specifications.
pub fn render_specs(candidate: &TaskSpecification, previous: &TaskSpecification) -> Diff {
    render(&candidate.canonical_text(), &previous.canonical_text())
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
