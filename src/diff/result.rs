//! Diff result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// DiffKind classifies the change at one property path.
///
/// The `*Replace` variants are recorded when the path lies under an immutable
/// field: the change can only be satisfied by recreating the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffKind {
    Add,
    AddReplace,
    Delete,
    DeleteReplace,
    Update,
    UpdateReplace,
}

impl DiffKind {
    /// Returns true for the `*Replace` variants.
    pub fn is_replace(self) -> bool {
        matches!(
            self,
            DiffKind::AddReplace | DiffKind::DeleteReplace | DiffKind::UpdateReplace
        )
    }

    /// Returns the `*Replace` variant of this kind.
    pub fn into_replace(self) -> Self {
        match self {
            DiffKind::Add | DiffKind::AddReplace => DiffKind::AddReplace,
            DiffKind::Delete | DiffKind::DeleteReplace => DiffKind::DeleteReplace,
            DiffKind::Update | DiffKind::UpdateReplace => DiffKind::UpdateReplace,
        }
    }

    /// Escalates to the `*Replace` variant iff `immutable`.
    pub fn escalate(self, immutable: bool) -> Self {
        if immutable {
            self.into_replace()
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiffKind::Add => "add",
            DiffKind::AddReplace => "add-replace",
            DiffKind::Delete => "delete",
            DiffKind::DeleteReplace => "delete-replace",
            DiffKind::Update => "update",
            DiffKind::UpdateReplace => "update-replace",
        }
    }

    fn symbol(self) -> char {
        match self {
            DiffKind::Add | DiffKind::AddReplace => '+',
            DiffKind::Delete | DiffKind::DeleteReplace => '-',
            DiffKind::Update | DiffKind::UpdateReplace => '~',
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PropertyDiff is the classification recorded for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDiff {
    pub kind: DiffKind,
    /// Always true: diffs are computed between input arguments.
    #[serde(rename = "inputDiff")]
    pub input_diff: bool,
}

impl PropertyDiff {
    /// Creates a diff between input arguments.
    pub fn input(kind: DiffKind) -> Self {
        PropertyDiff {
            kind,
            input_diff: true,
        }
    }
}

/// DiffResult maps canonical property paths to their classification.
///
/// Paths that did not change are absent. Keys are iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffResult {
    diffs: BTreeMap<String, PropertyDiff>,
}

impl DiffResult {
    /// Creates a new empty DiffResult.
    pub fn new() -> Self {
        DiffResult::default()
    }

    /// Records `diff` at `path`, replacing any earlier entry.
    pub fn insert(&mut self, path: impl Into<String>, diff: PropertyDiff) {
        self.diffs.insert(path.into(), diff);
    }

    pub fn get(&self, path: &str) -> Option<&PropertyDiff> {
        self.diffs.get(path)
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyDiff)> {
        self.diffs.iter()
    }

    /// Returns true if any path changed.
    pub fn has_changes(&self) -> bool {
        !self.diffs.is_empty()
    }

    /// Returns true if any change requires the resource to be replaced.
    pub fn requires_replace(&self) -> bool {
        self.diffs.values().any(|d| d.kind.is_replace())
    }

    /// Returns the paths whose change requires replacement, in sorted order.
    pub fn replaces(&self) -> Vec<String> {
        self.diffs
            .iter()
            .filter(|(_, d)| d.kind.is_replace())
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl IntoIterator for DiffResult {
    type Item = (String, PropertyDiff);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropertyDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.diffs.into_iter()
    }
}

impl FromIterator<(String, PropertyDiff)> for DiffResult {
    fn from_iter<I: IntoIterator<Item = (String, PropertyDiff)>>(iter: I) -> Self {
        DiffResult {
            diffs: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diffs.is_empty() {
            return write!(f, "no changes");
        }
        let mut first = true;
        for (path, diff) in &self.diffs {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let path = if path.is_empty() { "<root>" } else { path };
            write!(f, "{} {} ({})", diff.kind.symbol(), path, diff.kind)?;
        }
        Ok(())
    }
}
