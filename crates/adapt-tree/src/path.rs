//! Positional paths for addressing nodes within nested trees
//!
//! Provides [`TreePath`], an ordered sequence of `[level, index]` pairs.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One branch point of a [`TreePath`]
///
/// `level` is the zero-based depth and `index` the position of the chosen
/// child at that depth. Serialized as a two-element array `[level, index]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Step {
    /// Depth of the branch point
    pub level: usize,
    /// Child position at that depth
    pub index: usize,
}

impl From<(usize, usize)> for Step {
    fn from((level, index): (usize, usize)) -> Self {
        Self { level, index }
    }
}

impl From<Step> for (usize, usize) {
    fn from(step: Step) -> Self {
        (step.level, step.index)
    }
}

/// Position of a node within one tree snapshot
///
/// Paths are positional, not identity based: after any structural edit the
/// same path may address a different node. Never hold a path across an edit.
///
/// # Examples
/// - `[]` → the root sequence itself
/// - `[[0,1]]` → second node at the root
/// - `[[0,1],[1,0]]` → first child of the second root node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath(Vec<Step>);

impl TreePath {
    /// Empty path (the root sequence)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from child indices, one per depth
    #[must_use]
    pub fn from_indices(indices: &[usize]) -> Self {
        Self(
            indices
                .iter()
                .enumerate()
                .map(|(level, &index)| Step { level, index })
                .collect(),
        )
    }

    /// Build a path from raw steps
    ///
    /// # Errors
    /// Returns error if the step levels are not `0, 1, 2, ...`
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, PathError> {
        for (position, step) in steps.iter().enumerate() {
            if step.level != position {
                return Err(PathError::LevelMismatch {
                    position,
                    level: step.level,
                });
            }
        }
        Ok(Self(steps))
    }

    /// Path with one more step appended, at the next level down
    #[inline]
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let level = self.0.last().map_or(0, |step| step.level + 1);
        let mut next = self.clone();
        next.0.push(Step { level, index });
        next
    }

    /// Steps from root to leaf
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Child indices from root to leaf
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|step| step.index)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent path (if not root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Last step (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<Step> {
        self.0.last().copied()
    }

    /// Check if this path is a prefix of another
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Canonical string key, e.g. `[[0,1],[1,0]]`
    ///
    /// Equal paths always serialize identically. Use it as a display or
    /// reconciliation key only, never as a stored identity.
    #[must_use]
    pub fn serialize(&self) -> String {
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|step| format!("[{},{}]", step.level, step.index))
            .collect();
        format!("[{}]", pairs.join(","))
    }
}

impl Display for TreePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for TreePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps: Vec<Step> =
            serde_json::from_str(s).map_err(|e| PathError::Malformed(e.to_string()))?;
        Self::from_steps(steps)
    }
}

/// Errors related to tree paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Not a JSON sequence of `[level, index]` pairs
    #[error("malformed path: {0}")]
    Malformed(String),

    /// Step level does not match its depth
    #[error("step {position} has level {level}")]
    LevelMismatch { position: usize, level: usize },
}
