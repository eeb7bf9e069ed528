//! Generic path-addressed tree operations
//!
//! Provides the [`Branch`] trait and the structural operations shared by the
//! component tree and the property tree: lookup and copy-on-write mutation
//! by [`TreePath`].

use crate::path::TreePath;
use im::Vector;

/// A node that may own an ordered sequence of children
///
/// Implemented by each tree flavour. The two flavours differ only in where
/// their children live and which nodes count as leaves; every algorithm in
/// this crate is written once against this trait.
pub trait Branch: Clone {
    /// Child sequence, if this node can hold children
    fn children(&self) -> Option<&Vector<Self>>;

    /// Mutable child sequence, if this node can hold children
    fn children_mut(&mut self) -> Option<&mut Vector<Self>>;

    /// Whether the node has no children to descend into
    #[inline]
    fn is_leaf(&self) -> bool {
        self.children().map_or(true, Vector::is_empty)
    }
}

/// Resolve the node at `path`
///
/// Consumes one step per depth, descending into the children of the node
/// chosen at the previous depth.
///
/// # Errors
/// Returns [`TreeError::PathNotFound`] if any index is out of range, if a
/// step descends into a node without children, or if `path` is empty.
pub fn node_at<'a, N: Branch>(root: &'a Vector<N>, path: &TreePath) -> Result<&'a N, TreeError> {
    let (last, init) = path
        .steps()
        .split_last()
        .ok_or_else(|| TreeError::path_not_found(path))?;

    let mut level = root;
    for step in init {
        level = level
            .get(step.index)
            .and_then(N::children)
            .ok_or_else(|| TreeError::path_not_found(path))?;
    }
    level
        .get(last.index)
        .ok_or_else(|| TreeError::path_not_found(path))
}

/// Apply `updater` to the node at `path`, returning a new root
///
/// The original `root` is never modified. Every node on the root-to-target
/// spine is freshly allocated in the result; everything off the spine is
/// shared with `root`.
///
/// # Errors
/// Returns [`TreeError::PathNotFound`] (converted into `E`) if the path does
/// not resolve, or whatever error `updater` returns.
pub fn mutate_at<N, E, F>(root: &Vector<N>, path: &TreePath, updater: F) -> Result<Vector<N>, E>
where
    N: Branch,
    E: From<TreeError>,
    F: FnOnce(&mut N) -> Result<(), E>,
{
    let mut next = root.clone();
    let node = node_at_mut(&mut next, path.steps(), path)?;
    updater(node)?;
    Ok(next)
}

fn node_at_mut<'a, N: Branch>(
    level: &'a mut Vector<N>,
    steps: &[crate::path::Step],
    path: &TreePath,
) -> Result<&'a mut N, TreeError> {
    let (first, rest) = steps
        .split_first()
        .ok_or_else(|| TreeError::path_not_found(path))?;
    let node = level
        .get_mut(first.index)
        .ok_or_else(|| TreeError::path_not_found(path))?;
    if rest.is_empty() {
        return Ok(node);
    }
    let children = node
        .children_mut()
        .ok_or_else(|| TreeError::path_not_found(path))?;
    node_at_mut(children, rest, path)
}

/// Visit every node of `forest` mutably, depth-first pre-order
///
/// `Vector::iter_mut` unshares every chunk it walks, so the whole forest is
/// copied from any snapshot it shared with. Snapshots taken before the call
/// are unaffected.
pub fn for_each_mut<N: Branch>(forest: &mut Vector<N>, visit: &mut impl FnMut(&mut N)) {
    for node in forest.iter_mut() {
        visit(node);
        if let Some(children) = node.children_mut() {
            for_each_mut(children, &mut *visit);
        }
    }
}

/// Errors from path-addressed tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Path does not address a node in this snapshot
    #[error("no node at path {path}")]
    PathNotFound { path: String },

    /// Target cannot hold children
    #[error("node at {path} cannot hold children")]
    NotAGroup { path: String },

    /// Target has no expand flag
    #[error("node at {path} cannot be expanded")]
    NotExpandable { path: String },

    /// Target has no scalar value half
    #[error("node at {path} has no scalar value")]
    NoScalarValue { path: String },
}

impl TreeError {
    /// Create a not-found error for `path`
    #[inline]
    #[must_use]
    pub fn path_not_found(path: &TreePath) -> Self {
        Self::PathNotFound {
            path: path.serialize(),
        }
    }

    /// Check if the error comes from a stale or invalid path
    #[inline]
    #[must_use]
    pub fn is_stale_path(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }
}
