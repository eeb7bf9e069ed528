//! Lazy depth-first traversal

use crate::node::Branch;
use crate::path::TreePath;
use im::vector::Iter;
use im::Vector;

/// Depth-first, pre-order iterator over every node of a forest
///
/// Holds one child iterator per open level, so memory is bounded by tree
/// depth. Calling [`traverse`] again on the same forest restarts the walk.
pub struct Traverse<'a, N: Clone> {
    stack: Vec<Iter<'a, N>>,
}

impl<'a, N: Branch> Iterator for Traverse<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if let Some(children) = node.children() {
                        self.stack.push(children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Walk `forest` depth-first, yielding each node before its children
#[must_use]
pub fn traverse<N: Branch>(forest: &Vector<N>) -> Traverse<'_, N> {
    Traverse {
        stack: vec![forest.iter()],
    }
}

/// Like [`Traverse`], but also yields the path of each node
pub struct TraverseWithPaths<'a, N: Clone> {
    stack: Vec<(TreePath, usize, Iter<'a, N>)>,
}

impl<'a, N: Branch> Iterator for TraverseWithPaths<'a, N> {
    type Item = (TreePath, &'a N);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (parent, position, iter) = self.stack.last_mut()?;
            let Some(node) = iter.next() else {
                self.stack.pop();
                continue;
            };
            let path = parent.child(*position);
            *position += 1;
            if let Some(children) = node.children() {
                self.stack.push((path.clone(), 0, children.iter()));
            }
            return Some((path, node));
        }
    }
}

/// Walk `forest` depth-first, yielding `(path, node)` pairs
#[must_use]
pub fn traverse_with_paths<N: Branch>(forest: &Vector<N>) -> TraverseWithPaths<'_, N> {
    TraverseWithPaths {
        stack: vec![(TreePath::root(), 0, forest.iter())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::vector;

    #[derive(Debug, Clone, PartialEq)]
    enum Shape {
        Dot(u32),
        Group(Vector<Shape>),
    }

    impl Branch for Shape {
        fn children(&self) -> Option<&Vector<Self>> {
            match self {
                Self::Group(items) => Some(items),
                Self::Dot(_) => None,
            }
        }

        fn children_mut(&mut self) -> Option<&mut Vector<Self>> {
            match self {
                Self::Group(items) => Some(items),
                Self::Dot(_) => None,
            }
        }
    }

    fn sample() -> Vector<Shape> {
        vector![
            Shape::Dot(1),
            Shape::Group(vector![Shape::Dot(2), Shape::Group(vector![Shape::Dot(3)])]),
            Shape::Dot(4),
        ]
    }

    fn dots<'a>(iter: impl Iterator<Item = &'a Shape>) -> Vec<u32> {
        iter.filter_map(|s| match s {
            Shape::Dot(n) => Some(*n),
            Shape::Group(_) => None,
        })
        .collect()
    }

    #[test]
    fn pre_order() {
        let forest = sample();
        assert_eq!(traverse(&forest).count(), 6);
        assert_eq!(dots(traverse(&forest)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn restartable() {
        let forest = sample();
        let first: Vec<_> = traverse(&forest).collect();
        let second: Vec<_> = traverse(&forest).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_forest() {
        let forest: Vector<Shape> = Vector::new();
        assert_eq!(traverse(&forest).next(), None);
    }

    #[test]
    fn paths_follow_positions() {
        let forest = sample();
        let paths: Vec<String> = traverse_with_paths(&forest)
            .map(|(path, _)| path.serialize())
            .collect();
        assert_eq!(
            paths,
            vec![
                "[[0,0]]",
                "[[0,1]]",
                "[[0,1],[1,0]]",
                "[[0,1],[1,1]]",
                "[[0,1],[1,1],[2,0]]",
                "[[0,2]]",
            ]
        );
    }

    #[test]
    fn yielded_paths_resolve_to_the_same_node() {
        let forest = sample();
        for (path, node) in traverse_with_paths(&forest) {
            assert_eq!(crate::node::node_at(&forest, &path).unwrap(), node);
        }
    }
}
