use std::fmt::Write as _;

use crate::error::{AlignmentError, Result};

/// Index into the tree's node arena.
pub type NodeId = usize;

/// A node of the merge tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeNode {
    /// Index in the arena.
    pub id: NodeId,

    /// Parent node, `None` for the root.
    pub parent: Option<NodeId>,

    /// Children in merge order; empty for leaves.
    pub children: Vec<NodeId>,

    /// Sample label for leaves, cluster name for internal nodes.
    pub name: String,

    /// Clustering distance at which the children were joined.
    pub distance: Option<f64>,

    /// Position of the wrapped sample, leaves only.
    pub sample: Option<usize>,
}

impl MergeNode {
    /// True if the node wraps a sample.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed merge tree over samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeTree {
    nodes: Vec<MergeNode>,
    root: Option<NodeId>,
}

impl MergeTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf wrapping the sample at `sample`.
    pub fn add_leaf(&mut self, name: impl Into<String>, sample: usize) -> NodeId {
        self.push(MergeNode {
            id: self.nodes.len(),
            parent: None,
            children: Vec::new(),
            name: name.into(),
            distance: None,
            sample: Some(sample),
        })
    }

    /// Add an internal node joining `children` at `distance`.
    pub fn add_internal(
        &mut self,
        name: impl Into<String>,
        distance: f64,
        children: &[NodeId],
    ) -> NodeId {
        let id = self.push(MergeNode {
            id: self.nodes.len(),
            parent: None,
            children: children.to_vec(),
            name: name.into(),
            distance: Some(distance),
            sample: None,
        });
        for &child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(id);
            }
        }
        id
    }

    fn push(&mut self, node: MergeNode) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Mark `id` as the root.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Root node, `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&MergeNode> {
        self.nodes.get(id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[MergeNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Internal nodes in the order they were created, i.e. merge order.
    pub fn merges(&self) -> impl Iterator<Item = &MergeNode> {
        self.nodes.iter().filter(|n| !n.is_leaf())
    }

    /// Node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Sample positions below `id`, left to right.
    pub fn leaf_samples(&self, id: NodeId) -> Vec<usize> {
        let mut samples = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if let Some(sample) = node.sample {
                samples.push(sample);
            }
            stack.extend(node.children.iter().rev());
        }
        samples
    }

    /// Edges on the longest path from `id` down to a leaf.
    pub fn height(&self, id: NodeId) -> usize {
        self.heights().get(id).copied().unwrap_or(0)
    }

    /// Check that the nodes form one tree under the root.
    ///
    /// Every child must be created before its parent and belong to exactly one
    /// parent, and every node except the root must have a parent.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| Err(AlignmentError::MalformedTree(msg));
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                malformed("no root".to_string())
            };
        };
        if root >= self.nodes.len() {
            return malformed(format!("root {root} is not a node"));
        }

        let mut parent_of: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                if child >= node.id {
                    return malformed(format!(
                        "'{}' has child {child} that is not an earlier node",
                        node.name
                    ));
                }
                if let Some(first) = parent_of[child].replace(node.id) {
                    return malformed(format!(
                        "node {child} is a child of both {first} and {}",
                        node.id
                    ));
                }
            }
        }
        for node in &self.nodes {
            if node.id != root && parent_of[node.id].is_none() {
                return malformed(format!("'{}' is not under the root", node.name));
            }
        }
        if parent_of[root].is_some() {
            return malformed("root has a parent".to_string());
        }
        Ok(())
    }

    /// Height of every node, indexed by id.
    pub fn heights(&self) -> Vec<usize> {
        let mut heights = vec![0usize; self.nodes.len()];
        // children always precede their parent in the arena
        for node in &self.nodes {
            let height = node
                .children
                .iter()
                .filter_map(|&c| heights.get(c).map(|h| h + 1))
                .max()
                .unwrap_or(0);
            if let Some(slot) = heights.get_mut(node.id) {
                *slot = height;
            }
        }
        heights
    }

    /// Indented text rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            let _ = match node.distance {
                Some(distance) if !node.is_leaf() => {
                    writeln!(out, "{indent}{} distance: {distance:.3}", node.name)
                }
                _ => writeln!(out, "{indent}{} (leaf)", node.name),
            };
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }
}
