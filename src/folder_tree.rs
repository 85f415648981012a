//! Expand/collapse state over a static document tree
//!
//! The node set is supplied at construction and never edited afterwards;
//! only per-node `expanded` flags mutate. Rendering is a pure projection
//! of the current flags: collapsing a folder hides its descendants
//! without touching their stored state.

use serde::Serialize;

/// What a tree entry is. Files are always leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Section,
    Folder,
    File,
}

/// Construction-time description of one node.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub label: String,
    pub kind: NodeKind,
    /// Initial expansion; when absent, nodes at depth 0 start open and
    /// deeper nodes start closed.
    pub default_open: Option<bool>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            kind,
            default_open: None,
            children: vec![],
        }
    }

    pub fn section(label: impl Into<String>) -> Self {
        Self::new(label, NodeKind::Section)
    }

    pub fn folder(label: impl Into<String>) -> Self {
        Self::new(label, NodeKind::Folder)
    }

    pub fn file(label: impl Into<String>) -> Self {
        Self::new(label, NodeKind::File)
    }

    pub fn open(mut self, open: bool) -> Self {
        self.default_open = Some(open);
        self
    }

    pub fn children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

/// One materialized tree node.
#[derive(Debug, Clone, Serialize)]
pub struct FolderNode {
    pub label: String,
    pub kind: NodeKind,
    pub expanded: bool,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    fn from_spec(spec: NodeSpec, depth: usize) -> Self {
        Self {
            label: spec.label,
            kind: spec.kind,
            expanded: spec.default_open.unwrap_or(depth < 1),
            children: spec
                .children
                .into_iter()
                .map(|c| Self::from_spec(c, depth + 1))
                .collect(),
        }
    }
}

/// One visible row of the rendered tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub label: String,
    pub kind: NodeKind,
    /// Indentation level, root = 0.
    pub depth: usize,
    pub expanded: bool,
    /// Child-index path from the root, usable with [`FolderTree::toggle`].
    pub path: Vec<usize>,
}

/// Expand/collapse state over the whole tree.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    roots: Vec<FolderNode>,
}

impl FolderTree {
    pub fn new(specs: Vec<NodeSpec>) -> Self {
        Self {
            roots: specs
                .into_iter()
                .map(|s| FolderNode::from_spec(s, 0))
                .collect(),
        }
    }

    pub fn roots(&self) -> &[FolderNode] {
        &self.roots
    }

    /// Flip `expanded` on the node at `path` (child indices from the
    /// root). Toggling a file, or a path that resolves to nothing, is an
    /// explicit no-op; returns whether a flag flipped.
    pub fn toggle(&mut self, path: &[usize]) -> bool {
        let Some(node) = node_at_mut(&mut self.roots, path) else {
            return false;
        };
        if node.kind == NodeKind::File {
            return false;
        }
        node.expanded = !node.expanded;
        true
    }

    /// Depth-first projection of the currently visible rows. A node is
    /// visible when every ancestor is expanded.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        collect_rows(&self.roots, 0, &mut path, &mut rows);
        rows
    }
}

fn node_at_mut<'a>(nodes: &'a mut [FolderNode], path: &[usize]) -> Option<&'a mut FolderNode> {
    let (&first, rest) = path.split_first()?;
    let node = nodes.get_mut(first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at_mut(&mut node.children, rest)
    }
}

fn collect_rows(
    nodes: &[FolderNode],
    depth: usize,
    path: &mut Vec<usize>,
    rows: &mut Vec<TreeRow>,
) {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        rows.push(TreeRow {
            label: node.label.clone(),
            kind: node.kind,
            depth,
            expanded: node.expanded,
            path: path.clone(),
        });
        if node.expanded {
            collect_rows(&node.children, depth + 1, path, rows);
        }
        path.pop();
    }
}
