//! Arena-backed resource catalog
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`]. A
//! node owns its children through its child list; the parent link is a plain
//! index used for lookups only.
//!
//! ```text
//! (absolute root, no entry)
//! └── "" section root      depth 0
//!     ├── data/            depth 1
//!     │   ├── a.txt        depth 2
//!     │   └── b.txt        depth 2
//!     └── other/           depth 1
//!         └── c.txt        depth 2
//! ```

use crate::error::{CatalogError, CatalogResult};
use rfpak_formats::rf::ResourceEntry;
use std::cmp::Ordering;
use std::ops::Index;
use tracing::{debug, info, warn};

/// Handle to a node inside one [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of the node
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A node of the catalog tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogNode {
    name: String,
    path: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    entry: Option<ResourceEntry>,
}

impl CatalogNode {
    /// Name used for child lookup and path building
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concatenation of the names from the root down to this node
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parent node, `None` for the absolute root and detached nodes
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in sibling order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Resource entry carried by this node
    pub const fn entry(&self) -> Option<&ResourceEntry> {
        self.entry.as_ref()
    }

    /// Check if the node carries a directory entry
    pub fn is_directory(&self) -> bool {
        self.entry.as_ref().is_some_and(ResourceEntry::is_directory)
    }

    /// Check if the node carries a non-directory entry
    pub fn is_file(&self) -> bool {
        self.entry.as_ref().is_some_and(|e| !e.is_directory())
    }
}

/// Outcome of [`Catalog::merge`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Paths whose entry was replaced by the override
    pub replaced: Vec<String>,
    /// Override paths with no counterpart in the base catalog
    pub unmaterialized: Vec<String>,
}

impl MergeReport {
    /// Check if every override path found a counterpart
    pub fn is_complete(&self) -> bool {
        self.unmaterialized.is_empty()
    }
}

/// Hierarchical resource catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    nodes: Vec<CatalogNode>,
    root: NodeId,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Catalog {
    type Output = CatalogNode;

    /// Panics if `id` belongs to another catalog
    fn index(&self, id: NodeId) -> &CatalogNode {
        &self.nodes[id.0]
    }
}

impl Catalog {
    /// Catalog holding only the nameless absolute root
    pub fn new() -> Self {
        Self {
            nodes: vec![CatalogNode {
                name: String::new(),
                path: String::new(),
                parent: None,
                children: Vec::new(),
                entry: None,
            }],
            root: NodeId(0),
        }
    }

    /// The absolute root
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&CatalogNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the absolute root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the catalog holds nothing but the absolute root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of nodes carrying an entry
    pub fn entry_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.entry.is_some()).count()
    }

    fn push_node(&mut self, name: String, entry: Option<ResourceEntry>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CatalogNode {
            path: name.clone(),
            name,
            parent: None,
            children: Vec::new(),
            entry,
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        let path = format!("{}{}", self.nodes[parent.0].path, self.nodes[child.0].name);
        self.nodes[child.0].path = path;
        self.nodes[parent.0].children.push(child);
    }

    /// Recompute cached paths below `start`
    fn refresh_paths(&mut self, start: NodeId) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let base = self.nodes[id.0].path.clone();
            let children = self.nodes[id.0].children.clone();
            for &child in &children {
                let node = &mut self.nodes[child.0];
                node.path = format!("{base}{}", node.name);
            }
            stack.extend(children.into_iter().rev());
        }
    }

    /// Append a new node for `entry` under `parent`
    ///
    /// The node is named after the entry's filename. Use this to create
    /// paths before a [`merge`](Self::merge) that needs them.
    pub fn add_child(&mut self, parent: NodeId, entry: ResourceEntry) -> NodeId {
        let id = self.push_node(entry.filename.clone(), Some(entry));
        self.attach(parent, id);
        id
    }

    /// Append an entry-less node under `parent`
    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = self.push_node(name.into(), None);
        self.attach(parent, id);
        id
    }

    /// Rebuild the tree from a flat, depth-tagged pre-order sequence
    ///
    /// A depth-0 entry starts a new section root whose name is dropped; the
    /// entry itself is kept. Every section root is attached to the absolute
    /// root in input order once the whole sequence has been read.
    pub fn from_entries(entries: &[ResourceEntry]) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        let mut sections = Vec::new();
        let mut previous: Option<NodeId> = None;
        let mut last_depth = 0u8;

        for (index, entry) in entries.iter().enumerate() {
            let depth = entry.depth();

            if depth == 0 {
                let id = catalog.push_node(String::new(), Some(entry.clone()));
                sections.push(id);
                previous = Some(id);
                last_depth = 0;
                continue;
            }

            let orphan = CatalogError::OrphanEntry { index, depth };
            let Some(prev) = previous else {
                return Err(orphan);
            };

            let parent = match depth.cmp(&last_depth) {
                Ordering::Greater => {
                    if depth - last_depth != 1 {
                        return Err(CatalogError::DepthJump {
                            index,
                            from: last_depth,
                            to: depth,
                        });
                    }
                    Some(prev)
                }
                Ordering::Less => {
                    let mut ancestor = Some(prev);
                    for _ in 0..last_depth - depth {
                        ancestor = ancestor.and_then(|a| catalog.nodes[a.0].parent);
                    }
                    ancestor.and_then(|a| catalog.nodes[a.0].parent)
                }
                Ordering::Equal => catalog.nodes[prev.0].parent,
            };
            let parent = parent.ok_or(orphan)?;

            let id = catalog.push_node(entry.filename.clone(), Some(entry.clone()));
            catalog.attach(parent, id);
            previous = Some(id);
            last_depth = depth;
        }

        let root = catalog.root;
        for section in &sections {
            catalog.attach(root, *section);
        }
        catalog.refresh_paths(root);

        debug!(
            "Reconstructed {} entries into {} section(s)",
            entries.len(),
            sections.len()
        );

        Ok(catalog)
    }

    /// Pre-order listing of the subtree at `start` with each node's level
    /// below `start`
    pub fn preorder(&self, start: NodeId) -> Vec<(NodeId, usize)> {
        let mut order = Vec::new();
        let mut stack = vec![(start, 0usize)];

        while let Some((id, level)) = stack.pop() {
            order.push((id, level));
            stack.extend(
                self.nodes[id.0]
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, level + 1)),
            );
        }

        order
    }

    /// Flatten the tree into a depth-tagged pre-order sequence
    ///
    /// Nodes without an entry are skipped but their children are still
    /// visited. Each emitted entry gets its structural depth, where children
    /// of the absolute root sit at depth 0.
    pub fn flatten(&self) -> CatalogResult<Vec<ResourceEntry>> {
        let mut entries = Vec::new();

        for (id, level) in self.preorder(self.root) {
            let node = &self.nodes[id.0];
            let Some(entry) = &node.entry else {
                continue;
            };

            let depth = level.saturating_sub(1);
            let depth = u8::try_from(depth).map_err(|_| CatalogError::DepthOverflow {
                path: node.path.clone(),
                depth,
            })?;
            entries.push(entry.with_depth(depth));
        }

        debug!("Flattened catalog into {} entries", entries.len());
        Ok(entries)
    }

    /// Child of `parent` with exactly the given name
    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0].name == name)
    }

    /// First node in pre-order whose cached path equals `path`
    ///
    /// The empty path names the absolute root.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.path == path {
                return Some(id);
            }
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .copied()
                    .filter(|&child| path.starts_with(self.nodes[child.0].path.as_str())),
            );
        }

        None
    }

    /// Overlay the file entries of `overrides` onto this catalog
    ///
    /// Both trees are walked together from their roots, pairing children by
    /// exact name. Every override node with a non-directory entry replaces
    /// the entry of its counterpart. An override child with no counterpart
    /// is recorded in [`MergeReport::unmaterialized`] and its subtree is not
    /// visited.
    pub fn merge(&mut self, overrides: &Self) -> MergeReport {
        let mut report = MergeReport::default();
        let mut stack = vec![(self.root, overrides.root)];

        while let Some((dest, src)) = stack.pop() {
            let src_node = &overrides.nodes[src.0];

            if let Some(entry) = src_node.entry.as_ref().filter(|e| !e.is_directory()) {
                self.nodes[dest.0].entry = Some(entry.clone());
                debug!("Replacing {}", self.nodes[dest.0].path);
                report.replaced.push(self.nodes[dest.0].path.clone());
            }

            let mut pairs = Vec::with_capacity(src_node.children.len());
            for &src_child in &src_node.children {
                let name = &overrides.nodes[src_child.0].name;
                match self.child_named(dest, name) {
                    Some(dest_child) => pairs.push((dest_child, src_child)),
                    None => {
                        let path = &overrides.nodes[src_child.0].path;
                        warn!("Cannot insert {path}: adding new paths is not supported");
                        report.unmaterialized.push(path.clone());
                    }
                }
            }
            stack.extend(pairs.into_iter().rev());
        }

        info!(
            "Merged overrides: {} replaced, {} not materialized",
            report.replaced.len(),
            report.unmaterialized.len()
        );
        report
    }

    /// Nearest node from `id` upwards whose entry is not marked
    /// no-localization
    ///
    /// Entry-less nodes are passed over.
    pub fn packing_root(&self, id: NodeId) -> CatalogResult<NodeId> {
        let mut current = Some(id);

        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if node
                .entry
                .as_ref()
                .is_some_and(|e| !e.flags.is_no_localization())
            {
                return Ok(node_id);
            }
            current = node.parent;
        }

        Err(CatalogError::NoPackingRoot(self.nodes[id.0].path.clone()))
    }

    /// Paths of every file node, each prefixed with `prefix`, in pre-order
    ///
    /// Nodes with an empty path are left out.
    pub fn patchlist_paths(&self, prefix: &str) -> Vec<String> {
        self.preorder(self.root)
            .into_iter()
            .map(|(id, _)| &self.nodes[id.0])
            .filter(|node| node.is_file() && !node.path.is_empty())
            .map(|node| format!("{prefix}{}", node.path))
            .collect()
    }

    /// Indented listing of the tree below the absolute root
    pub fn render_tree(&self) -> String {
        let mut out = String::new();

        for (id, level) in self.preorder(self.root).into_iter().skip(1) {
            let node = &self.nodes[id.0];
            for i in 0..level - 1 {
                out.push_str(if i + 2 == level { "├ " } else { "│ " });
            }
            out.push_str(if node.name.is_empty() { "/" } else { &node.name });
            out.push('\n');
        }

        out
    }
}
