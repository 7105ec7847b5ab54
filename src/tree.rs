//! Partition node tree and leaf materializer.
//!
//! Nodes live in an arena and address each other by index, so parent
//! back-references never own anything and the whole tree is dropped or
//! rebuilt as a unit. A node starts out holding its record subset and a
//! [`PartitionHint`]; splitting it hands the records to the evaluator and
//! turns the output groups into children configured by the rule's
//! [`GroupSpec`] list.

use std::fmt;

use tracing::debug;

use crate::constants::tree::{RENDER_INDENT, ROOT_LABEL, STABLE_MARKER};
use crate::data::Record;
use crate::errors::InventoryError;
use crate::layout::LeafStorage;
use crate::rules::{PartitionHint, SplitRule};
use crate::split::{check_conservation, split_records};
use crate::types::{CategoryCode, NodeLabel};

/// Arena index of one partition node.
pub type NodeId = usize;

/// One node of the partition tree.
#[derive(Debug)]
pub struct PartitionNode {
    /// Node label; `shelf.bin` for stable leaves, free-form otherwise.
    pub label: NodeLabel,
    /// True when this node is a terminal, addressable location; false for
    /// transient groupings that must be split again.
    pub stable: bool,
    /// Children in declaration order; empty until the node is split.
    pub children: Vec<NodeId>,
    /// Non-owning back-reference to the parent; `None` for the root.
    pub parent: Option<NodeId>,
    /// Hint consumed when this node is split.
    pub hint: PartitionHint,
    /// Sorted product list, populated by the materializer for childless
    /// stable nodes only.
    pub products: Option<LeafStorage>,
    records: Vec<Record>,
    main: bool,
}

impl PartitionNode {
    /// True for a childless stable node, the only kind that receives a
    /// coordinate.
    pub fn is_stable_leaf(&self) -> bool {
        self.stable && self.children.is_empty()
    }

    /// Records still owned by this node (drained once it is split).
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Arena-backed partition tree.
#[derive(Debug)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
}

impl PartitionTree {
    /// Build a tree whose root owns the full inventory and is marked as the
    /// main split point.
    pub fn new_root(label: impl Into<NodeLabel>, records: Vec<Record>, hint: PartitionHint) -> Self {
        Self {
            nodes: vec![PartitionNode {
                label: label.into(),
                stable: false,
                children: Vec::new(),
                parent: None,
                hint,
                products: None,
                records,
                main: true,
            }],
        }
    }

    /// [`PartitionTree::new_root`] with the default root label.
    pub fn from_inventory(records: Vec<Record>, hint: PartitionHint) -> Self {
        Self::new_root(ROOT_LABEL, records, hint)
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id]
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes. Never the case after
    /// construction; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Split `id` with `rule`, replacing its record set with one child per
    /// evaluator output group.
    ///
    /// The main (root) split evaluates once per distinct category present
    /// and concatenates same-index groups across categories, producing the
    /// room split regardless of category count. Conservation is re-checked
    /// against the node's pre-split record count; a mismatch between the
    /// rule's group list and the evaluator output is a configuration error.
    /// Both abort tree construction and are never retried.
    pub fn split(&mut self, id: NodeId, rule: &SplitRule) -> Result<Vec<NodeId>, InventoryError> {
        let node = &self.nodes[id];
        if !node.children.is_empty() {
            return Err(InventoryError::Configuration(format!(
                "node '{}' has already been split",
                node.label
            )));
        }
        let pre_count = node.records.len();
        let groups = if node.main {
            // The main split has no remainder group, so alignment is checked
            // inside split_main_groups instead of rule.validate.
            self.split_main_groups(id, rule)?
        } else {
            rule.validate(&node.hint, &node.label)?;
            split_records(&node.records, rule.target_category, &node.hint, rule.split_count)?
        };

        if groups.len() != rule.groups.len() {
            return Err(InventoryError::ConfigurationMismatch {
                label: self.nodes[id].label.clone(),
                declared: rule.groups.len(),
                produced: groups.len(),
            });
        }
        check_conservation(pre_count, &groups)?;

        let node = &mut self.nodes[id];
        node.records = Vec::new();
        debug!(label = %node.label, children = groups.len(), "split partition node");

        let mut child_ids = Vec::with_capacity(groups.len());
        for (records, spec) in groups.into_iter().zip(rule.groups.iter()) {
            let child_id = self.nodes.len();
            self.nodes.push(PartitionNode {
                label: spec.label.clone(),
                stable: spec.stable,
                children: Vec::new(),
                parent: Some(id),
                hint: spec.next.clone(),
                products: None,
                records,
                main: false,
            });
            self.nodes[id].children.push(child_id);
            child_ids.push(child_id);
        }
        Ok(child_ids)
    }

    /// Per-category evaluation for the main split: run the sorted split once
    /// per distinct category (first-appearance order) and concatenate
    /// same-index chunks. Each per-category remainder holds only the other
    /// categories, which are claimed by their own iteration, so it is
    /// dropped.
    fn split_main_groups(
        &self,
        id: NodeId,
        rule: &SplitRule,
    ) -> Result<Vec<Vec<Record>>, InventoryError> {
        let node = &self.nodes[id];
        if !matches!(node.hint, PartitionHint::Sorted(_)) {
            return Err(InventoryError::Configuration(format!(
                "main split on '{}' requires a sorted hint",
                node.label
            )));
        }
        if rule.groups.len() != rule.split_count {
            return Err(InventoryError::ConfigurationMismatch {
                label: node.label.clone(),
                declared: rule.groups.len(),
                produced: rule.split_count,
            });
        }

        let mut categories: Vec<CategoryCode> = Vec::new();
        for record in &node.records {
            if !categories.contains(&record.category) {
                categories.push(record.category);
            }
        }

        let mut groups: Vec<Vec<Record>> = vec![Vec::new(); rule.split_count];
        for category in categories {
            let mut per_category =
                split_records(&node.records, category, &node.hint, rule.split_count)?;
            per_category.truncate(rule.split_count);
            for (group, chunk) in groups.iter_mut().zip(per_category) {
                group.extend(chunk);
            }
        }
        Ok(groups)
    }

    /// Depth-first search for a node labelled `label` underneath `start`
    /// (excluding `start` itself). Used to resolve move-link endpoints at
    /// construction time.
    pub fn find_leaf_under(&self, start: NodeId, label: &str) -> Option<NodeId> {
        for &child in &self.nodes[start].children {
            if self.nodes[child].label == label {
                return Some(child);
            }
            if let Some(found) = self.find_leaf_under(child, label) {
                return Some(found);
            }
        }
        None
    }

    /// [`PartitionTree::find_leaf_under`] starting at the root.
    pub fn find_leaf(&self, label: &str) -> Option<NodeId> {
        self.find_leaf_under(self.root(), label)
    }

    /// The direct child of the root with `label`, typically a room node.
    pub fn room_node(&self, label: &str) -> Option<NodeId> {
        self.nodes[self.root()]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].label == label)
    }

    /// Visit every childless stable node exactly once, depth-first in
    /// declaration order. Unstable childless nodes (empty remainders) are
    /// skipped entirely.
    pub fn for_each_stable_leaf<F: FnMut(NodeId, &PartitionNode)>(&self, mut visit: F) {
        self.walk_stable_leaves(self.root(), &mut visit);
    }

    /// Collect a value per stable leaf, in traversal order.
    pub fn map_stable_leaves<T>(&self, mut f: impl FnMut(NodeId, &PartitionNode) -> T) -> Vec<T> {
        let mut out = Vec::new();
        self.for_each_stable_leaf(|id, node| out.push(f(id, node)));
        out
    }

    /// Ids of every stable leaf, in traversal order.
    pub fn stable_leaf_ids(&self) -> Vec<NodeId> {
        self.map_stable_leaves(|id, _| id)
    }

    fn walk_stable_leaves<F: FnMut(NodeId, &PartitionNode)>(&self, id: NodeId, visit: &mut F) {
        let node = &self.nodes[id];
        if node.is_stable_leaf() {
            visit(id, node);
            return;
        }
        for &child in &node.children {
            self.walk_stable_leaves(child, visit);
        }
    }

    /// Materialize every stable leaf: extract the owned record names, sort
    /// them, and store the list on the leaf.
    ///
    /// The list is overwritten each pass, so re-running on an unmutated tree
    /// re-derives identical output.
    pub fn materialize(&mut self) {
        let leaves = self.stable_leaf_ids();
        debug!(leaves = leaves.len(), "materializing stable leaves");
        for id in leaves {
            let mut names: Vec<String> = self.nodes[id]
                .records
                .iter()
                .map(|record| record.name.clone())
                .collect();
            names.sort();
            self.nodes[id].products = Some(LeafStorage::Flat(names));
        }
    }

    fn render(&self, id: NodeId, level: usize, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id];
        let marker = if node.stable { STABLE_MARKER } else { "" };
        writeln!(out, "{}{}{}", RENDER_INDENT.repeat(level), node.label, marker)?;
        for &child in &node.children {
            self.render(child, level + 1, out)?;
        }
        Ok(())
    }
}

impl fmt::Display for PartitionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(self.root(), 0, f)
    }
}
