//! Validated-at-load configuration: the positional slot alphabet and the
//! hand-authored taxonomy program.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::constants::coordinates::SEGMENT_SEPARATOR;
use crate::constants::slots::ALPHABET_DOCUMENT_KEY;
use crate::constants::tree::ROOT_LABEL;
use crate::data::Record;
use crate::errors::InventoryError;
use crate::links::LinkRegistry;
use crate::rules::{PartitionHint, SplitRule};
use crate::tree::{NodeId, PartitionTree};
use crate::types::{LinkName, NodeLabel, SlotLabel};

/// Fixed ordered mapping from slot position to slot label.
///
/// Loaded once at process start; its size bounds the largest leaf the
/// coordinate scheme supports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotAlphabet {
    labels: Vec<SlotLabel>,
}

impl SlotAlphabet {
    /// Build an alphabet from ordered labels. Labels must be non-empty,
    /// unique, and free of the coordinate separator.
    pub fn new(labels: Vec<SlotLabel>) -> Result<Self, InventoryError> {
        if labels.is_empty() {
            return Err(InventoryError::Configuration(
                "slot alphabet must define at least one label".to_string(),
            ));
        }
        for (idx, label) in labels.iter().enumerate() {
            if label.is_empty() || label.contains(SEGMENT_SEPARATOR) {
                return Err(InventoryError::Configuration(format!(
                    "slot label '{label}' at position {idx} is not usable in a coordinate"
                )));
            }
            if labels[..idx].contains(label) {
                return Err(InventoryError::Configuration(format!(
                    "slot label '{label}' appears twice"
                )));
            }
        }
        Ok(Self { labels })
    }

    /// The default `a`–`z` alphabet.
    pub fn lowercase_latin() -> Self {
        let labels = ('a'..='z').map(|c| c.to_string()).collect();
        Self { labels }
    }

    /// Label for a slot position, if the alphabet covers it.
    pub fn label_for(&self, position: usize) -> Option<&str> {
        self.labels.get(position).map(String::as_str)
    }

    /// Number of slots the alphabet covers.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no labels are defined; constructors reject this, so a
    /// loaded alphabet is never empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Parse the alphabet from its JSON configuration document:
    /// `{"z_coordinate": [{"a": 0, "b": 1, ...}]}` (label to position,
    /// inverted at load). Positions must cover `0..len` exactly.
    pub fn from_json_str(document: &str) -> Result<Self, InventoryError> {
        let value: Value = serde_json::from_str(document).map_err(|err| {
            InventoryError::Configuration(format!("slot alphabet document is not JSON: {err}"))
        })?;
        let mapping = value
            .get(ALPHABET_DOCUMENT_KEY)
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(Value::as_object)
            .ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "slot alphabet document is missing a '{ALPHABET_DOCUMENT_KEY}' mapping"
                ))
            })?;

        let mut by_position: HashMap<usize, SlotLabel> = HashMap::new();
        for (label, position) in mapping {
            let position = position.as_u64().ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "slot label '{label}' maps to a non-integer position"
                ))
            })? as usize;
            if by_position.insert(position, label.to_lowercase()).is_some() {
                return Err(InventoryError::Configuration(format!(
                    "slot position {position} is assigned twice"
                )));
            }
        }

        let mut labels = Vec::with_capacity(by_position.len());
        for position in 0..by_position.len() {
            let label = by_position.remove(&position).ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "slot positions are not contiguous: {position} is missing"
                ))
            })?;
            labels.push(label);
        }
        Self::new(labels)
    }

    /// Load the alphabet document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InventoryError> {
        let document = fs::read_to_string(path)?;
        Self::from_json_str(&document)
    }
}

/// One step of a taxonomy program: the node to split, addressed by its label
/// path from the root, and the rule to split it with.
#[derive(Clone, Debug)]
pub struct TaxonomyStep {
    /// Label path from the root to the target node; empty addresses the
    /// root itself.
    pub path: Vec<NodeLabel>,
    /// Rule applied to the target node.
    pub rule: SplitRule,
}

/// Declared move-link endpoints, resolved when the program is built.
#[derive(Clone, Debug)]
pub struct LinkSpec {
    /// Human-readable link name.
    pub name: LinkName,
    /// Leaf label under the front room.
    pub front: NodeLabel,
    /// Leaf label under the back room.
    pub back: NodeLabel,
}

/// The fixed, hand-authored split sequence encoding the business taxonomy.
///
/// The engine never infers this sequence; it executes the steps in order and
/// validates conservation at each one.
#[derive(Clone, Debug)]
pub struct TaxonomyProgram {
    /// Root node label.
    pub root_label: NodeLabel,
    /// Hint consumed by the main split.
    pub root_hint: PartitionHint,
    /// Ordered split steps; the first usually targets the root.
    pub steps: Vec<TaxonomyStep>,
    /// Move links to declare once the tree is built.
    pub links: Vec<LinkSpec>,
}

impl TaxonomyProgram {
    /// Program with the default root label and no steps.
    pub fn new(root_hint: PartitionHint) -> Self {
        Self {
            root_label: ROOT_LABEL.to_string(),
            root_hint,
            steps: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Execute every step over `records`, materialize the leaves, and
    /// declare the program's move links.
    pub fn build(
        &self,
        records: Vec<Record>,
    ) -> Result<(PartitionTree, LinkRegistry), InventoryError> {
        let mut tree =
            PartitionTree::new_root(self.root_label.clone(), records, self.root_hint.clone());
        for step in &self.steps {
            let target = resolve_path(&tree, &step.path)?;
            tree.split(target, &step.rule)?;
        }
        tree.materialize();

        let mut links = LinkRegistry::new();
        for spec in &self.links {
            links.declare(&tree, &spec.name, &spec.front, &spec.back)?;
        }
        Ok((tree, links))
    }
}

fn resolve_path(tree: &PartitionTree, path: &[NodeLabel]) -> Result<NodeId, InventoryError> {
    let mut current = tree.root();
    for label in path {
        current = tree
            .node(current)
            .children
            .iter()
            .copied()
            .find(|&child| &tree.node(child).label == label)
            .ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "taxonomy step path {path:?} does not resolve: no child '{label}'"
                ))
            })?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{GroupSpec, SortColumn};

    #[test]
    fn alphabet_document_parses_and_inverts() {
        let document = r#"{"z_coordinate": [{"A": 0, "B": 1, "C": 2}]}"#;
        let alphabet = SlotAlphabet::from_json_str(document).unwrap();
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.label_for(0), Some("a"));
        assert_eq!(alphabet.label_for(2), Some("c"));
        assert_eq!(alphabet.label_for(3), None);
    }

    #[test]
    fn alphabet_document_rejects_gaps_and_duplicates() {
        let gap = r#"{"z_coordinate": [{"a": 0, "b": 2}]}"#;
        assert!(matches!(
            SlotAlphabet::from_json_str(gap),
            Err(InventoryError::Configuration(msg)) if msg.contains("contiguous")
        ));

        let duplicate = r#"{"z_coordinate": [{"a": 0, "b": 0}]}"#;
        assert!(matches!(
            SlotAlphabet::from_json_str(duplicate),
            Err(InventoryError::Configuration(msg)) if msg.contains("twice")
        ));

        let missing = r#"{"slots": []}"#;
        assert!(matches!(
            SlotAlphabet::from_json_str(missing),
            Err(InventoryError::Configuration(msg)) if msg.contains("z_coordinate")
        ));
    }

    #[test]
    fn alphabet_rejects_separator_and_duplicate_labels() {
        assert!(SlotAlphabet::new(vec![]).is_err());
        assert!(SlotAlphabet::new(vec!["a.b".to_string()]).is_err());
        assert!(SlotAlphabet::new(vec!["a".to_string(), "a".to_string()]).is_err());
        assert!(SlotAlphabet::new(vec!["aa".to_string(), "ab".to_string()]).is_ok());
    }

    #[test]
    fn unresolvable_step_paths_fail_the_build() {
        let mut program = TaxonomyProgram::new(PartitionHint::Sorted(SortColumn::Rank));
        program.steps.push(TaxonomyStep {
            path: vec!["missing".to_string()],
            rule: SplitRule {
                target_category: 1,
                split_count: 1,
                groups: vec![
                    GroupSpec::stable("1.1"),
                    GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
                ],
            },
        });
        let err = program.build(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Configuration(msg) if msg.contains("does not resolve")
        ));
    }
}
