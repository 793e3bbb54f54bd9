/**
 * catalog.rs
 * Deduplicated node and edge registries filled by the extractor
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Joins constituent identifiers and labels of a merged edge
pub const MERGE_SEPARATOR: &str = ",\n ";

/// Importance every node starts from
pub const BASE_IMPORTANCE: u32 = 10;

pub const DEFAULT_COLOR: &str = "#97C2FC";
pub const DEFAULT_NODE_SIZE: f64 = 7.0;
pub const DEFAULT_EDGE_WIDTH: f64 = 1.0;

pub const IS_A: &str = "is_a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Classes
    Dot,
    /// Scalar datatypes
    Triangle,
    /// Instances
    Box,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Dot => "dot",
            Shape::Triangle => "triangle",
            Shape::Box => "box",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// T-Box (schema) or A-Box (instance) layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    T,
    A,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::T => "T",
            Layer::A => "A",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub importance: u32,
    pub shape: Shape,
    pub layer: Layer,
    pub title: String,
    pub color: String,
    pub size: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, shape: Shape, layer: Layer) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            importance: BASE_IMPORTANCE,
            shape,
            layer,
            title: String::new(),
            color: DEFAULT_COLOR.to_string(),
            size: DEFAULT_NODE_SIZE,
        }
    }

    pub fn class(id: impl Into<String>) -> Self {
        Self::new(id, Shape::Dot, Layer::T)
    }

    pub fn datatype(id: impl Into<String>) -> Self {
        Self::new(id, Shape::Triangle, Layer::T)
    }

    pub fn instance(id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut node = Self::new(id, Shape::Box, Layer::A);
        node.title = title.into();
        node
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub id: String,
    pub weight: u32,
    pub label: String,
    pub dashed: bool,
    pub color: String,
    pub width: f64,
}

impl Edge {
    /// Single relation edge, identified as `"<from> <relation> <to>"`
    pub fn new(from: impl Into<String>, relation: &str, to: impl Into<String>, dashed: bool) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: Self::identifier(&from, relation, &to),
            from,
            to,
            weight: 1,
            label: relation.to_string(),
            dashed,
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_EDGE_WIDTH,
        }
    }

    pub fn identifier(from: &str, relation: &str, to: &str) -> String {
        format!("{} {} {}", from, relation, to)
    }

    /// Fold one more relation over the same endpoints into this edge
    pub fn absorb(&mut self, identifier: &str, relation: &str) {
        self.id.push_str(MERGE_SEPARATOR);
        self.id.push_str(identifier);
        self.label.push_str(MERGE_SEPARATOR);
        self.label.push_str(relation);
        self.weight += 1;
    }

    pub fn constituents(&self) -> impl Iterator<Item = &str> {
        self.id.split(MERGE_SEPARATOR)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.label.split(MERGE_SEPARATOR)
    }

    pub fn has_constituent(&self, identifier: &str) -> bool {
        self.constituents().any(|c| c == identifier)
    }

    /// Same relation assertion, visual attributes ignored
    pub fn same_relation(&self, other: &Edge) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.id == other.id
            && self.label == other.label
            && self.dashed == other.dashed
    }
}

/// Registry of graph nodes keyed by id; a node is created at most once
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the id is already registered. Returns whether it was added.
    pub fn insert(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => self.nodes.get_mut(i),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Merged,
    /// The relation was already one of the edge's constituents
    AlreadyPresent,
}

/// Registry of graph edges with multi-label merge on the ordered (from, to) pair
#[derive(Debug, Clone, Default)]
pub struct RelationCatalog {
    edges: Vec<Edge>,
    pairs: HashMap<(String, String), Vec<usize>>,
}

impl RelationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without merging
    pub fn push(&mut self, edge: Edge) {
        self.pairs
            .entry((edge.from.clone(), edge.to.clone()))
            .or_default()
            .push(self.edges.len());
        self.edges.push(edge);
    }

    /// Append unless the exact same relation is already registered
    pub fn push_unique(&mut self, edge: Edge) -> bool {
        if self.between(&edge.from, &edge.to).any(|e| e.same_relation(&edge)) {
            return false;
        }
        self.push(edge);
        true
    }

    /// Merge into the first edge over (from, to), or create a new one
    pub fn merge_or_insert(&mut self, from: &str, relation: &str, to: &str, dashed: bool) -> MergeOutcome {
        let identifier = Edge::identifier(from, relation, to);
        let existing = self
            .pairs
            .get(&(from.to_string(), to.to_string()))
            .and_then(|indices| indices.first().copied());

        match existing {
            Some(i) => {
                let edge = &mut self.edges[i];
                if edge.has_constituent(&identifier) {
                    MergeOutcome::AlreadyPresent
                } else {
                    edge.absorb(&identifier, relation);
                    MergeOutcome::Merged
                }
            }
            None => {
                self.push(Edge::new(from, relation, to, dashed));
                MergeOutcome::Inserted
            }
        }
    }

    pub fn between<'a>(&'a self, from: &str, to: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.pairs
            .get(&(from.to_string(), to.to_string()))
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Number of edges labelled `label` that point at `to`
    pub fn incoming(&self, to: &str, label: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.to == to && e.label == label)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}
