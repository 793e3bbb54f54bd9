/**
 * style.rs
 * Visual-attribute mutators. Each returns a new snapshot; the input
 * graph is left untouched.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::catalog::{DEFAULT_COLOR, DEFAULT_EDGE_WIDTH, DEFAULT_NODE_SIZE};
use super::model::{AttributeValue, EdgeAttribute, GraphModel, NodeAttribute};
use crate::errors::{Result, SqvError};

/// Kelly's 20 colors of maximum contrast
pub const PALETTE: [&str; 20] = [
    "#FFB300", "#A6BDD7", "#803E75", "#FF6800", "#C10020", "#CEA262", "#817066", "#007D34",
    "#F6768E", "#00538A", "#FF7A5C", "#53377A", "#FF8E00", "#B32851", "#F4C800", "#7F180D",
    "#93AA00", "#593315", "#F13A13", "#232C16",
];

pub const NODE_PALETTE_OFFSET: usize = 0;
pub const EDGE_PALETTE_OFFSET: usize = 2;

pub const NODE_SCALE_MAX: f64 = 20.0;
pub const EDGE_SCALE_MAX: f64 = 5.0;

/// Attributes with more distinct values than this are not offered for coloring
pub const MAX_CATEGORIES: usize = 20;

pub fn palette_color(index: usize, offset: usize) -> &'static str {
    PALETTE[(index + offset) % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub value: String,
    pub color: String,
}

/// value -> color mapping in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    fn assign(values: impl Iterator<Item = String>, offset: usize) -> Self {
        let mut entries: Vec<LegendEntry> = Vec::new();
        for value in values {
            if !entries.iter().any(|e| e.value == value) {
                entries.push(LegendEntry {
                    color: palette_color(entries.len(), offset).to_string(),
                    value,
                });
            }
        }
        Self { entries }
    }

    pub fn color_of(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.color.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn color_nodes_by(graph: &GraphModel, attribute: Option<NodeAttribute>) -> (GraphModel, Legend) {
    let mut nodes = graph.nodes.clone();
    let legend = match attribute {
        None => {
            for node in &mut nodes {
                node.color = DEFAULT_COLOR.to_string();
            }
            Legend::default()
        }
        Some(attr) => {
            let legend = Legend::assign(
                graph.nodes.iter().map(|n| n.attribute(attr).to_string()),
                NODE_PALETTE_OFFSET,
            );
            for node in &mut nodes {
                let value = node.attribute(attr).to_string();
                if let Some(color) = legend.color_of(&value) {
                    node.color = color.to_string();
                }
            }
            legend
        }
    };
    (graph.restyled(nodes, graph.edges.clone()), legend)
}

pub fn color_edges_by(graph: &GraphModel, attribute: Option<EdgeAttribute>) -> (GraphModel, Legend) {
    let mut edges = graph.edges.clone();
    let legend = match attribute {
        None => {
            for edge in &mut edges {
                edge.color = DEFAULT_COLOR.to_string();
            }
            Legend::default()
        }
        Some(attr) => {
            let legend = Legend::assign(
                graph.edges.iter().map(|e| e.attribute(attr).to_string()),
                EDGE_PALETTE_OFFSET,
            );
            for edge in &mut edges {
                let value = edge.attribute(attr).to_string();
                if let Some(color) = legend.color_of(&value) {
                    edge.color = color.to_string();
                }
            }
            legend
        }
    };
    (graph.restyled(graph.nodes.clone(), edges), legend)
}

/// Node size = base + 20 * (x - min) / (max - min); flat or `None` resets
pub fn size_nodes_by(graph: &GraphModel, attribute: Option<NodeAttribute>) -> Result<GraphModel> {
    let range = match attribute {
        None => None,
        Some(attr) => Some((
            attr,
            graph
                .scaling()
                .node(attr)
                .ok_or_else(|| SqvError::NotNumeric(attr.to_string()))?,
        )),
    };

    let mut nodes = graph.nodes.clone();
    for node in &mut nodes {
        node.size = match range {
            Some((attr, range)) if !range.is_flat() => {
                let x = node.attribute(attr).as_number().unwrap_or(range.min);
                DEFAULT_NODE_SIZE + NODE_SCALE_MAX * (x - range.min) / (range.max - range.min)
            }
            _ => DEFAULT_NODE_SIZE,
        };
    }
    Ok(graph.restyled(nodes, graph.edges.clone()))
}

/// Edge width = 5 * (x - min) / (max - min), the minimum keeps the default width
pub fn size_edges_by(graph: &GraphModel, attribute: Option<EdgeAttribute>) -> Result<GraphModel> {
    let range = match attribute {
        None => None,
        Some(attr) => Some((
            attr,
            graph
                .scaling()
                .edge(attr)
                .ok_or_else(|| SqvError::NotNumeric(attr.to_string()))?,
        )),
    };

    let mut edges = graph.edges.clone();
    for edge in &mut edges {
        edge.width = match range {
            Some((attr, range)) if !range.is_flat() => {
                let x = edge.attribute(attr).as_number().unwrap_or(range.min);
                if x == range.min {
                    DEFAULT_EDGE_WIDTH
                } else {
                    EDGE_SCALE_MAX * (x - range.min) / (range.max - range.min)
                }
            }
            _ => DEFAULT_EDGE_WIDTH,
        };
    }
    Ok(graph.restyled(graph.nodes.clone(), edges))
}

fn is_categorical(values: impl Iterator<Item = AttributeValue>) -> bool {
    let mut distinct: HashSet<String> = HashSet::new();
    for value in values {
        match value {
            AttributeValue::Text(text) => {
                distinct.insert(text);
                if distinct.len() > MAX_CATEGORIES {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Text-valued node attributes with few distinct values, presentation columns excluded
pub fn categorical_node_features(graph: &GraphModel) -> Vec<NodeAttribute> {
    const EXCLUDED: [NodeAttribute; 5] = [
        NodeAttribute::Id,
        NodeAttribute::Label,
        NodeAttribute::Shape,
        NodeAttribute::Title,
        NodeAttribute::Color,
    ];
    NodeAttribute::ALL
        .into_iter()
        .filter(|attr| !EXCLUDED.contains(attr))
        .filter(|attr| is_categorical(graph.nodes.iter().map(|n| n.attribute(*attr))))
        .collect()
}

pub fn categorical_edge_features(graph: &GraphModel) -> Vec<EdgeAttribute> {
    const EXCLUDED: [EdgeAttribute; 4] = [
        EdgeAttribute::Color,
        EdgeAttribute::From,
        EdgeAttribute::To,
        EdgeAttribute::Id,
    ];
    EdgeAttribute::ALL
        .into_iter()
        .filter(|attr| !EXCLUDED.contains(attr))
        .filter(|attr| is_categorical(graph.edges.iter().map(|e| e.attribute(*attr))))
        .collect()
}

pub fn numerical_node_features(graph: &GraphModel) -> Vec<NodeAttribute> {
    NodeAttribute::ALL
        .into_iter()
        .filter(|attr| *attr != NodeAttribute::Size && graph.scaling().node(*attr).is_some())
        .collect()
}

pub fn numerical_edge_features(graph: &GraphModel) -> Vec<EdgeAttribute> {
    EdgeAttribute::ALL
        .into_iter()
        .filter(|attr| *attr != EdgeAttribute::Width && graph.scaling().edge(*attr).is_some())
        .collect()
}
