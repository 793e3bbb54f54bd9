/**
 * model.rs
 * Materialized node/edge snapshot consumed by the view.
 * Snapshots are never mutated by filtering; the displayed graph is always
 * a projection of the full snapshot.
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::catalog::{Edge, Node};
use super::extractor::Extraction;
use crate::errors::{Result, SqvError};

/// Sentinel attribute name meaning "no attribute"
pub const NONE_ATTRIBUTE: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAttribute {
    Id,
    Label,
    Importance,
    Shape,
    Layer,
    Title,
    Color,
    Size,
}

impl NodeAttribute {
    pub const ALL: [NodeAttribute; 8] = [
        NodeAttribute::Id,
        NodeAttribute::Label,
        NodeAttribute::Importance,
        NodeAttribute::Shape,
        NodeAttribute::Layer,
        NodeAttribute::Title,
        NodeAttribute::Color,
        NodeAttribute::Size,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeAttribute::Id => "id",
            NodeAttribute::Label => "label",
            NodeAttribute::Importance => "importance",
            NodeAttribute::Shape => "shape",
            NodeAttribute::Layer => "layer",
            NodeAttribute::Title => "title",
            NodeAttribute::Color => "color",
            NodeAttribute::Size => "size",
        }
    }
}

impl FromStr for NodeAttribute {
    type Err = SqvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "T/A" => Ok(NodeAttribute::Layer),
            _ => NodeAttribute::ALL
                .iter()
                .copied()
                .find(|attr| attr.name() == s)
                .ok_or_else(|| SqvError::UnknownAttribute(s.to_string())),
        }
    }
}

impl fmt::Display for NodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeAttribute {
    From,
    To,
    Id,
    Weight,
    Label,
    Dashed,
    Color,
    Width,
}

impl EdgeAttribute {
    pub const ALL: [EdgeAttribute; 8] = [
        EdgeAttribute::From,
        EdgeAttribute::To,
        EdgeAttribute::Id,
        EdgeAttribute::Weight,
        EdgeAttribute::Label,
        EdgeAttribute::Dashed,
        EdgeAttribute::Color,
        EdgeAttribute::Width,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EdgeAttribute::From => "from",
            EdgeAttribute::To => "to",
            EdgeAttribute::Id => "id",
            EdgeAttribute::Weight => "weight",
            EdgeAttribute::Label => "label",
            EdgeAttribute::Dashed => "dashed",
            EdgeAttribute::Color => "color",
            EdgeAttribute::Width => "width",
        }
    }
}

impl FromStr for EdgeAttribute {
    type Err = SqvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dashes" => Ok(EdgeAttribute::Dashed),
            _ => EdgeAttribute::ALL
                .iter()
                .copied()
                .find(|attr| attr.name() == s)
                .ok_or_else(|| SqvError::UnknownAttribute(s.to_string())),
        }
    }
}

impl fmt::Display for EdgeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse an attribute choice where `"None"` selects no attribute
pub fn attribute_choice<T: FromStr<Err = SqvError>>(name: &str) -> Result<Option<T>> {
    if name == NONE_ATTRIBUTE {
        Ok(None)
    } else {
        name.parse().map(Some)
    }
}

impl Node {
    pub fn attribute(&self, attribute: NodeAttribute) -> AttributeValue {
        match attribute {
            NodeAttribute::Id => AttributeValue::Text(self.id.clone()),
            NodeAttribute::Label => AttributeValue::Text(self.label.clone()),
            NodeAttribute::Importance => AttributeValue::Number(f64::from(self.importance)),
            NodeAttribute::Shape => AttributeValue::Text(self.shape.to_string()),
            NodeAttribute::Layer => AttributeValue::Text(self.layer.to_string()),
            NodeAttribute::Title => AttributeValue::Text(self.title.clone()),
            NodeAttribute::Color => AttributeValue::Text(self.color.clone()),
            NodeAttribute::Size => AttributeValue::Number(self.size),
        }
    }
}

impl Edge {
    pub fn attribute(&self, attribute: EdgeAttribute) -> AttributeValue {
        match attribute {
            EdgeAttribute::From => AttributeValue::Text(self.from.clone()),
            EdgeAttribute::To => AttributeValue::Text(self.to.clone()),
            EdgeAttribute::Id => AttributeValue::Text(self.id.clone()),
            EdgeAttribute::Weight => AttributeValue::Number(f64::from(self.weight)),
            EdgeAttribute::Label => AttributeValue::Text(self.label.clone()),
            EdgeAttribute::Dashed => AttributeValue::Flag(self.dashed),
            EdgeAttribute::Color => AttributeValue::Text(self.color.clone()),
            EdgeAttribute::Width => AttributeValue::Number(self.width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    fn over(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(MinMax { min: v, max: v }),
            Some(m) => Some(MinMax {
                min: m.min.min(v),
                max: m.max.max(v),
            }),
        })
    }

    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }
}

/// Per numeric column range, computed once over the full population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingVars {
    pub nodes: BTreeMap<String, MinMax>,
    pub edges: BTreeMap<String, MinMax>,
}

impl ScalingVars {
    pub fn compute(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut vars = ScalingVars::default();

        for attr in NodeAttribute::ALL {
            let numbers = nodes.iter().filter_map(|n| n.attribute(attr).as_number());
            if let Some(range) = MinMax::over(numbers) {
                vars.nodes.insert(attr.name().to_string(), range);
            }
        }
        for attr in EdgeAttribute::ALL {
            let numbers = edges.iter().filter_map(|e| e.attribute(attr).as_number());
            if let Some(range) = MinMax::over(numbers) {
                vars.edges.insert(attr.name().to_string(), range);
            }
        }
        vars
    }

    pub fn node(&self, attribute: NodeAttribute) -> Option<MinMax> {
        self.nodes.get(attribute.name()).copied()
    }

    pub fn edge(&self, attribute: EdgeAttribute) -> Option<MinMax> {
        self.edges.get(attribute.name()).copied()
    }
}

/// Which nodes of the full snapshot are displayed
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DisplayFilter {
    #[default]
    All,
    Nodes(HashSet<String>),
}

impl DisplayFilter {
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DisplayFilter::Nodes(ids.into_iter().map(Into::into).collect())
    }

    pub fn admits(&self, id: &str) -> bool {
        match self {
            DisplayFilter::All => true,
            DisplayFilter::Nodes(ids) => ids.contains(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(rename = "scalingVars")]
    scaling: ScalingVars,
}

impl GraphModel {
    /// Convert the catalogs into plain collections, catalog order preserved
    pub fn materialize(extraction: &Extraction) -> Self {
        Self::from_parts(
            extraction.entities.nodes().to_vec(),
            extraction.relations.edges().to_vec(),
        )
    }

    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let scaling = ScalingVars::compute(&nodes, &edges);
        Self { nodes, edges, scaling }
    }

    /// Same population with new visual attributes, scaling kept
    pub(crate) fn restyled(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            scaling: self.scaling.clone(),
        }
    }

    pub fn scaling(&self) -> &ScalingVars {
        &self.scaling
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Displayed subset: admitted nodes plus the edges between them
    pub fn project(&self, filter: &DisplayFilter) -> GraphModel {
        if *filter == DisplayFilter::All {
            return self.clone();
        }
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| filter.admits(&n.id))
            .cloned()
            .collect();
        let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| kept.contains(e.from.as_str()) && kept.contains(e.to.as_str()))
            .cloned()
            .collect();
        self.restyled(nodes, edges)
    }

    /// Nodes whose label contains `text` (case-insensitive), plus both
    /// endpoints of every edge whose label matches
    pub fn search(&self, text: &str) -> GraphModel {
        if text.is_empty() {
            return self.clone();
        }
        let needle = text.to_lowercase();

        let mut visible: HashSet<String> = self
            .nodes
            .iter()
            .filter(|n| n.label.to_lowercase().contains(&needle))
            .map(|n| n.id.clone())
            .collect();

        for edge in &self.edges {
            if edge.label.to_lowercase().contains(&needle) {
                visible.insert(edge.from.clone());
                visible.insert(edge.to.clone());
            }
        }

        self.project(&DisplayFilter::Nodes(visible))
    }
}
