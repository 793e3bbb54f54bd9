/**
 * neighborhood.rs
 * Depth-bounded breadth-first expansion along outgoing edges, used to
 * turn a query's result nodes into the displayed subgraph
 */

use std::collections::{HashMap, HashSet};

use super::model::{DisplayFilter, GraphModel};

/// Result of one expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighborhood {
    /// Nodes named directly by the results, in graph order
    pub seeds: Vec<String>,
    /// Seeds followed by every node reached, in discovery order (may repeat)
    pub visited: Vec<String>,
}

impl Neighborhood {
    pub fn contains(&self, id: &str) -> bool {
        self.visited.iter().any(|v| v == id)
    }

    pub fn displayed(&self) -> HashSet<String> {
        self.visited.iter().cloned().collect()
    }

    pub fn filter(&self) -> DisplayFilter {
        DisplayFilter::Nodes(self.displayed())
    }
}

pub struct NeighborhoodExpander<'a> {
    graph: &'a GraphModel,
    outgoing: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> NeighborhoodExpander<'a> {
    pub fn new(graph: &'a GraphModel) -> Self {
        let nodes: HashSet<&str> = graph.node_ids().collect();
        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &graph.edges {
            // dangling targets are never displayed
            if nodes.contains(edge.to.as_str()) {
                outgoing
                    .entry(edge.from.as_str())
                    .or_default()
                    .push(edge.to.as_str());
            }
        }
        Self { graph, outgoing }
    }

    /// Graph nodes whose id is among `names`, in graph order
    pub fn seeds<'n, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let wanted: HashSet<&str> = names.into_iter().collect();
        self.graph
            .node_ids()
            .filter(|id| wanted.contains(id))
            .map(str::to_string)
            .collect()
    }

    /// `depth` rounds of expansion from `seeds`; depth 0 yields the seeds alone
    pub fn expand(&self, seeds: Vec<String>, depth: usize) -> Neighborhood {
        let mut visited = seeds.clone();
        let mut frontier: Vec<&str> = seeds.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = frontier.iter().copied().collect();

        // each node is expanded at most once, so cycles end the walk
        for _round in 0..depth {
            let mut next: Vec<&str> = Vec::new();
            for id in &frontier {
                for target in self.outgoing.get(id).into_iter().flatten() {
                    visited.push(target.to_string());
                    if seen.insert(*target) {
                        next.push(*target);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Neighborhood { seeds, visited }
    }
}
