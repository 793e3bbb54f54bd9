// Graph Contract Tests
//
// These tests pin the extraction and view invariants that the query view
// builds on. Each test states what breaks downstream if it fails.

use sqv_core::graph::style::{self, palette_color, PALETTE};
use sqv_core::graph::{
    Edge, GraphModel, NeighborhoodExpander, Node, OntologyGraphExtractor, BASE_IMPORTANCE,
    DEFAULT_COLOR, IS_A,
};
use sqv_core::ontology::{InMemoryOntology, Individual, PropertyDecl};
use std::collections::HashSet;

fn scenario() -> InMemoryOntology {
    InMemoryOntology::new("http://example.org/onto")
        .class("A")
        .subclass("B", "A")
        .object_property(PropertyDecl::new("rel").domain("A").range("B"))
}

fn rich() -> InMemoryOntology {
    InMemoryOntology::new("http://example.org/rich")
        .class("Thing")
        .subclass("Pizza", "Thing")
        .subclass("Topping", "Thing")
        .subclass("Margherita", "Pizza")
        .object_property(PropertyDecl::new("hasTopping").domain("Pizza").range("Topping"))
        .object_property(PropertyDecl::new("orphan").range("Topping"))
        .data_property(PropertyDecl::new("price").domain("Pizza").range("decimal"))
        .data_property(PropertyDecl::new("cost").domain("Pizza").range("decimal"))
        .data_property(PropertyDecl::new("code").domain("Thing").domain("Topping").range("string"))
        .data_property(PropertyDecl::new("note").domain("Topping"))
        .individual(
            Individual::new("m1")
                .typed("Margherita")
                .literal("price", "9.5")
                .literal("price", "9.5")
                .relation("hasTopping", "t1")
                .relation("hasTopping", "t1"),
        )
        .individual(Individual::new("t1").typed("Topping").literal("code", "T1"))
}

fn extract(store: &InMemoryOntology, include_instances: bool) -> GraphModel {
    let extraction = OntologyGraphExtractor::new(include_instances).extract(store).unwrap();
    GraphModel::materialize(&extraction)
}

/// WHY: nodes are addressed by id from query results and selections
/// BREAKS: result projection and selection lookup if ids repeat
#[test]
fn node_ids_are_unique() {
    for store in [scenario(), rich()] {
        for include_instances in [false, true] {
            let graph = extract(&store, include_instances);
            let ids: HashSet<&str> = graph.node_ids().collect();
            assert_eq!(ids.len(), graph.nodes.len());
        }
    }
}

/// WHY: two data properties on the same domain/datatype pair share one edge
/// BREAKS: edge ids and weights used for sizing
#[test]
fn data_properties_merge_into_one_weighted_edge() {
    let graph = extract(&rich(), false);
    let between: Vec<&Edge> = graph
        .edges
        .iter()
        .filter(|e| e.from == "Pizza" && e.to == "decimal")
        .collect();

    assert_eq!(between.len(), 1);
    assert!(between[0].weight >= 2);
    assert_eq!(between[0].id, "Pizza price decimal,\n Pizza cost decimal");
    assert_eq!(between[0].label, "price,\n cost");
}

/// WHY: the first of several data property domains contributes no edge
#[test]
fn multi_domain_data_property_skips_first_domain() {
    let graph = extract(&rich(), false);
    assert!(graph.edge("Thing code string").is_none());
    assert!(graph.edge("Topping code string").is_some());
}

/// WHY: properties without domain are skipped, without range they target NoneType
#[test]
fn missing_domain_and_range_policy() {
    let graph = extract(&rich(), false);
    assert!(!graph.edges.iter().any(|e| e.label.contains("orphan")));
    assert!(graph.edge("Topping note NoneType").is_some());
    assert!(graph.contains_node("NoneType"));
}

/// WHY: an instance reached through several classes keeps one edge per assertion
#[test]
fn instance_relation_edges_appended_once() {
    let graph = extract(&rich(), true);
    let relation_edges = graph.edges.iter().filter(|e| e.id == "m1 hasTopping t1").count();
    assert_eq!(relation_edges, 1);

    let m1 = graph.node("m1").unwrap();
    assert_eq!(m1.title, "price = 9.5");
    assert_eq!(m1.importance, BASE_IMPORTANCE);
}

/// WHY: the view relies on a stable order and values across materializations
#[test]
fn materialize_is_idempotent() {
    let extraction = OntologyGraphExtractor::new(true).extract(&rich()).unwrap();
    let first = serde_json::to_string(&GraphModel::materialize(&extraction)).unwrap();
    let second = serde_json::to_string(&GraphModel::materialize(&extraction)).unwrap();
    assert_eq!(first, second);
}

/// WHY: reference scenario for extraction order and importance scoring
#[test]
fn scenario_two_classes_one_relation() {
    let graph = extract(&scenario(), false);

    let ids: Vec<&str> = graph.node_ids().collect();
    assert_eq!(ids, vec!["A", "B"]);

    let edges: Vec<(&str, &str, &str)> = graph
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str(), e.label.as_str()))
        .collect();
    assert_eq!(edges, vec![("B", "A", IS_A), ("A", "B", "rel")]);

    assert_eq!(graph.node("A").unwrap().importance, 11);
    assert_eq!(graph.node("B").unwrap().importance, 10);
}

/// WHY: depth 0 shows exactly the result nodes; more depth never hides any
#[test]
fn neighborhood_depth_contracts() {
    let graph = extract(&rich(), true);
    let expander = NeighborhoodExpander::new(&graph);

    for seed in ["m1", "t1", "Margherita", "Thing"] {
        let seeds = expander.seeds([seed]);
        let zero = expander.expand(seeds.clone(), 0).displayed();
        assert_eq!(zero, HashSet::from([seed.to_string()]));

        let mut previous = zero;
        for depth in 1..6 {
            let current = expander.expand(seeds.clone(), depth).displayed();
            assert!(current.is_superset(&previous));
            previous = current;
        }
    }
}

/// WHY: "None" is the reset choice of the color selector
#[test]
fn color_by_none_resets_everything() {
    let graph = extract(&rich(), true);
    let (colored, legend) = style::color_nodes_by(&graph, Some(sqv_core::NodeAttribute::Shape));
    assert_eq!(legend.len(), 3);
    assert!(colored.nodes.iter().any(|n| n.color != DEFAULT_COLOR));

    let (reset, legend) = style::color_nodes_by(&colored, None);
    assert!(legend.is_empty());
    assert!(reset.nodes.iter().all(|n| n.color == DEFAULT_COLOR));
}

/// WHY: categories beyond the palette size cycle instead of going uncolored
#[test]
fn palette_cycles_past_twenty_values() {
    let nodes: Vec<Node> = (0..25).map(|i| Node::class(format!("C{}", i))).collect();
    let graph = GraphModel::from_parts(nodes, Vec::new());

    let (colored, legend) = style::color_nodes_by(&graph, Some(sqv_core::NodeAttribute::Id));
    assert_eq!(legend.len(), 25);
    assert_eq!(colored.nodes[20].color, PALETTE[0]);
    assert_eq!(palette_color(21, 2), PALETTE[3]);
}
