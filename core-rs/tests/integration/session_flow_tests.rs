//! Integration tests for complete query sessions
//!
//! Tests a session over an ontology loaded from disk:
//! - Extraction into the graph
//! - Query composition and evaluation
//! - Neighborhood display and restyling
//! - History

use sqv_core::config::QuerySettings;
use sqv_core::graph::{Layer, Shape};
use sqv_core::query::{EMPTY_QUERY_TEXT, NO_RESULTS_TEXT, SYNTAX_ERROR_TEXT};
use sqv_core::{
    DisplayFilter, EvaluationOutcome, OxigraphOntology, ResultItem, Session, SessionConfig,
    SessionOptions,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const IRI: &str = "http://example.org/onto";

const ONTOLOGY: &str = r#"
@prefix : <http://example.org/onto#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

:A a owl:Class .
:B a owl:Class ; rdfs:subClassOf :A .

:rel a owl:ObjectProperty ; rdfs:domain :A ; rdfs:range :B .
:label a owl:DatatypeProperty ; rdfs:domain :A ; rdfs:range xsd:string .

# inferred type A materialized alongside the asserted type B
:b1 a owl:NamedIndividual, :B, :A ;
    :label "first" .
:b2 a owl:NamedIndividual, :B, :A ;
    :label "second" ;
    :rel :b1 .
"#;

fn write_ontology(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("onto.ttl");
    fs::write(&path, ONTOLOGY).unwrap();
    path
}

fn open(include_instances: bool) -> (TempDir, Session<OxigraphOntology>) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_ontology(temp_dir.path());
    let store = OxigraphOntology::load(IRI, &path).unwrap();
    let session = Session::open(store, SessionOptions::new(include_instances)).unwrap();
    (temp_dir, session)
}

#[test]
fn test_tbox_extraction_from_file() {
    let (_dir, session) = open(false);
    let graph = session.full_graph();

    let a = graph.node("A").unwrap();
    let b = graph.node("B").unwrap();
    assert_eq!(a.importance, 11);
    assert_eq!(b.importance, 10);
    assert_eq!(a.shape, Shape::Dot);

    let string = graph.node("string").unwrap();
    assert_eq!(string.shape, Shape::Triangle);
    assert_eq!(string.layer, Layer::T);

    assert!(graph.edge("B is_a A").is_some());
    assert!(graph.edge("A rel B").unwrap().dashed);
    assert!(graph.edge("A label string").is_some());
    assert!(!graph.contains_node("b1"));
}

#[test]
fn test_abox_extraction_from_file() {
    let (_dir, session) = open(true);
    let graph = session.full_graph();

    let b1 = graph.node("b1").unwrap();
    assert_eq!(b1.shape, Shape::Box);
    assert_eq!(b1.layer, Layer::A);
    assert_eq!(b1.title, "label = first");

    // typed :B and :A, linked to the more specific class
    assert!(graph.edge("b1 is_a B").is_some());
    assert!(graph.edge("b1 is_a A").is_none());

    let rel = graph.edge("b2 rel b1").unwrap();
    assert!(!rel.dashed);
    assert_eq!(graph.edges.iter().filter(|e| e.id == "b2 rel b1").count(), 1);
}

/// Test: composed SELECT over class A lists its individuals and filters the view
#[test]
fn test_composed_query_flow() {
    let (_dir, mut session) = open(true);

    session.compose_keyword("SELECT");
    session.compose_variable("?x");
    session.compose_keyword("WHERE");
    session.compose_symbol("{");
    session.compose_free_text("?x a :A");
    session.compose_symbol("}");
    assert_eq!(session.query_text(), " SELECT ?x WHERE { ?x a :A }");

    let evaluation = session.evaluate_query(Some(1));
    assert_eq!(evaluation.outcome, EvaluationOutcome::Success);

    let mut listed: Vec<&str> = evaluation.result_text.lines().collect();
    listed.sort();
    assert_eq!(listed, vec!["b1", "b2"]);
    assert!(evaluation.results.iter().all(|r| matches!(r, ResultItem::GraphElementRef { .. })));

    let mut seeds = evaluation.selection.clone();
    seeds.sort();
    assert_eq!(seeds, vec!["b1".to_string(), "b2".to_string()]);

    let displayed = session.displayed_graph();
    assert!(displayed.contains_node("b1"));
    assert!(displayed.contains_node("b2"));
    assert!(!displayed.contains_node("string"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history_window(5), "1:  SELECT ?x WHERE { ?x a :A }\n");
}

#[test]
fn test_literal_results_keep_full_graph() {
    let (_dir, mut session) = open(true);
    let evaluation = session.evaluate_text("SELECT ?v WHERE { ?x :label ?v } ORDER BY ?v", Some(1));

    assert_eq!(evaluation.outcome, EvaluationOutcome::Success);
    assert_eq!(evaluation.result_text, "first\nsecond\n");
    assert_eq!(evaluation.filter, DisplayFilter::All);
    assert_eq!(session.displayed_graph(), *session.full_graph());
}

#[test]
fn test_error_outcomes() {
    let (_dir, mut session) = open(false);

    let evaluation = session.evaluate_text("", None);
    assert_eq!(evaluation.result_text, EMPTY_QUERY_TEXT);

    let evaluation = session.evaluate_text("SELECT ?x WHERE { ?x a ", None);
    assert_eq!(evaluation.outcome, EvaluationOutcome::SyntaxError);
    assert_eq!(evaluation.result_text, SYNTAX_ERROR_TEXT);

    let evaluation = session.evaluate_text("SELECT ?x WHERE { ?x a undefinedprefix:X }", None);
    assert!(evaluation.outcome.is_error());

    let evaluation = session.evaluate_text("SELECT ?x WHERE { ?x a :Nothing }", None);
    assert_eq!(evaluation.outcome, EvaluationOutcome::NoResults);
    assert_eq!(evaluation.result_text, NO_RESULTS_TEXT);

    // only the no-results attempt is recorded
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.displayed_graph(), *session.full_graph());
}

#[test]
fn test_result_depth_slider() {
    let (_dir, mut session) = open(true);
    session.evaluate_text("SELECT ?x WHERE { ?x :rel ?y }", Some(0));

    let shown: Vec<String> = session.displayed_graph().node_ids().map(str::to_string).collect();
    assert_eq!(shown, vec!["b2".to_string()]);

    session.set_result_depth(1);
    let displayed = session.displayed_graph();
    assert!(displayed.contains_node("b1"));
    assert!(displayed.edge("b2 rel b1").is_some());
    assert_eq!(session.result_depth(), 1);
}

#[test]
fn test_restyle_preserves_displayed_subset() {
    let (_dir, mut session) = open(true);
    session.evaluate_text("SELECT ?x WHERE { ?x :rel ?y }", Some(0));

    let legend = session.color_nodes_by("T/A").unwrap().clone();
    assert_eq!(legend.len(), 2);
    session.size_edges_by("weight").unwrap();

    let displayed = session.displayed_graph();
    assert_eq!(displayed.nodes.len(), 1);
    assert_eq!(displayed.nodes[0].color, legend.color_of("A").unwrap());
}

#[test]
fn test_session_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    write_ontology(temp_dir.path());

    let mut config = SessionConfig::new("flow", IRI, "onto.ttl");
    config.spec.include_instances = false;
    config.save(temp_dir.path().join("sqv.yaml")).unwrap();

    let config = SessionConfig::load_from_dir(temp_dir.path()).unwrap();
    let path = sqv_core::config::resolve_path(temp_dir.path(), &config.spec.ontology.path);
    let store = OxigraphOntology::load(&config.spec.ontology.iri, &path).unwrap();
    let options = SessionOptions::from_config(&config, temp_dir.path()).unwrap();
    let session = Session::open(store, options).unwrap();

    assert!(session.full_graph().contains_node("A"));
    assert!(!session.full_graph().contains_node("b1"));
    assert!(session.templates().is_empty());
}

/// Test: the history window size comes from the session file
#[test]
fn test_history_window_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    write_ontology(temp_dir.path());

    let mut config = SessionConfig::new("flow", IRI, "onto.ttl");
    config.spec.query = Some(QuerySettings {
        history_window: 2,
        ..Default::default()
    });
    config.save(temp_dir.path().join("sqv.yaml")).unwrap();

    let config = SessionConfig::load_from_dir(temp_dir.path()).unwrap();
    let store = OxigraphOntology::load(IRI, &temp_dir.path().join("onto.ttl")).unwrap();
    let options = SessionOptions::from_config(&config, temp_dir.path()).unwrap();
    assert_eq!(options.history_window, 2);
    let mut session = Session::open(store, options).unwrap();

    for class in ["X", "Y", "Z"] {
        session.evaluate_text(&format!("SELECT ?x WHERE {{ ?x a :{} }}", class), None);
    }

    assert_eq!(session.history_window_size(), 2);
    assert_eq!(
        session.recent_history(),
        "2: SELECT ?x WHERE { ?x a :Y }\n3: SELECT ?x WHERE { ?x a :Z }\n"
    );
}
