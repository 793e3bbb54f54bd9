//! Integration tests for template and library queries
//!
//! Tests templates discovered from disk through a session file:
//! - Catalog discovery per directory
//! - Slot-limited graph selections and undo
//! - Library queries and evaluation

use sqv_core::query::{SelectionOutcome, SlotLimits, TemplateKind};
use sqv_core::{EvaluationOutcome, OxigraphOntology, Session, SessionConfig, SessionOptions};
use sqv_core::config::TemplatesConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const IRI: &str = "http://example.org/pizza";

const PIZZA: &str = r#"
@prefix : <http://example.org/pizza#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

:Food a owl:Class .
:Pizza a owl:Class ; rdfs:subClassOf :Food .
:Topping a owl:Class ; rdfs:subClassOf :Food .
:hasTopping a owl:ObjectProperty ; rdfs:domain :Pizza ; rdfs:range :Topping .

:m1 a owl:NamedIndividual, :Pizza ; :hasTopping :t1 .
:t1 a owl:NamedIndividual, :Topping .
"#;

struct Fixture {
    _dir: TempDir,
    session: Session<OxigraphOntology>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("pizza.ttl"), PIZZA).unwrap();

    fs::create_dir_all(root.join("templates/inconsistency")).unwrap();
    fs::create_dir_all(root.join("queries")).unwrap();
    fs::write(
        root.join("templates/template_2.sparql"),
        "SELECT ?x WHERE { ?x [:edge] [:node] . }",
    )
    .unwrap();
    fs::write(
        root.join("templates/template_21.sparql"),
        "SELECT ?x WHERE { [:node1] [:edge] ?x . ?x a [:node2] . }",
    )
    .unwrap();
    fs::write(
        root.join("templates/inconsistency/check_disjoint.sparql"),
        "ASK { ?x a [:node1], [:node2] . }",
    )
    .unwrap();
    fs::write(
        root.join("queries/all_pizzas.sparql"),
        "SELECT ?p WHERE { ?p a :Pizza . }",
    )
    .unwrap();

    let mut config = SessionConfig::new("pizza", IRI, "pizza.ttl");
    config.spec.templates = Some(TemplatesConfig {
        standard: Some(PathBuf::from("templates")),
        inconsistency: Some(PathBuf::from("templates/inconsistency")),
        library: Some(PathBuf::from("queries")),
        slots: BTreeMap::from([(
            "template_21.sparql".to_string(),
            SlotLimits::new(Some(2), Some(1)),
        )]),
    });
    config.save(root.join("sqv.yaml")).unwrap();

    let config = SessionConfig::load_from_dir(root).unwrap();
    let store = OxigraphOntology::load(IRI, &root.join("pizza.ttl")).unwrap();
    let options = SessionOptions::from_config(&config, root).unwrap();
    let session = Session::open(store, options).unwrap();

    Fixture { _dir: dir, session }
}

#[test]
fn test_catalog_discovery() {
    let f = fixture();
    let templates = f.session.templates();

    assert_eq!(templates.of_kind(TemplateKind::Standard).count(), 2);
    assert_eq!(templates.of_kind(TemplateKind::Inconsistency).count(), 1);
    assert_eq!(templates.of_kind(TemplateKind::Library).count(), 1);
    assert_eq!(
        templates.get("template_21.sparql").unwrap().placeholders().unwrap(),
        vec!["[:node1]", "[:edge]", "[:node2]"]
    );
    assert_eq!(f.session.slots().max_nodes("template_21.sparql"), Some(2));
}

/// Test: a filled template evaluates like hand-written text
#[test]
fn test_template_fill_and_evaluate() {
    let mut f = fixture();
    let session = &mut f.session;

    session.compose_template("template_2.sparql").unwrap();
    let edge_id = session
        .full_graph()
        .edges
        .iter()
        .find(|e| e.label == "hasTopping" && e.from == "m1")
        .unwrap()
        .id
        .clone();

    assert!(matches!(
        session.compose_edge_selection(&edge_id).unwrap(),
        SelectionOutcome::Substituted { .. }
    ));
    assert!(matches!(
        session.compose_node_selection("t1").unwrap(),
        SelectionOutcome::Substituted { .. }
    ));
    assert!(session.query_text().ends_with("{ ?x  :hasTopping  :t1 . }"));

    // template_2 takes one node
    assert_eq!(session.compose_node_selection("m1").unwrap(), SelectionOutcome::Ignored);

    let evaluation = session.evaluate_query(Some(0));
    assert_eq!(evaluation.outcome, EvaluationOutcome::Success);
    assert_eq!(evaluation.result_text, "m1\n");
}

#[test]
fn test_configured_slots_and_undo() {
    let mut f = fixture();
    let session = &mut f.session;

    session.compose_template("template_21.sparql").unwrap();
    let template_text = session.query_text().to_string();

    session.compose_node_selection("m1").unwrap();
    session.compose_node_selection("Topping").unwrap();
    assert!(session.query_text().contains(" :m1"));
    assert!(session.query_text().contains("?x a  :Topping"));
    assert_eq!(session.composer().state().node_slots_filled, 2);

    session.undo_last_input();
    session.undo_last_input();
    assert_eq!(session.query_text(), template_text);
    assert_eq!(session.composer().state().node_slots_filled, 0);
}

#[test]
fn test_library_query_takes_no_slots() {
    let mut f = fixture();
    let session = &mut f.session;

    session.compose_template("all_pizzas.sparql").unwrap();
    assert_eq!(session.composer().selected_template(), None);
    assert!(session.query_text().starts_with("PREFIX : <http://example.org/pizza#>\n\n"));

    assert_eq!(session.compose_node_selection("t1").unwrap(), SelectionOutcome::Appended);
    session.undo_last_input();

    let evaluation = session.evaluate_query(Some(1));
    assert_eq!(evaluation.result_text, "m1\n");
    assert!(session.displayed_graph().contains_node("t1"));
}

#[test]
fn test_inconsistency_template_ask() {
    let mut f = fixture();
    let session = &mut f.session;

    session.compose_template("check_disjoint.sparql").unwrap();
    assert_eq!(session.composer().selected_template(), Some("check_disjoint.sparql"));

    // no slot entry for this template: selections are appended as text
    assert_eq!(session.compose_node_selection("Pizza").unwrap(), SelectionOutcome::Appended);
    session.undo_last_input();

    let text = session.query_text().replace("[:node1]", ":Pizza").replace("[:node2]", ":Topping");
    let evaluation = session.evaluate_text(&text, None);
    assert_eq!(evaluation.outcome, EvaluationOutcome::Success);
    assert_eq!(evaluation.result_text, "false\n");
}
