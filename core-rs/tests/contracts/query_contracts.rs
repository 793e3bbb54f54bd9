// Query Contract Tests
//
// These tests pin the composer, evaluation and history behavior that the
// query view relies on. Each test states what breaks downstream if it fails.

use sqv_core::ontology::{CannedResponse, Individual, PrefixPreamble, ResultItem};
use sqv_core::query::{
    EvaluationOutcome, QueryComposer, QueryExecutor, QueryHistory, Selection, SelectionOutcome,
    TemplateSlots,
};
use sqv_core::{GraphModel, InMemoryOntology, Session, SessionOptions};

const IRI: &str = "http://example.org/onto";
const ALL_PLACEHOLDERS: &str =
    "SELECT * WHERE { [:node1] [:edge1] [:node2] . [:node2] [:edge2] [:node3] . [:node3] [:edge3] [node] }";

fn scenario() -> InMemoryOntology {
    InMemoryOntology::new(IRI)
        .class("A")
        .subclass("B", "A")
        .individual(Individual::new("b1").typed("B"))
        .individual(Individual::new("b2").typed("B"))
        .respond(
            "?x a :A",
            CannedResponse::Rows(vec![
                vec![ResultItem::element("b1")],
                vec![ResultItem::element("b2")],
            ]),
        )
}

fn select(composer: &mut QueryComposer, template: &str, slots: &TemplateSlots, selection: Selection) -> SelectionOutcome {
    composer.append_from_selection(&selection, Some(template), slots)
}

/// WHY: undo must restore exactly the template the user started from
/// BREAKS: re-filling a template after undo (placeholders would be lost)
#[test]
fn selection_then_undo_restores_template_for_every_builtin() {
    let slots = TemplateSlots::new();

    for (template, limits) in slots.entries() {
        let mut composer = QueryComposer::new(IRI);
        composer.append_template(&template, ALL_PLACEHOLDERS);
        let original = composer.text().to_string();

        let nodes = limits.max_nodes.unwrap_or(0);
        let edges = limits.max_edges.unwrap_or(0);
        for i in 0..nodes.min(4) {
            select(&mut composer, &template, &slots, Selection::Node(format!("N{}", i)));
        }
        for i in 0..edges.min(3) {
            select(&mut composer, &template, &slots, Selection::Edge(format!("e{}", i)));
        }

        while composer.state().fragments.len() > 1 {
            composer.undo_last();
        }

        assert_eq!(composer.text(), original, "template {}", template);
        assert_eq!(composer.state().node_slots_filled, 0, "template {}", template);
        assert_eq!(composer.state().edge_slots_filled, 0, "template {}", template);
    }
}

/// WHY: every accepted input is one undo step, every ignored one is none
/// BREAKS: undo removing the wrong fragment
#[test]
fn fragment_stack_moves_in_lock_step_with_inputs() {
    let slots = TemplateSlots::new();
    let mut composer = QueryComposer::new(IRI);
    composer.append_template("template_2.sparql", "SELECT ?x WHERE { ?x [:edge] [:node] . }");
    assert_eq!(composer.state().fragments.len(), 1);

    let outcome = select(&mut composer, "template_2.sparql", &slots, Selection::Node("A".into()));
    assert_eq!(outcome, SelectionOutcome::Substituted { placeholder: "[:node]".into() });
    assert_eq!(composer.state().fragments.len(), 2);

    // template_2 takes a single node
    let outcome = select(&mut composer, "template_2.sparql", &slots, Selection::Node("B".into()));
    assert_eq!(outcome, SelectionOutcome::Ignored);
    assert_eq!(composer.state().fragments.len(), 2);
    assert!(!composer.text().contains(":B"));

    composer.append_free_text("LIMIT 5");
    assert_eq!(composer.state().fragment_tags(), vec!["user_input", "select_node", "user_input"]);

    composer.undo_last();
    composer.undo_last();
    assert!(composer.text().ends_with("?x [:edge] [:node] . }"));
    assert_eq!(composer.state().fragment_tags(), vec!["user_input"]);
}

/// WHY: without a slot entry the selection is plain text
#[test]
fn selection_without_slot_entry_is_appended() {
    let slots = TemplateSlots::new();
    let mut composer = QueryComposer::new(IRI);
    composer.append_template("custom.sparql", "SELECT ?x WHERE { ?x a [:node] }");

    let outcome = select(&mut composer, "custom.sparql", &slots, Selection::Node("A".into()));
    assert_eq!(outcome, SelectionOutcome::Appended);
    assert!(composer.text().ends_with("[:node] } :A"));
}

/// WHY: an empty query is not an attempt worth remembering
/// BREAKS: history numbering after accidental evaluations
#[test]
fn empty_query_leaves_history_unchanged() {
    let mut session = Session::open(scenario(), SessionOptions::new(true)).unwrap();
    let evaluation = session.evaluate_query(None);
    assert_eq!(evaluation.outcome, EvaluationOutcome::Empty);

    assert!(session.history().is_empty());
    assert_eq!(session.history().counter(), 0);
    assert_eq!(session.history_window(5), "");
}

/// WHY: the reference composition produces the instances of A, one per line
#[test]
fn scenario_composition_lists_instances() {
    let mut session = Session::open(scenario(), SessionOptions::new(true)).unwrap();
    session.compose_keyword("SELECT");
    session.compose_variable("?x");
    session.compose_keyword("WHERE");
    session.compose_symbol("{");
    session.compose_free_text("?x a :A");
    session.compose_symbol("}");
    assert_eq!(session.query_text(), " SELECT ?x WHERE { ?x a :A }");

    let evaluation = session.evaluate_query(Some(0));
    assert_eq!(evaluation.outcome, EvaluationOutcome::Success);
    assert_eq!(evaluation.result_text, "b1\nb2\n");

    let shown: Vec<&str> = evaluation.displayed.node_ids().collect();
    assert_eq!(shown, vec!["b1", "b2"]);
}

/// WHY: the history window is rendered from sequence numbers, not positions
/// BREAKS: history display after clearing
#[test]
fn history_numbering_and_clear() {
    let mut history = QueryHistory::new();
    for q in ["q1", "q2", "q3"] {
        history.record(q);
    }
    assert_eq!(history.window(2), "2: q2\n3: q3\n");

    history.clear();
    assert_eq!(history.window(5), "");
    assert_eq!(history.record("q4"), 1);
    assert_eq!(history.window(5), "1: q4\n");
}

/// WHY: only attempts with a well-formed outcome enter the history
#[test]
fn only_success_and_no_results_are_recorded() {
    let store = scenario()
        .respond("BROKEN", CannedResponse::SyntaxError("unexpected token".into()))
        .respond("undefined:", CannedResponse::Failure("unknown prefix".into()));
    let executor = QueryExecutor::new(PrefixPreamble::new(IRI));
    let graph = GraphModel::from_parts(Vec::new(), Vec::new());

    let cases = [
        ("BROKEN", EvaluationOutcome::SyntaxError),
        ("SELECT ?x WHERE { ?x a undefined:X }", EvaluationOutcome::RuntimeError),
        ("SELECT ?x WHERE { ?x a :Nothing }", EvaluationOutcome::NoResults),
        ("SELECT ?x WHERE { ?x a :A }", EvaluationOutcome::Success),
    ];
    for (text, expected) in cases {
        let evaluation = executor.evaluate(&store, &graph, text, 1);
        assert_eq!(evaluation.outcome, expected, "{}", text);
        assert_eq!(
            evaluation.outcome.records_history(),
            matches!(expected, EvaluationOutcome::NoResults | EvaluationOutcome::Success)
        );
    }
}
