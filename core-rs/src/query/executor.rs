/**
 * executor.rs
 * Runs composed query text against the ontology store and projects the
 * results back onto the graph
 *
 * Store failures never escape `evaluate`; they become an outcome plus the
 * text shown to the user, and the full graph is displayed again.
 */

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::graph::{DisplayFilter, GraphModel, NeighborhoodExpander};
use crate::ontology::{OntologyStore, PrefixPreamble, ResultItem};

pub const EMPTY_QUERY_TEXT: &str = "There is nothing to evaluate.";
pub const NO_RESULTS_TEXT: &str = "No results for this SPARQL query.";
pub const SYNTAX_ERROR_TEXT: &str = "Syntax Error in SPARQL Query.";
pub const RUNTIME_ERROR_TEXT: &str = "An unknown Error occurred! Possible reasons are: \n - Used Prefix is not defined \n - Structural mistake in query";

pub const DEFAULT_RESULT_DEPTH: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Empty,
    SyntaxError,
    RuntimeError,
    NoResults,
    Success,
}

impl EvaluationOutcome {
    /// Whether the evaluated text belongs in the query history
    pub fn records_history(&self) -> bool {
        matches!(self, EvaluationOutcome::NoResults | EvaluationOutcome::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationOutcome::SyntaxError | EvaluationOutcome::RuntimeError)
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcome: EvaluationOutcome,
    pub result_text: String,
    /// Flattened results in store order
    pub results: Vec<ResultItem>,
    /// Result nodes found in the graph, before expansion
    pub selection: Vec<String>,
    pub filter: DisplayFilter,
    pub displayed: GraphModel,
}

impl Evaluation {
    fn unfiltered(outcome: EvaluationOutcome, text: &str, graph: &GraphModel) -> Self {
        Self {
            outcome,
            result_text: text.to_string(),
            results: Vec::new(),
            selection: Vec::new(),
            filter: DisplayFilter::All,
            displayed: graph.clone(),
        }
    }
}

/// Seeds and display filter for a result set at a given depth
pub fn project_results(graph: &GraphModel, results: &[ResultItem], depth: usize) -> (Vec<String>, DisplayFilter) {
    if !results.iter().any(|r| r.element_name().is_some()) {
        return (Vec::new(), DisplayFilter::All);
    }
    let expander = NeighborhoodExpander::new(graph);
    let seeds = expander.seeds(results.iter().filter_map(ResultItem::element_name));
    let neighborhood = expander.expand(seeds, depth);
    let filter = neighborhood.filter();
    (neighborhood.seeds, filter)
}

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    preamble: PrefixPreamble,
}

impl QueryExecutor {
    pub fn new(preamble: PrefixPreamble) -> Self {
        Self { preamble }
    }

    pub fn preamble(&self) -> &PrefixPreamble {
        &self.preamble
    }

    pub fn evaluate<S: OntologyStore + ?Sized>(
        &self,
        store: &S,
        graph: &GraphModel,
        text: &str,
        depth: usize,
    ) -> Evaluation {
        if text.trim().is_empty() {
            warn!("Query is empty, nothing to evaluate");
            return Evaluation::unfiltered(EvaluationOutcome::Empty, EMPTY_QUERY_TEXT, graph);
        }

        let rows = match store.query(&self.preamble.prefixed(text)) {
            Ok(rows) => rows,
            Err(e) if e.is_syntax() => {
                warn!("Query has a syntax error: {}", e);
                return Evaluation::unfiltered(EvaluationOutcome::SyntaxError, SYNTAX_ERROR_TEXT, graph);
            }
            Err(e) => {
                warn!("Query failed: {}", e);
                return Evaluation::unfiltered(EvaluationOutcome::RuntimeError, RUNTIME_ERROR_TEXT, graph);
            }
        };

        let results: Vec<ResultItem> = rows.into_iter().flatten().collect();
        if results.is_empty() {
            info!("Query evaluated with no results");
            return Evaluation::unfiltered(EvaluationOutcome::NoResults, NO_RESULTS_TEXT, graph);
        }

        let result_text: String = results
            .iter()
            .map(|r| format!("{}\n", r.display_text()))
            .collect();
        let (selection, filter) = project_results(graph, &results, depth);
        let displayed = graph.project(&filter);

        info!(
            "Query evaluated: {} results, {} seeds, {} nodes displayed",
            results.len(),
            selection.len(),
            displayed.nodes.len()
        );

        Evaluation {
            outcome: EvaluationOutcome::Success,
            result_text,
            results,
            selection,
            filter,
            displayed,
        }
    }
}
