/**
 * session.rs
 * One view session: owns the graph snapshots, the query being composed,
 * the last evaluation and the query history
 *
 * Every operation corresponds to one user event and runs to completion.
 * Sessions share nothing; open one per connection.
 */

use std::path::Path;
use tracing::{debug, info, info_span, Span};
use uuid::Uuid;

use crate::config::{resolve_path, SessionConfig, DEFAULT_HISTORY_WINDOW};
use crate::errors::{Result, SqvError};
use crate::graph::style::{self, Legend};
use crate::graph::{
    attribute_choice, DisplayFilter, EdgeAttribute, GraphModel, Layer, NodeAttribute,
    OntologyGraphExtractor, MERGE_SEPARATOR,
};
use crate::ontology::{OntologyStore, PrefixPreamble};
use crate::query::{
    project_results, Evaluation, Fragment, QueryComposer, QueryExecutor, QueryHistory, Selection,
    SelectionOutcome, TemplateCatalog, TemplateKind, TemplateSlots, DEFAULT_RESULT_DEPTH,
};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub include_instances: bool,
    pub default_depth: usize,
    /// Entries shown by `recent_history`
    pub history_window: usize,
    /// Defaults to the store's base IRI with the standard prefixes
    pub preamble: Option<PrefixPreamble>,
    pub templates: TemplateCatalog,
    pub slots: TemplateSlots,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            include_instances: true,
            default_depth: DEFAULT_RESULT_DEPTH,
            history_window: DEFAULT_HISTORY_WINDOW,
            preamble: None,
            templates: TemplateCatalog::new(),
            slots: TemplateSlots::new(),
        }
    }
}

impl SessionOptions {
    pub fn new(include_instances: bool) -> Self {
        Self {
            include_instances,
            ..Default::default()
        }
    }

    /// Options described by a session file; relative template
    /// directories are resolved against `root`
    pub fn from_config(config: &SessionConfig, root: &Path) -> Result<Self> {
        let settings = config.query_settings();
        let mut templates = TemplateCatalog::new();
        if let Some(dirs) = &config.spec.templates {
            let sources = [
                (&dirs.standard, TemplateKind::Standard),
                (&dirs.inconsistency, TemplateKind::Inconsistency),
                (&dirs.library, TemplateKind::Library),
            ];
            for (dir, kind) in sources {
                if let Some(dir) = dir {
                    templates.load_dir(&resolve_path(root, dir), kind)?;
                }
            }
        }

        Ok(Self {
            include_instances: config.spec.include_instances,
            default_depth: settings.default_depth,
            history_window: settings.history_window,
            preamble: Some(config.preamble()),
            templates,
            slots: config.template_slots(),
        })
    }
}

pub struct Session<S: OntologyStore> {
    id: Uuid,
    span: Span,
    store: S,
    full: GraphModel,
    filter: DisplayFilter,
    node_legend: Legend,
    edge_legend: Legend,
    composer: QueryComposer,
    executor: QueryExecutor,
    history: QueryHistory,
    history_window: usize,
    templates: TemplateCatalog,
    slots: TemplateSlots,
    depth: usize,
    last: Option<Evaluation>,
}

impl<S: OntologyStore> Session<S> {
    /// Extract the graph from `store` and start with an empty query
    pub fn open(store: S, options: SessionOptions) -> Result<Self> {
        let id = Uuid::new_v4();
        let span = info_span!("session", id = %id);
        let _entered = span.enter();

        let extraction = OntologyGraphExtractor::new(options.include_instances).extract(&store)?;
        let full = GraphModel::materialize(&extraction);
        info!(
            "Session opened: {} nodes, {} edges",
            full.nodes.len(),
            full.edges.len()
        );

        let preamble = options
            .preamble
            .unwrap_or_else(|| PrefixPreamble::new(store.base_iri()));
        let composer = QueryComposer::new(preamble.base_iri());

        drop(_entered);
        Ok(Self {
            id,
            span,
            store,
            full,
            filter: DisplayFilter::All,
            node_legend: Legend::default(),
            edge_legend: Legend::default(),
            composer,
            executor: QueryExecutor::new(preamble),
            history: QueryHistory::new(),
            history_window: options.history_window,
            templates: options.templates,
            slots: options.slots,
            depth: options.default_depth,
            last: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn full_graph(&self) -> &GraphModel {
        &self.full
    }

    pub fn filter(&self) -> &DisplayFilter {
        &self.filter
    }

    pub fn displayed_graph(&self) -> GraphModel {
        self.full.project(&self.filter)
    }

    pub fn search(&self, text: &str) -> GraphModel {
        self.displayed_graph().search(text)
    }

    pub fn node_legend(&self) -> &Legend {
        &self.node_legend
    }

    pub fn edge_legend(&self) -> &Legend {
        &self.edge_legend
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    pub fn slots(&self) -> &TemplateSlots {
        &self.slots
    }

    // Styling

    /// Recolor nodes by attribute name (`"None"` resets)
    pub fn color_nodes_by(&mut self, attribute: &str) -> Result<&Legend> {
        let _entered = self.span.enter();
        let attribute = attribute_choice::<NodeAttribute>(attribute)?;
        let (graph, legend) = style::color_nodes_by(&self.full, attribute);
        self.full = graph;
        self.node_legend = legend;
        info!("Nodes recolored by {:?}", attribute);
        Ok(&self.node_legend)
    }

    pub fn color_edges_by(&mut self, attribute: &str) -> Result<&Legend> {
        let _entered = self.span.enter();
        let attribute = attribute_choice::<EdgeAttribute>(attribute)?;
        let (graph, legend) = style::color_edges_by(&self.full, attribute);
        self.full = graph;
        self.edge_legend = legend;
        info!("Edges recolored by {:?}", attribute);
        Ok(&self.edge_legend)
    }

    pub fn size_nodes_by(&mut self, attribute: &str) -> Result<()> {
        let _entered = self.span.enter();
        let attribute = attribute_choice::<NodeAttribute>(attribute)?;
        self.full = style::size_nodes_by(&self.full, attribute)?;
        info!("Nodes resized by {:?}", attribute);
        Ok(())
    }

    pub fn size_edges_by(&mut self, attribute: &str) -> Result<()> {
        let _entered = self.span.enter();
        let attribute = attribute_choice::<EdgeAttribute>(attribute)?;
        self.full = style::size_edges_by(&self.full, attribute)?;
        info!("Edges resized by {:?}", attribute);
        Ok(())
    }

    /// Color and size by the first discovered feature of each kind
    pub fn apply_initial_styling(&mut self) -> Result<()> {
        if let Some(attribute) = style::categorical_node_features(&self.full).first() {
            self.color_nodes_by(attribute.name())?;
        }
        if let Some(attribute) = style::categorical_edge_features(&self.full).first() {
            self.color_edges_by(attribute.name())?;
        }
        if let Some(attribute) = style::numerical_node_features(&self.full).first() {
            self.size_nodes_by(attribute.name())?;
        }
        if let Some(attribute) = style::numerical_edge_features(&self.full).first() {
            self.size_edges_by(attribute.name())?;
        }
        Ok(())
    }

    // Query composition

    pub fn query_text(&self) -> &str {
        self.composer.text()
    }

    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    pub fn compose_keyword(&mut self, keyword: &str) {
        let _entered = self.span.enter();
        self.composer.append_keyword(keyword);
    }

    pub fn compose_variable(&mut self, variable: &str) {
        let _entered = self.span.enter();
        self.composer.append_variable(variable);
    }

    pub fn compose_symbol(&mut self, symbol: &str) {
        let _entered = self.span.enter();
        self.composer.append_symbol(symbol);
    }

    pub fn compose_free_text(&mut self, text: &str) {
        let _entered = self.span.enter();
        self.composer.append_free_text(text);
    }

    /// Load a catalog template; library queries load without slots
    pub fn compose_template(&mut self, template_id: &str) -> Result<()> {
        let _entered = self.span.enter();
        let template = self.templates.get(template_id)?;
        match template.kind {
            TemplateKind::Library => self.composer.append_library_query(&template.body),
            TemplateKind::Standard | TemplateKind::Inconsistency => {
                self.composer.append_template(&template.id, &template.body)
            }
        }
        Ok(())
    }

    pub fn compose_node_selection(&mut self, node_id: &str) -> Result<SelectionOutcome> {
        let _entered = self.span.clone().entered();
        if !self.full.contains_node(node_id) {
            return Err(SqvError::UnknownElement(node_id.to_string()));
        }
        Ok(self.select(Selection::Node(node_id.to_string())))
    }

    /// Edges are inserted by label
    pub fn compose_edge_selection(&mut self, edge_id: &str) -> Result<SelectionOutcome> {
        let _entered = self.span.clone().entered();
        let label = self
            .full
            .edge(edge_id)
            .map(|e| e.label.clone())
            .ok_or_else(|| SqvError::UnknownElement(edge_id.to_string()))?;
        Ok(self.select(Selection::Edge(label)))
    }

    fn select(&mut self, selection: Selection) -> SelectionOutcome {
        let template = self.composer.selected_template().map(str::to_string);
        self.composer
            .append_from_selection(&selection, template.as_deref(), &self.slots)
    }

    pub fn undo_last_input(&mut self) -> Option<Fragment> {
        let _entered = self.span.enter();
        self.composer.undo_last()
    }

    pub fn clear_query(&mut self) {
        let _entered = self.span.enter();
        self.composer.clear();
    }

    // Evaluation

    /// Evaluate the composed query; `None` keeps the current depth
    pub fn evaluate_query(&mut self, depth: Option<usize>) -> &Evaluation {
        let text = self.composer.text().to_string();
        self.evaluate_text(&text, depth)
    }

    /// Evaluate arbitrary query text as if it had been composed
    pub fn evaluate_text(&mut self, text: &str, depth: Option<usize>) -> &Evaluation {
        let _entered = self.span.enter();
        if let Some(depth) = depth {
            self.depth = depth;
        }

        let evaluation = self.executor.evaluate(&self.store, &self.full, text, self.depth);
        if evaluation.outcome.records_history() {
            let sequence = self.history.record(text);
            debug!("Recorded query #{}", sequence);
        }
        self.filter = evaluation.filter.clone();
        drop(_entered);
        self.last.insert(evaluation)
    }

    /// Re-expand the last result set at another depth without querying again
    pub fn set_result_depth(&mut self, depth: usize) -> Option<&Evaluation> {
        let _entered = self.span.enter();
        self.depth = depth;
        let evaluation = self.last.as_mut()?;
        let (selection, filter) = project_results(&self.full, &evaluation.results, depth);
        evaluation.displayed = self.full.project(&filter);
        evaluation.selection = selection;
        evaluation.filter = filter.clone();
        self.filter = filter;
        debug!("Result depth set to {}", depth);
        self.last.as_ref()
    }

    pub fn result_depth(&self) -> usize {
        self.depth
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last.as_ref()
    }

    pub fn result_text(&self) -> &str {
        self.last.as_ref().map(|e| e.result_text.as_str()).unwrap_or("")
    }

    // History

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn history_window(&self, n: usize) -> String {
        self.history.window(n)
    }

    /// Configured number of entries for the default history view
    pub fn history_window_size(&self) -> usize {
        self.history_window
    }

    pub fn recent_history(&self) -> String {
        self.history.window(self.history_window)
    }

    pub fn clear_history(&mut self) {
        let _entered = self.span.enter();
        self.history.clear();
    }

    // Element details

    /// Literal property fragments of an A-box node; `None` for T-box nodes
    pub fn node_details(&self, node_id: &str) -> Result<Option<Vec<String>>> {
        let node = self
            .full
            .node(node_id)
            .ok_or_else(|| SqvError::UnknownElement(node_id.to_string()))?;
        if node.layer == Layer::T {
            return Ok(None);
        }
        if node.title.is_empty() {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(
            node.title.split(MERGE_SEPARATOR).map(str::to_string).collect(),
        ))
    }

    /// `(label, identifier)` for every relation merged into an edge
    pub fn edge_details(&self, edge_id: &str) -> Result<Vec<(String, String)>> {
        let edge = self
            .full
            .edge(edge_id)
            .ok_or_else(|| SqvError::UnknownElement(edge_id.to_string()))?;
        Ok(edge
            .labels()
            .zip(edge.constituents())
            .map(|(label, id)| (label.to_string(), id.to_string()))
            .collect())
    }
}
