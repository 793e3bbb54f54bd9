//! # SQV Core - ontology graph and query view engine
//!
//! Turns an OWL/RDF ontology into a node/edge graph and drives a query
//! view over it: queries are composed fragment by fragment (templates,
//! graph selections, undo), evaluated against the ontology store, and the
//! results are projected back onto the graph as a bounded neighborhood.
//!
//! ## Architecture
//!
//! ```text
//! ontology store ──► OntologyGraphExtractor ──► Entity/RelationCatalog
//!       ▲                                              │
//!       │                                        GraphModel (full)
//!  QueryExecutor ◄── QueryComposer                     │
//!       │                                     color / size mutators
//!       └──► NeighborhoodExpander ──► displayed = full ∘ filter
//!                     │
//!               QueryHistory
//! ```
//!
//! A [`Session`] owns one instance of all of the above.

pub mod config;
pub mod errors;
pub mod graph;
pub mod ontology;
pub mod query;
pub mod session;

pub use config::SessionConfig;
pub use errors::{Result, SqvError};
pub use graph::{
    DisplayFilter, Edge, EdgeAttribute, GraphModel, Legend, Node, NodeAttribute,
    OntologyGraphExtractor,
};
pub use ontology::{InMemoryOntology, OntologyStore, OxigraphOntology, ResultItem, StoreError};
pub use query::{
    Evaluation, EvaluationOutcome, QueryComposer, QueryExecutor, QueryHistory, Selection,
    SelectionOutcome, TemplateCatalog, TemplateSlots,
};
pub use session::{Session, SessionOptions};

/// Version of the sqv.yaml session format
pub const VERSION: &str = "1.0.0";

/// Default session file name
pub const DEFAULT_SESSION_FILE: &str = config::CONFIG_FILE_NAME;
