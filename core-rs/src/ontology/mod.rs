/**
 * ontology module
 *
 * - store: the consumed ontology-store interface and result classification
 * - library: RDF/OWL ontology store on Oxigraph
 * - memory: in-memory store with canned query answers
 * - query: SPARQL builders and the prefix preamble
 */

pub mod library;
pub mod memory;
pub mod query;
pub mod store;

pub use library::OxigraphOntology;
pub use memory::{CannedResponse, InMemoryOntology};
pub use query::{PrefixPreamble, SparqlQuery};
pub use store::{
    local_name, AssertionValue, ClassDecl, Individual, OntologyStore, PropertyAssertion,
    PropertyDecl, ResultItem, ResultRow, StoreError,
};
