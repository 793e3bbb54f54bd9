/**
 * graph module
 *
 * - catalog: EntityCatalog / RelationCatalog with edge merge rules
 * - extractor: ontology walk that fills the catalogs
 * - model: materialized GraphModel, attributes, projection and search
 * - style: color and size mutators, feature discovery
 * - neighborhood: bounded outgoing-edge expansion of result nodes
 */

pub mod catalog;
pub mod extractor;
pub mod model;
pub mod neighborhood;
pub mod style;

pub use catalog::{
    Edge, EntityCatalog, Layer, MergeOutcome, Node, RelationCatalog, Shape, BASE_IMPORTANCE,
    DEFAULT_COLOR, DEFAULT_EDGE_WIDTH, DEFAULT_NODE_SIZE, IS_A, MERGE_SEPARATOR,
};
pub use extractor::{Extraction, OntologyGraphExtractor};
pub use model::{
    attribute_choice, AttributeValue, DisplayFilter, EdgeAttribute, GraphModel, MinMax,
    NodeAttribute, ScalingVars,
};
pub use neighborhood::{Neighborhood, NeighborhoodExpander};
pub use style::{Legend, LegendEntry};
