/**
 * store.rs
 * Ontology store boundary: the read-only view the graph extractor walks,
 * plus the raw query entry point used by the query executor.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to load ontology: {0}")]
    LoadError(String),

    #[error("Ontology not found: {0}")]
    NotFound(String),

    #[error("Syntax error in query: {0}")]
    Syntax(String),

    #[error("Query evaluation failed: {0}")]
    Evaluation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the store rejected the query text itself (parse failure)
    pub fn is_syntax(&self) -> bool {
        matches!(self, StoreError::Syntax(_))
    }
}

/// A named class together with its direct named subclasses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub subclasses: Vec<String>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subclasses: Vec::new(),
        }
    }

    pub fn with_subclass(mut self, name: impl Into<String>) -> Self {
        self.subclasses.push(name.into());
        self
    }
}

/// Object or data property declaration.
///
/// `domain` holds class names. For object properties `range` holds class
/// names, for data properties it holds datatype names (`string`, `integer`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub domain: Vec<String>,
    pub range: Vec<String>,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Vec::new(),
            range: Vec::new(),
        }
    }

    pub fn domain(mut self, class: impl Into<String>) -> Self {
        self.domain.push(class.into());
        self
    }

    pub fn range(mut self, target: impl Into<String>) -> Self {
        self.range.push(target.into());
        self
    }
}

/// Value side of a property assertion on an individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionValue {
    /// Another named individual (or entity) referenced by name
    Individual(String),
    /// Lexical form of a literal
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAssertion {
    pub property: String,
    pub value: AssertionValue,
}

/// A-Box individual with its declared classes and property assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub name: String,
    /// Declared classes, first entry is the primary one
    pub types: Vec<String>,
    pub assertions: Vec<PropertyAssertion>,
}

impl Individual {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            assertions: Vec::new(),
        }
    }

    pub fn typed(mut self, class: impl Into<String>) -> Self {
        self.types.push(class.into());
        self
    }

    pub fn literal(mut self, property: impl Into<String>, value: impl ToString) -> Self {
        self.assertions.push(PropertyAssertion {
            property: property.into(),
            value: AssertionValue::Literal(value.to_string()),
        });
        self
    }

    pub fn relation(mut self, property: impl Into<String>, target: impl Into<String>) -> Self {
        self.assertions.push(PropertyAssertion {
            property: property.into(),
            value: AssertionValue::Individual(target.into()),
        });
        self
    }
}

/// One classified value of a query result row.
///
/// The store decides at its boundary whether a term has a stable name
/// identity (IRI) or is a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultItem {
    GraphElementRef { name: String },
    LiteralValue { value: String, datatype: String },
}

impl ResultItem {
    pub fn element(name: impl Into<String>) -> Self {
        ResultItem::GraphElementRef { name: name.into() }
    }

    pub fn literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        ResultItem::LiteralValue {
            value: value.into(),
            datatype: datatype.into(),
        }
    }

    /// Name of the referenced graph element, `None` for literals
    pub fn element_name(&self) -> Option<&str> {
        match self {
            ResultItem::GraphElementRef { name } => Some(name),
            ResultItem::LiteralValue { .. } => None,
        }
    }

    /// Text shown in the result listing
    pub fn display_text(&self) -> &str {
        match self {
            ResultItem::GraphElementRef { name } => name,
            ResultItem::LiteralValue { value, .. } => value,
        }
    }
}

pub type ResultRow = Vec<ResultItem>;

/// Read-only ontology access consumed by the extractor and the executor
pub trait OntologyStore {
    /// Base IRI of the loaded ontology (without trailing `#`)
    fn base_iri(&self) -> &str;

    fn classes(&self) -> Result<Vec<ClassDecl>, StoreError>;

    fn object_properties(&self) -> Result<Vec<PropertyDecl>, StoreError>;

    fn data_properties(&self) -> Result<Vec<PropertyDecl>, StoreError>;

    /// Individuals that are instances of `class` (directly or via a subclass)
    fn instances_of(&self, class: &str) -> Result<Vec<Individual>, StoreError>;

    /// Run an already prefixed query text
    fn query(&self, prefixed_query: &str) -> Result<Vec<ResultRow>, StoreError>;
}

/// Local name of an IRI: the part after `#`, else after the last `/`
pub fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_start_matches('<').trim_end_matches('>');
    if let Some((_, fragment)) = trimmed.rsplit_once('#') {
        if !fragment.is_empty() {
            return fragment;
        }
    }
    match trimmed.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => last,
        _ => trimmed,
    }
}
