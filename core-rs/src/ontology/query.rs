/**
 * query.rs
 * SPARQL builders for ontology structure plus the prefix preamble
 * prepended to user-composed query text
 */

use std::collections::BTreeMap;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OBO_NS: &str = "http://purl.obolibrary.org/obo/";

/// Store-specific namespace bound to the `owlready:` prefix
pub const DEFAULT_STORE_NAMESPACE: &str =
    "http://www.lesfleursdunormal.fr/static/_downloads/owlready_ontology.owl#";

const STRUCTURE_PREFIXES: &str = r#"
            PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
            PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
            PREFIX owl: <http://www.w3.org/2002/07/owl#>
"#;

pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// All named classes, in IRI order
    pub fn named_classes() -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?class
            WHERE {{
                ?class rdf:type owl:Class .
                FILTER(isIRI(?class))
            }}
            ORDER BY ?class
            "#,
            STRUCTURE_PREFIXES
        ))
    }

    /// Direct named (sub, super) pairs
    pub fn subclass_pairs() -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?sub ?super
            WHERE {{
                ?sub rdfs:subClassOf ?super .
                FILTER(isIRI(?sub) && isIRI(?super) && ?sub != ?super)
            }}
            ORDER BY ?super ?sub
            "#,
            STRUCTURE_PREFIXES
        ))
    }

    /// Properties declared with the given OWL kind (`ObjectProperty`, `DatatypeProperty`)
    pub fn properties_of_kind(kind: &str) -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?property
            WHERE {{
                ?property rdf:type owl:{} .
                FILTER(isIRI(?property))
            }}
            ORDER BY ?property
            "#,
            STRUCTURE_PREFIXES, kind
        ))
    }

    /// Named `rdfs:domain` values of a property
    pub fn property_domains(property_iri: &str) -> Self {
        Self::property_axis(property_iri, "rdfs:domain")
    }

    /// Named `rdfs:range` values of a property
    pub fn property_ranges(property_iri: &str) -> Self {
        Self::property_axis(property_iri, "rdfs:range")
    }

    fn property_axis(property_iri: &str, axis: &str) -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?value
            WHERE {{
                <{}> {} ?value .
                FILTER(isIRI(?value))
            }}
            ORDER BY ?value
            "#,
            STRUCTURE_PREFIXES, property_iri, axis
        ))
    }

    /// Individuals typed with the class or any of its subclasses
    pub fn instances_of(class_iri: &str) -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?individual
            WHERE {{
                ?individual rdf:type/rdfs:subClassOf* <{}> .
                FILTER(isIRI(?individual))
            }}
            ORDER BY ?individual
            "#,
            STRUCTURE_PREFIXES, class_iri
        ))
    }

    /// Declared named classes of an individual
    pub fn individual_types(individual_iri: &str) -> Self {
        Self::new(format!(
            r#"{}
            SELECT DISTINCT ?class
            WHERE {{
                <{}> rdf:type ?class .
                ?class rdf:type owl:Class .
                FILTER(isIRI(?class))
            }}
            ORDER BY ?class
            "#,
            STRUCTURE_PREFIXES, individual_iri
        ))
    }

    /// Property assertions of an individual, `rdf:type` excluded
    pub fn individual_assertions(individual_iri: &str) -> Self {
        Self::new(format!(
            r#"{}
            SELECT ?property ?value
            WHERE {{
                <{}> ?property ?value .
                FILTER(?property != rdf:type)
            }}
            ORDER BY ?property ?value
            "#,
            STRUCTURE_PREFIXES, individual_iri
        ))
    }
}

/// Fixed prefix bindings prepended to every evaluated query
#[derive(Debug, Clone)]
pub struct PrefixPreamble {
    base_iri: String,
    store_namespace: String,
    extra: BTreeMap<String, String>,
}

impl PrefixPreamble {
    pub fn new(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: base_iri.into().trim_end_matches('#').to_string(),
            store_namespace: DEFAULT_STORE_NAMESPACE.to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_store_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.store_namespace = namespace.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.extra.insert(prefix.into(), iri.into());
        self
    }

    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    /// ` PREFIX : <base#>` as inserted by the PREFIX keyword
    pub fn default_prefix_declaration(&self) -> String {
        format!("PREFIX : <{}#>", self.base_iri)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("PREFIX rdf: <{}>\n", RDF_NS));
        out.push_str(&format!("PREFIX owl: <{}>\n", OWL_NS));
        out.push_str(&format!("PREFIX rdfs: <{}>\n", RDFS_NS));
        out.push_str(&format!("PREFIX xsd: <{}>\n", XSD_NS));
        out.push_str(&format!("PREFIX owlready: <{}>\n", self.store_namespace));
        out.push_str(&format!("PREFIX obo: <{}>\n", OBO_NS));
        for (prefix, iri) in &self.extra {
            out.push_str(&format!("PREFIX {}: <{}>\n", prefix, iri));
        }
        out.push_str(&self.default_prefix_declaration());
        out.push('\n');
        out
    }

    pub fn prefixed(&self, text: &str) -> String {
        format!("{}{}", self.render(), text)
    }
}
