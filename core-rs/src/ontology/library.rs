/**
 * library.rs
 * Oxigraph-backed ontology store: loads an RDF/OWL document into an
 * in-memory store and answers structure and user queries over SPARQL
 */

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;
use oxigraph::sparql::{Query, QueryResults, QuerySolution};
use oxigraph::store::Store;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::query::SparqlQuery;
use super::store::{
    local_name, AssertionValue, ClassDecl, Individual, OntologyStore, PropertyAssertion,
    PropertyDecl, ResultItem, ResultRow, StoreError,
};

pub struct OxigraphOntology {
    store: Store,
    base_iri: String,
    source: Option<PathBuf>,
    /// local name -> full IRI, first subject wins
    names: HashMap<String, String>,
}

impl OxigraphOntology {
    /// Load an ontology file, picking the RDF syntax from the extension
    pub fn load(iri: &str, path: &Path) -> Result<Self, StoreError> {
        info!("Loading ontology file: {:?}", path);

        if !path.exists() {
            return Err(StoreError::NotFound(format!("File not found: {:?}", path)));
        }

        if path.is_dir() {
            return Err(StoreError::LoadError(format!("Path is a directory: {:?}", path)));
        }

        let content = fs::read_to_string(path)?;
        let mut ontology = Self::from_str(iri, &content, Self::format_for(path))?;
        ontology.source = Some(path.to_path_buf());
        Ok(ontology)
    }

    pub fn from_turtle(iri: &str, content: &str) -> Result<Self, StoreError> {
        Self::from_str(iri, content, RdfFormat::Turtle)
    }

    pub fn from_str(iri: &str, content: &str, format: RdfFormat) -> Result<Self, StoreError> {
        let store = Store::new().map_err(|e| StoreError::LoadError(e.to_string()))?;
        let base_iri = iri.trim_end_matches('#').to_string();

        let parser = RdfParser::from_format(format)
            .with_base_iri(format!("{}#", base_iri))
            .map_err(|e| StoreError::LoadError(e.to_string()))?;

        store
            .load_from_reader(parser, content.as_bytes())
            .map_err(|e| StoreError::LoadError(e.to_string()))?;

        let mut ontology = Self {
            store,
            base_iri,
            source: None,
            names: HashMap::new(),
        };
        ontology.index_names()?;

        info!(
            "Ontology {} loaded ({} named resources)",
            ontology.base_iri,
            ontology.names.len()
        );
        Ok(ontology)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn format_for(path: &Path) -> RdfFormat {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("nt") => RdfFormat::NTriples,
            Some("owl") | Some("rdf") | Some("xml") => RdfFormat::RdfXml,
            _ => RdfFormat::Turtle,
        }
    }

    fn index_names(&mut self) -> Result<(), StoreError> {
        let query = SparqlQuery::new(
            "SELECT DISTINCT ?s WHERE { ?s ?p ?o . FILTER(isIRI(?s)) } ORDER BY ?s",
        );
        for iri in self.select_iris(&query, "s")? {
            self.names
                .entry(local_name(&iri).to_string())
                .or_insert(iri);
        }
        Ok(())
    }

    /// Full IRI for a local name; unknown names are placed in the base namespace
    fn resolve(&self, name: &str) -> String {
        self.names
            .get(name)
            .cloned()
            .unwrap_or_else(|| format!("{}#{}", self.base_iri, name))
    }

    fn solutions(&self, query: &SparqlQuery) -> Result<Vec<QuerySolution>, StoreError> {
        let results = self
            .store
            .query(query.as_str())
            .map_err(|e| StoreError::Evaluation(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => solutions
                .map(|solution| solution.map_err(|e| StoreError::Evaluation(e.to_string())))
                .collect(),
            _ => Err(StoreError::Evaluation(
                "Structure queries must return solutions".to_string(),
            )),
        }
    }

    /// IRIs bound to `var`, other terms ignored
    fn select_iris(&self, query: &SparqlQuery, var: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .solutions(query)?
            .iter()
            .filter_map(|solution| match solution.get(var) {
                Some(Term::NamedNode(node)) => Some(node.as_str().to_string()),
                _ => None,
            })
            .collect())
    }

    fn select_names(&self, query: &SparqlQuery, var: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .select_iris(query, var)?
            .iter()
            .map(|iri| local_name(iri).to_string())
            .collect())
    }

    fn properties(&self, kind: &str) -> Result<Vec<PropertyDecl>, StoreError> {
        let mut properties = Vec::new();
        for iri in self.select_iris(&SparqlQuery::properties_of_kind(kind), "property")? {
            properties.push(PropertyDecl {
                name: local_name(&iri).to_string(),
                domain: self.select_names(&SparqlQuery::property_domains(&iri), "value")?,
                range: self.select_names(&SparqlQuery::property_ranges(&iri), "value")?,
            });
        }
        Ok(properties)
    }

    fn individual(&self, iri: &str) -> Result<Individual, StoreError> {
        let types = self.select_names(&SparqlQuery::individual_types(iri), "class")?;

        let mut assertions = Vec::new();
        for solution in self.solutions(&SparqlQuery::individual_assertions(iri))? {
            let property = match solution.get("property") {
                Some(Term::NamedNode(node)) => local_name(node.as_str()).to_string(),
                _ => continue,
            };
            let value = match solution.get("value") {
                Some(Term::NamedNode(node)) => {
                    AssertionValue::Individual(local_name(node.as_str()).to_string())
                }
                Some(Term::Literal(literal)) => AssertionValue::Literal(literal.value().to_string()),
                _ => continue,
            };
            assertions.push(PropertyAssertion { property, value });
        }

        Ok(Individual {
            name: local_name(iri).to_string(),
            types,
            assertions,
        })
    }
}

/// Store boundary classification: IRIs carry name identity, everything else is a value
fn classify(term: &Term) -> ResultItem {
    match term {
        Term::NamedNode(node) => ResultItem::element(local_name(node.as_str())),
        Term::Literal(literal) => {
            ResultItem::literal(literal.value(), local_name(literal.datatype().as_str()))
        }
        Term::BlankNode(node) => ResultItem::literal(node.to_string(), "BlankNode"),
        #[allow(unreachable_patterns)]
        other => ResultItem::literal(other.to_string(), "Triple"),
    }
}

impl OntologyStore for OxigraphOntology {
    fn base_iri(&self) -> &str {
        &self.base_iri
    }

    fn classes(&self) -> Result<Vec<ClassDecl>, StoreError> {
        let names = self.select_names(&SparqlQuery::named_classes(), "class")?;

        let mut subclasses: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for solution in self.solutions(&SparqlQuery::subclass_pairs())? {
            if let (Some(Term::NamedNode(sub)), Some(Term::NamedNode(sup))) =
                (solution.get("sub"), solution.get("super"))
            {
                subclasses
                    .entry(local_name(sup.as_str()).to_string())
                    .or_default()
                    .push(local_name(sub.as_str()).to_string());
            }
        }

        Ok(names
            .into_iter()
            .map(|name| {
                let subs = subclasses
                    .get(&name)
                    .map(|subs| subs.iter().filter(|s| *s != &name).cloned().collect())
                    .unwrap_or_default();
                ClassDecl { name, subclasses: subs }
            })
            .collect())
    }

    fn object_properties(&self) -> Result<Vec<PropertyDecl>, StoreError> {
        self.properties("ObjectProperty")
    }

    fn data_properties(&self) -> Result<Vec<PropertyDecl>, StoreError> {
        self.properties("DatatypeProperty")
    }

    fn instances_of(&self, class: &str) -> Result<Vec<Individual>, StoreError> {
        let class_iri = self.resolve(class);
        let mut individuals = Vec::new();
        for iri in self.select_iris(&SparqlQuery::instances_of(&class_iri), "individual")? {
            individuals.push(self.individual(&iri)?);
        }
        Ok(individuals)
    }

    fn query(&self, prefixed_query: &str) -> Result<Vec<ResultRow>, StoreError> {
        let parsed = Query::parse(prefixed_query, None)
            .map_err(|e| StoreError::Syntax(e.to_string()))?;

        let results = self
            .store
            .query(parsed)
            .map_err(|e| StoreError::Evaluation(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();

                for solution in solutions {
                    let solution = solution.map_err(|e| StoreError::Evaluation(e.to_string()))?;
                    rows.push(solution.iter().map(|(_, term)| classify(term)).collect());
                }

                debug!("Query returned {} rows", rows.len());
                Ok(rows)
            }
            QueryResults::Boolean(result) => {
                Ok(vec![vec![ResultItem::literal(result.to_string(), "boolean")]])
            }
            QueryResults::Graph(triples) => {
                let mut rows = Vec::new();

                for triple in triples {
                    let triple = triple.map_err(|e| StoreError::Evaluation(e.to_string()))?;
                    rows.push(vec![
                        classify(&Term::from(triple.subject)),
                        classify(&Term::from(triple.predicate)),
                        classify(&triple.object),
                    ]);
                }

                Ok(rows)
            }
        }
    }
}
