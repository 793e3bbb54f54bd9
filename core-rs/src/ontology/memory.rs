/**
 * memory.rs
 * In-memory ontology store for embedding and tests.
 * Structure is declared through a builder; query answers are canned and
 * matched by substring against the prefixed query text.
 */

use std::collections::{HashSet, VecDeque};

use super::store::{
    ClassDecl, Individual, OntologyStore, PropertyDecl, ResultRow, StoreError,
};

/// Canned answer to a query
#[derive(Debug, Clone)]
pub enum CannedResponse {
    Rows(Vec<ResultRow>),
    SyntaxError(String),
    Failure(String),
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    base_iri: String,
    classes: Vec<ClassDecl>,
    object_properties: Vec<PropertyDecl>,
    data_properties: Vec<PropertyDecl>,
    individuals: Vec<Individual>,
    responses: Vec<(String, CannedResponse)>,
}

impl InMemoryOntology {
    pub fn new(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: base_iri.into().trim_end_matches('#').to_string(),
            ..Default::default()
        }
    }

    /// Declare a class; repeated names are ignored
    pub fn class(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.classes.iter().any(|c| c.name == name) {
            self.classes.push(ClassDecl::new(name));
        }
        self
    }

    /// Declare `sub` as a direct subclass of `superclass`, declaring both if needed
    pub fn subclass(mut self, sub: impl Into<String>, superclass: impl Into<String>) -> Self {
        let sub = sub.into();
        let superclass = superclass.into();
        self = self.class(superclass.clone()).class(sub.clone());
        if let Some(decl) = self.classes.iter_mut().find(|c| c.name == superclass) {
            if !decl.subclasses.contains(&sub) {
                decl.subclasses.push(sub);
            }
        }
        self
    }

    pub fn object_property(mut self, property: PropertyDecl) -> Self {
        self.object_properties.push(property);
        self
    }

    pub fn data_property(mut self, property: PropertyDecl) -> Self {
        self.data_properties.push(property);
        self
    }

    pub fn individual(mut self, individual: Individual) -> Self {
        self.individuals.push(individual);
        self
    }

    /// Answer queries containing `pattern` with `response`; first match wins
    pub fn respond(mut self, pattern: impl Into<String>, response: CannedResponse) -> Self {
        self.responses.push((pattern.into(), response));
        self
    }

    /// `class` plus every class reachable through the subclass relation
    fn class_closure(&self, class: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([class.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(decl) = self.classes.iter().find(|c| c.name == current) {
                queue.extend(decl.subclasses.iter().cloned());
            }
        }
        seen
    }
}

impl OntologyStore for InMemoryOntology {
    fn base_iri(&self) -> &str {
        &self.base_iri
    }

    fn classes(&self) -> Result<Vec<ClassDecl>, StoreError> {
        Ok(self.classes.clone())
    }

    fn object_properties(&self) -> Result<Vec<PropertyDecl>, StoreError> {
        Ok(self.object_properties.clone())
    }

    fn data_properties(&self) -> Result<Vec<PropertyDecl>, StoreError> {
        Ok(self.data_properties.clone())
    }

    fn instances_of(&self, class: &str) -> Result<Vec<Individual>, StoreError> {
        let closure = self.class_closure(class);
        Ok(self
            .individuals
            .iter()
            .filter(|ind| ind.types.iter().any(|t| closure.contains(t)))
            .cloned()
            .collect())
    }

    fn query(&self, prefixed_query: &str) -> Result<Vec<ResultRow>, StoreError> {
        let response = self
            .responses
            .iter()
            .find(|(pattern, _)| prefixed_query.contains(pattern.as_str()))
            .map(|(_, response)| response);

        match response {
            Some(CannedResponse::Rows(rows)) => Ok(rows.clone()),
            Some(CannedResponse::SyntaxError(msg)) => Err(StoreError::Syntax(msg.clone())),
            Some(CannedResponse::Failure(msg)) => Err(StoreError::Evaluation(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}
