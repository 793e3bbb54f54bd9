/**
 * extractor.rs
 * Walks an ontology store in a fixed order and fills the entity and
 * relation catalogs. Later phases merge into edges created by earlier ones,
 * so the phase order is part of the contract.
 */

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::catalog::{
    Edge, EntityCatalog, MergeOutcome, Node, RelationCatalog, BASE_IMPORTANCE, IS_A,
    MERGE_SEPARATOR,
};
use crate::ontology::{AssertionValue, ClassDecl, OntologyStore, StoreError};

/// Datatype name used when a data property declares no range
pub const NO_RANGE_TYPE: &str = "NoneType";

/// Catalog pair produced by one extraction
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entities: EntityCatalog,
    pub relations: RelationCatalog,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OntologyGraphExtractor {
    include_instances: bool,
}

impl OntologyGraphExtractor {
    pub fn new(include_instances: bool) -> Self {
        Self { include_instances }
    }

    pub fn extract<S: OntologyStore + ?Sized>(&self, store: &S) -> Result<Extraction, StoreError> {
        let mut extraction = Extraction::default();
        let classes = store.classes()?;

        self.add_classes(&classes, &mut extraction);
        self.add_is_a(&classes, &mut extraction);
        self.add_object_properties(store, &mut extraction)?;
        self.add_data_properties(store, &mut extraction)?;
        self.score_importance(&mut extraction);

        if self.include_instances {
            self.add_instances(store, &classes, &mut extraction)?;
        }

        info!(
            "Extracted {} nodes and {} edges from {}",
            extraction.entities.len(),
            extraction.relations.len(),
            store.base_iri()
        );
        Ok(extraction)
    }

    fn add_classes(&self, classes: &[ClassDecl], extraction: &mut Extraction) {
        for class in classes {
            extraction.entities.insert(Node::class(&class.name));
        }
        info!("Parsed {} T-Box classes", classes.len());
    }

    fn add_is_a(&self, classes: &[ClassDecl], extraction: &mut Extraction) {
        let mut count = 0;
        for class in classes {
            for sub in &class.subclasses {
                extraction.relations.push(Edge::new(sub, IS_A, &class.name, false));
                count += 1;
            }
        }
        info!("Parsed {} is_a relations", count);
    }

    fn add_object_properties<S: OntologyStore + ?Sized>(
        &self,
        store: &S,
        extraction: &mut Extraction,
    ) -> Result<(), StoreError> {
        let mut extracted = 0;
        let mut skipped = 0;

        for property in store.object_properties()? {
            let Some(domain) = property.domain.first() else {
                warn!("Object property {} skipped: no domain defined", property.name);
                skipped += 1;
                continue;
            };
            for target in &property.range {
                extraction
                    .relations
                    .push(Edge::new(domain, &property.name, target, true));
                extracted += 1;
            }
        }

        if skipped > 0 {
            warn!("{} object properties were skipped", skipped);
        }
        info!("Parsed {} object property relations", extracted);
        Ok(())
    }

    fn add_data_properties<S: OntologyStore + ?Sized>(
        &self,
        store: &S,
        extraction: &mut Extraction,
    ) -> Result<(), StoreError> {
        let properties = store.data_properties()?;

        for property in &properties {
            let mut domains: Vec<&str> = Vec::new();
            for class in &property.domain {
                if !domains.contains(&class.as_str()) {
                    domains.push(class);
                }
            }

            let datatype = match property.range.first() {
                Some(range) => range.as_str(),
                None => {
                    warn!("Data property {} has no defined range, using {}", property.name, NO_RANGE_TYPE);
                    NO_RANGE_TYPE
                }
            };

            // a sole domain contributes, otherwise the first one is passed over
            let skip = usize::from(domains.len() > 1);
            for domain in domains.iter().skip(skip) {
                let outcome = extraction
                    .relations
                    .merge_or_insert(domain, &property.name, datatype, true);
                debug!("Data property {} on {}: {:?}", property.name, domain, outcome);
            }

            extraction.entities.insert(Node::datatype(datatype));
        }

        info!("Parsed {} data properties", properties.len());
        Ok(())
    }

    /// importance = base + number of incoming is_a edges
    fn score_importance(&self, extraction: &mut Extraction) {
        let relations = &extraction.relations;
        for node in extraction.entities.iter_mut() {
            node.importance = importance_for(relations.incoming(&node.id, IS_A));
        }
    }

    fn add_instances<S: OntologyStore + ?Sized>(
        &self,
        store: &S,
        classes: &[ClassDecl],
        extraction: &mut Extraction,
    ) -> Result<(), StoreError> {
        let mut count = 0;
        let parents = parent_map(classes);

        for class in classes {
            for individual in store.instances_of(&class.name)? {
                let mut fragments: Vec<String> = Vec::new();

                for assertion in &individual.assertions {
                    match &assertion.value {
                        AssertionValue::Literal(value) => {
                            let fragment = format!("{} = {}", assertion.property, value);
                            if !fragments.contains(&fragment) {
                                fragments.push(fragment);
                            }
                        }
                        AssertionValue::Individual(target) => {
                            extraction.relations.push_unique(Edge::new(
                                &individual.name,
                                &assertion.property,
                                target,
                                false,
                            ));
                        }
                    }
                }

                if extraction
                    .entities
                    .insert(Node::instance(&individual.name, fragments.join(MERGE_SEPARATOR)))
                {
                    count += 1;
                }

                let declared =
                    most_specific_type(&individual.types, &parents).unwrap_or(class.name.as_str());
                if extraction
                    .relations
                    .merge_or_insert(&individual.name, IS_A, declared, false)
                    == MergeOutcome::Merged
                {
                    debug!("Typing edge {} -> {} merged", individual.name, declared);
                }
            }
        }

        info!("Parsed {} A-Box instances", count);
        Ok(())
    }
}

fn importance_for(incoming_is_a: usize) -> u32 {
    BASE_IMPORTANCE.saturating_add(u32::try_from(incoming_is_a).unwrap_or(u32::MAX))
}

/// Direct superclasses of every class
fn parent_map(classes: &[ClassDecl]) -> HashMap<&str, Vec<&str>> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for class in classes {
        for sub in &class.subclasses {
            parents.entry(sub.as_str()).or_default().push(class.name.as_str());
        }
    }
    parents
}

fn ancestors<'a>(class: &'a str, parents: &HashMap<&'a str, Vec<&'a str>>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack: Vec<&str> = parents.get(class).cloned().unwrap_or_default();
    while let Some(current) = stack.pop() {
        if seen.insert(current) {
            stack.extend(parents.get(current).into_iter().flatten().copied());
        }
    }
    seen
}

/// First declared type that is not an ancestor of another declared type
fn most_specific_type<'t>(types: &'t [String], parents: &HashMap<&str, Vec<&str>>) -> Option<&'t str> {
    let generic: HashSet<&str> = types
        .iter()
        .flat_map(|t| ancestors(t.as_str(), parents))
        .collect();
    types
        .iter()
        .map(String::as_str)
        .find(|t| !generic.contains(t))
        .or_else(|| types.first().map(String::as_str))
}
