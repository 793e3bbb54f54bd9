/**
 * templates.rs
 * Query templates: per-template slot limits and the on-disk template catalog
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::{Result, SqvError};

pub const TEMPLATE_EXTENSION: &str = "sparql";

/// How many graph selections a template accepts per element kind.
/// `None` means the template takes no selections of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotLimits {
    #[serde(rename = "nodes", default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u8>,
    #[serde(rename = "edges", default, skip_serializing_if = "Option::is_none")]
    pub max_edges: Option<u8>,
}

impl SlotLimits {
    pub const fn new(max_nodes: Option<u8>, max_edges: Option<u8>) -> Self {
        Self { max_nodes, max_edges }
    }
}

static BUILTIN_SLOTS: Lazy<HashMap<&'static str, SlotLimits>> = Lazy::new(|| {
    HashMap::from([
        ("template_2.sparql", SlotLimits::new(Some(1), Some(1))),
        ("template_3.sparql", SlotLimits::new(Some(3), Some(2))),
        ("template_4.sparql", SlotLimits::new(Some(1), None)),
        ("template_5.sparql", SlotLimits::new(Some(1), Some(1))),
        ("template_6.sparql", SlotLimits::new(Some(2), Some(1))),
        ("template_7.sparql", SlotLimits::new(Some(1), Some(2))),
        ("template_8.sparql", SlotLimits::new(Some(1), Some(1))),
        ("template_9.sparql", SlotLimits::new(Some(1), Some(1))),
        ("template_10.sparql", SlotLimits::new(Some(1), None)),
        ("template_11.sparql", SlotLimits::new(Some(2), Some(1))),
        ("template_12.sparql", SlotLimits::new(Some(1), Some(1))),
        ("template_13.sparql", SlotLimits::new(Some(1), None)),
        ("template_14.sparql", SlotLimits::new(Some(2), Some(1))),
        ("template_15.sparql", SlotLimits::new(Some(2), Some(1))),
        ("template_16.sparql", SlotLimits::new(Some(3), Some(3))),
        ("template_17.sparql", SlotLimits::new(Some(3), Some(2))),
        ("template_18.sparql", SlotLimits::new(Some(3), Some(2))),
        ("template_19.sparql", SlotLimits::new(Some(4), Some(3))),
        ("template_20.sparql", SlotLimits::new(Some(3), Some(1))),
    ])
});

/// Slot table: built-in limits plus configured overrides
#[derive(Debug, Clone, Default)]
pub struct TemplateSlots {
    overrides: HashMap<String, SlotLimits>,
}

impl TemplateSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, SlotLimits)>,
    {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    pub fn set(&mut self, template_id: impl Into<String>, limits: SlotLimits) {
        self.overrides.insert(template_id.into(), limits);
    }

    pub fn limits(&self, template_id: &str) -> Option<SlotLimits> {
        self.overrides
            .get(template_id)
            .or_else(|| BUILTIN_SLOTS.get(template_id))
            .copied()
    }

    pub fn max_nodes(&self, template_id: &str) -> Option<u8> {
        self.limits(template_id).and_then(|l| l.max_nodes)
    }

    pub fn max_edges(&self, template_id: &str) -> Option<u8> {
        self.limits(template_id).and_then(|l| l.max_edges)
    }

    /// Every known template id with its limits, sorted by id
    pub fn entries(&self) -> BTreeMap<String, SlotLimits> {
        let mut all: BTreeMap<String, SlotLimits> = BUILTIN_SLOTS
            .iter()
            .map(|(id, limits)| (id.to_string(), *limits))
            .collect();
        for (id, limits) in &self.overrides {
            all.insert(id.clone(), *limits);
        }
        all
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Standard,
    Inconsistency,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// File name, e.g. `template_3.sparql`
    pub id: String,
    pub kind: TemplateKind,
    pub body: String,
    pub path: PathBuf,
}

impl Template {
    /// Bracket placeholders in order of appearance, duplicates kept
    pub fn placeholders(&self) -> Result<Vec<String>> {
        placeholders_in(&self.body)
    }
}

pub fn placeholders_in(text: &str) -> Result<Vec<String>> {
    let re = Regex::new(r"\[(?::?(?:node|edge)[1-3]?|\.\.\.)\]")?;
    Ok(re
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Templates discovered on disk, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.sparql` file below `dir` as templates of `kind`.
    /// A missing directory contributes nothing.
    pub fn load_dir(&mut self, dir: &Path, kind: TemplateKind) -> Result<usize> {
        if !dir.exists() {
            debug!("Template directory {:?} does not exist", dir);
            return Ok(0);
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| SqvError::Config(format!("Template scan failed: {}", e)))?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }
            // nested directories belong to other template kinds
            if entry.depth() > 1 {
                continue;
            }

            let Some(id) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let body = fs::read_to_string(path)?;
            self.insert(Template {
                id: id.to_string(),
                kind,
                body,
                path: path.to_path_buf(),
            });
            loaded += 1;
        }

        info!("Loaded {} {:?} templates from {:?}", loaded, kind, dir);
        Ok(loaded)
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &str) -> Result<&Template> {
        self.templates
            .get(id)
            .ok_or_else(|| SqvError::TemplateNotFound(id.to_string()))
    }

    pub fn of_kind(&self, kind: TemplateKind) -> impl Iterator<Item = &Template> {
        self.templates.values().filter(move |t| t.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
