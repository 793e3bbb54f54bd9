/**
 * config.rs
 * Parser for sqv.yaml session files (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: sqv/v1
 * kind: Session
 * metadata:
 *   name: pizza
 * spec:
 *   ontology:
 *     iri: http://example.org/onto-example.owl
 *     path: ./ontologies/pizza.ttl
 *   includeInstances: true
 * ```
 */

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SqvError};
use crate::ontology::PrefixPreamble;
use crate::query::{SlotLimits, TemplateSlots, DEFAULT_RESULT_DEPTH};

pub const API_VERSION: &str = "sqv/v1";
pub const KIND: &str = "Session";
pub const CONFIG_FILE_NAME: &str = "sqv.yaml";
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// sqv.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
}

/// Where the ontology comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OntologySource {
    pub iri: String,
    pub path: PathBuf,
}

/// Template directories and slot table additions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplatesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inconsistency: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, SlotLimits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySettings {
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Namespace bound to the `owlready:` prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefixes: BTreeMap<String, String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_RESULT_DEPTH,
            history_window: DEFAULT_HISTORY_WINDOW,
            store_namespace: None,
            prefixes: BTreeMap::new(),
        }
    }
}

fn default_depth() -> usize {
    DEFAULT_RESULT_DEPTH
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_include_instances() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub ontology: OntologySource,
    #[serde(default = "default_include_instances")]
    pub include_instances: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<TemplatesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QuerySettings>,
}

impl SessionConfig {
    /// Load sqv.yaml from specified path
    ///
    /// # Example
    /// ```ignore
    /// let config = SessionConfig::load("sqv.yaml")?;
    /// assert_eq!(config.metadata.name, "pizza");
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SqvError::Config(format!(
                "Session file not found: {}",
                path.to_string_lossy()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: SessionConfig = serde_yaml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load sqv.yaml from a directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Validate sqv.yaml structure
    ///
    /// Ensures:
    /// - apiVersion is "sqv/v1" and kind is "Session"
    /// - metadata.name and spec.ontology.path are non-empty
    /// - spec.ontology.iri carries a scheme
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(SqvError::ValidationError(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(SqvError::ValidationError(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(SqvError::ValidationError(
                "metadata.name cannot be empty".to_string(),
            ));
        }

        let scheme = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:")?;
        if !scheme.is_match(&self.spec.ontology.iri) {
            return Err(SqvError::ValidationError(format!(
                "spec.ontology.iri is not an IRI: '{}'",
                self.spec.ontology.iri
            )));
        }

        if self.spec.ontology.path.as_os_str().is_empty() {
            return Err(SqvError::ValidationError(
                "spec.ontology.path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    pub fn new(name: impl Into<String>, iri: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SessionConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Metadata { name: name.into() },
            spec: Spec {
                ontology: OntologySource {
                    iri: iri.into(),
                    path: path.into(),
                },
                include_instances: true,
                templates: None,
                query: None,
            },
        }
    }

    pub fn query_settings(&self) -> QuerySettings {
        self.spec.query.clone().unwrap_or_default()
    }

    pub fn preamble(&self) -> PrefixPreamble {
        let settings = self.query_settings();
        let mut preamble = PrefixPreamble::new(self.spec.ontology.iri.as_str());
        if let Some(namespace) = settings.store_namespace {
            preamble = preamble.with_store_namespace(namespace);
        }
        for (prefix, iri) in settings.prefixes {
            preamble = preamble.with_prefix(prefix, iri);
        }
        preamble
    }

    pub fn template_slots(&self) -> TemplateSlots {
        match &self.spec.templates {
            Some(templates) => TemplateSlots::with_overrides(templates.slots.clone()),
            None => TemplateSlots::new(),
        }
    }
}

/// `relative` joined onto `root` unless it is already absolute
pub fn resolve_path(root: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        root.join(relative)
    }
}
