/**
 * composer.rs
 * Incremental query text builder with a fragment stack for undo
 *
 * Every append pushes exactly one Fragment. A fragment remembers where it
 * was written and, for graph selections, which placeholder it consumed.
 */

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::templates::TemplateSlots;

pub const PREFIX_KEYWORD: &str = "PREFIX";
/// Variable slot inside an aggregate template, e.g. `COUNT ( ?[...] ) AS`
pub const AGGREGATE_MARKER: &str = "COUNT ( ?[...] ) AS";
pub const AGGREGATE_SLOT: &str = " ?[...]";
/// Placeholders written back when a selection is undone without a record
pub const GENERIC_NODE_PLACEHOLDER: &str = ":[node]";
pub const GENERIC_EDGE_PLACEHOLDER: &str = ":[edge]";

const NODE_PLACEHOLDERS: [&str; 8] = [
    "[:node]", "[node]", "[:node1]", "[node1]", "[:node2]", "[node2]", "[:node3]", "[node3]",
];
const EDGE_PLACEHOLDERS: [&str; 8] = [
    "[:edge]", "[edge]", "[:edge1]", "[edge1]", "[:edge2]", "[edge2]", "[:edge3]", "[edge3]",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FragmentKind {
    UserInput,
    SelectNode { placeholder: String },
    SelectEdge { placeholder: String },
}

impl FragmentKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FragmentKind::UserInput => "user_input",
            FragmentKind::SelectNode { .. } => "select_node",
            FragmentKind::SelectEdge { .. } => "select_edge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub kind: FragmentKind,
    /// Byte offset in the query text where `text` was written
    pub offset: usize,
}

/// A single graph element picked in the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Node id
    Node(String),
    /// Edge label (not the edge id)
    Edge(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Substituted { placeholder: String },
    Appended,
    /// The template's slots of this kind are already full
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub text: String,
    pub fragments: Vec<Fragment>,
    pub selected_template: Option<String>,
    pub node_slots_filled: u8,
    pub edge_slots_filled: u8,
    pub last_selected_node: Option<String>,
    pub last_selected_edge: Option<String>,
}

impl QueryState {
    /// Fragment tags oldest first, parallel to `fragments`
    pub fn fragment_tags(&self) -> Vec<&'static str> {
        self.fragments.iter().map(|f| f.kind.tag()).collect()
    }

    fn reset_selection(&mut self) {
        self.selected_template = None;
        self.node_slots_filled = 0;
        self.edge_slots_filled = 0;
        self.last_selected_node = None;
        self.last_selected_edge = None;
    }
}

#[derive(Debug, Clone)]
pub struct QueryComposer {
    base_iri: String,
    state: QueryState,
}

impl QueryComposer {
    pub fn new(base_iri: impl Into<String>) -> Self {
        let base_iri: String = base_iri.into();
        Self {
            base_iri: base_iri.trim_end_matches('#').to_string(),
            state: QueryState::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn selected_template(&self) -> Option<&str> {
        self.state.selected_template.as_deref()
    }

    pub fn default_prefix(&self) -> String {
        format!("PREFIX : <{}#>", self.base_iri)
    }

    pub fn append_keyword(&mut self, keyword: &str) {
        let fragment = if keyword == PREFIX_KEYWORD {
            format!(" {}", self.default_prefix())
        } else {
            format!(" {}", keyword)
        };
        debug!("Keyword fragment {:?}", fragment);
        self.push_text(fragment);
    }

    pub fn append_variable(&mut self, variable: &str) {
        let fragment = format!(" {}", variable);
        if self.state.text.contains(AGGREGATE_MARKER) {
            if let Some(offset) = self.state.text.find(AGGREGATE_SLOT) {
                debug!("Variable {:?} fills aggregate slot", variable);
                self.state
                    .text
                    .replace_range(offset..offset + AGGREGATE_SLOT.len(), &fragment);
                self.state.fragments.push(Fragment {
                    text: fragment,
                    kind: FragmentKind::UserInput,
                    offset,
                });
                return;
            }
        }
        debug!("Variable fragment {:?}", fragment);
        self.push_text(fragment);
    }

    pub fn append_symbol(&mut self, symbol: &str) {
        debug!("Symbol fragment {:?}", symbol);
        self.push_text(format!(" {}", symbol));
    }

    pub fn append_free_text(&mut self, text: &str) {
        debug!("Free text fragment {:?}", text);
        self.push_text(format!(" {}", text));
    }

    /// Replace the text with a template body and start a fresh slot count
    pub fn append_template(&mut self, template_id: &str, body: &str) {
        self.replace_with_body(body);
        self.state.reset_selection();
        self.state.selected_template = Some(template_id.to_string());
        debug!("Template {} loaded into query", template_id);
    }

    /// Like a template, but library queries take no selections
    pub fn append_library_query(&mut self, body: &str) {
        self.replace_with_body(body);
        self.state.reset_selection();
        debug!("Library query loaded into query");
    }

    /// Insert a graph selection into the active template, or append it as text
    pub fn append_from_selection(
        &mut self,
        selection: &Selection,
        template: Option<&str>,
        slots: &TemplateSlots,
    ) -> SelectionOutcome {
        let (fragment, max, filled, candidates) = match selection {
            Selection::Node(id) => (
                format!(" :{}", id),
                template.and_then(|t| slots.max_nodes(t)),
                self.state.node_slots_filled,
                &NODE_PLACEHOLDERS,
            ),
            Selection::Edge(label) => (
                format!(" :{}", label),
                template.and_then(|t| slots.max_edges(t)),
                self.state.edge_slots_filled,
                &EDGE_PLACEHOLDERS,
            ),
        };

        let found = candidates
            .iter()
            .find_map(|p| self.state.text.find(p).map(|offset| (*p, offset)));

        match (max, found) {
            (Some(max), Some((placeholder, offset))) if filled < max => {
                self.state
                    .text
                    .replace_range(offset..offset + placeholder.len(), &fragment);
                let kind = match selection {
                    Selection::Node(_) => {
                        self.state.node_slots_filled += 1;
                        self.state.last_selected_node = Some(fragment.clone());
                        FragmentKind::SelectNode {
                            placeholder: placeholder.to_string(),
                        }
                    }
                    Selection::Edge(_) => {
                        self.state.edge_slots_filled += 1;
                        self.state.last_selected_edge = Some(fragment.clone());
                        FragmentKind::SelectEdge {
                            placeholder: placeholder.to_string(),
                        }
                    }
                };
                debug!("Selection {:?} substituted for {}", fragment, placeholder);
                self.state.fragments.push(Fragment {
                    text: fragment,
                    kind,
                    offset,
                });
                SelectionOutcome::Substituted {
                    placeholder: placeholder.to_string(),
                }
            }
            (Some(max), _) if filled >= max => {
                debug!("Selection {:?} ignored, {} of {} slots filled", fragment, filled, max);
                SelectionOutcome::Ignored
            }
            _ => {
                debug!("Selection {:?} appended as text", fragment);
                self.push_text(fragment);
                SelectionOutcome::Appended
            }
        }
    }

    /// Pop the newest fragment and take it back out of the text
    pub fn undo_last(&mut self) -> Option<Fragment> {
        let fragment = self.state.fragments.pop()?;

        match &fragment.kind {
            FragmentKind::UserInput => {
                self.splice(&fragment, "");
            }
            FragmentKind::SelectNode { placeholder } => {
                self.splice(&fragment, placeholder);
                self.state.node_slots_filled = self.state.node_slots_filled.saturating_sub(1);
                self.state.last_selected_node = None;
            }
            FragmentKind::SelectEdge { placeholder } => {
                self.splice(&fragment, placeholder);
                self.state.edge_slots_filled = self.state.edge_slots_filled.saturating_sub(1);
                self.state.last_selected_edge = None;
            }
        }

        debug!("Undid {} fragment {:?}", fragment.kind.tag(), fragment.text);
        Some(fragment)
    }

    pub fn clear(&mut self) {
        self.state = QueryState::default();
        debug!("Query cleared");
    }

    fn push_text(&mut self, fragment: String) {
        let offset = self.state.text.len();
        self.state.text.push_str(&fragment);
        self.state.fragments.push(Fragment {
            text: fragment,
            kind: FragmentKind::UserInput,
            offset,
        });
    }

    fn replace_with_body(&mut self, body: &str) {
        let fragment = format!("{}\n\n{}", self.default_prefix(), body);
        self.state.text = fragment.clone();
        self.state.fragments.push(Fragment {
            text: fragment,
            kind: FragmentKind::UserInput,
            offset: 0,
        });
    }

    /// Swap the fragment's text for `replacement`, at its recorded offset
    /// when it is still there, else at its first occurrence
    fn splice(&mut self, fragment: &Fragment, replacement: &str) {
        let end = fragment.offset + fragment.text.len();
        let at = if self.state.text.get(fragment.offset..end) == Some(fragment.text.as_str()) {
            Some(fragment.offset)
        } else {
            self.state.text.find(&fragment.text)
        };
        if let Some(start) = at {
            self.state
                .text
                .replace_range(start..start + fragment.text.len(), replacement);
        }
    }
}
