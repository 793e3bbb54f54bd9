/**
 * query module
 *
 * - composer: fragment-stack query builder with placeholder substitution
 * - templates: slot table and on-disk template catalog
 * - executor: evaluation against the store, result projection
 * - history: numbered log of evaluated queries
 */

pub mod composer;
pub mod executor;
pub mod history;
pub mod templates;

pub use composer::{Fragment, FragmentKind, QueryComposer, QueryState, Selection, SelectionOutcome};
pub use executor::{
    project_results, Evaluation, EvaluationOutcome, QueryExecutor, DEFAULT_RESULT_DEPTH,
    EMPTY_QUERY_TEXT, NO_RESULTS_TEXT, RUNTIME_ERROR_TEXT, SYNTAX_ERROR_TEXT,
};
pub use history::{HistoryEntry, QueryHistory};
pub use templates::{SlotLimits, Template, TemplateCatalog, TemplateKind, TemplateSlots};
