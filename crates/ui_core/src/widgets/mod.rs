//! Widget capability set and the view models widgets hand to the renderer.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use search_client::SearchRepository;
use search_model::QueryValue;
use serde::Serialize;

use crate::{
    config::UiConfig,
    environment::Environment,
    store::Store,
    url_state::{UrlObject, UrlScope, UrlStateError},
};

pub mod multiple_filter;
pub mod pagination;
pub mod result_list;
pub mod search_input;
pub mod suggestions;

pub use multiple_filter::{MultipleFilter, MultipleFilterOptions};
pub use pagination::Pagination;
pub use result_list::ResultList;
pub use search_input::{SearchInput, SearchInputOptions};
pub use suggestions::SuggestionsFilter;

pub type Dictionary = BTreeMap<String, String>;

pub fn translate(dictionary: &Dictionary, key: &str) -> String {
    dictionary
        .get(key)
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Everything a widget needs to read state and trigger actions.
#[derive(Clone)]
pub struct WidgetContext {
    pub environment: Arc<Environment>,
    pub store: Arc<Store>,
    pub repository: Arc<dyn SearchRepository>,
}

pub trait Widget: Send + Sync {
    fn target(&self) -> &str;

    fn render(&self, ctx: &WidgetContext, dictionary: &Dictionary) -> anyhow::Result<WidgetView>;

    fn to_url_object(
        &self,
        _query: &QueryValue,
        _url: &mut UrlScope<'_>,
    ) -> Result<(), UrlStateError> {
        Ok(())
    }

    fn from_url_object(&self, _url: &UrlObject, _query: &mut QueryValue) {}

    fn with_config(&self, _config: &UiConfig) {}
}

pub trait Renderer: Send + Sync {
    fn paint(&self, target: &str, view: &WidgetView);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetView {
    SearchInput(SearchInputView),
    MultipleFilter(MultipleFilterView),
    ResultList(ResultListView),
    Suggestions(SuggestionsView),
    Pagination(PaginationView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchInputView {
    pub text: String,
    pub placeholder: String,
    pub autofocus: bool,
    pub clear_search: Option<String>,
    pub autocomplete: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterItemView {
    pub id: String,
    pub name: String,
    pub n: u64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowMoreView {
    pub label: String,
    pub expands: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultipleFilterView {
    pub name: String,
    pub top: Option<String>,
    pub items: Vec<FilterItemView>,
    pub show_more: Option<ShowMoreView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItemView {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub highlights: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultListView {
    pub visible: bool,
    pub total_hits: u64,
    pub items: Vec<ResultItemView>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionWordView {
    pub word: String,
    pub matched_prefix_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionsView {
    pub top: Option<String>,
    pub words: Vec<SuggestionWordView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_label: String,
    pub next_label: String,
}

/// Keeps every painted view, in paint order.
#[derive(Default)]
pub struct RecordingRenderer {
    painted: Mutex<Vec<(String, WidgetView)>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn painted(&self) -> Vec<(String, WidgetView)> {
        self.painted.lock().clone()
    }

    pub fn last_for(&self, target: &str) -> Option<WidgetView> {
        self.painted
            .lock()
            .iter()
            .rev()
            .find(|(painted_target, _)| painted_target == target)
            .map(|(_, view)| view.clone())
    }

    pub fn paint_count(&self) -> usize {
        self.painted.lock().len()
    }
}

impl Renderer for RecordingRenderer {
    fn paint(&self, target: &str, view: &WidgetView) {
        self.painted.lock().push((target.to_string(), view.clone()));
    }
}

#[cfg(test)]
#[path = "../tests/widgets_tests.rs"]
mod tests;
