use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use search_model::QueryValue;
use tracing::debug;

use super::{translate, Dictionary, SearchInputView, Widget, WidgetContext, WidgetView};
use crate::{
    actions::{self, ActionFuture},
    config::UiConfig,
    url_state::{UrlObject, UrlScope, UrlStateError},
};

pub const QUERY_TEXT_URL_KEY: &str = "q";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInputOptions {
    pub placeholder: String,
    pub autofocus: bool,
    pub autocomplete: bool,
    /// Shorter inputs update the query without showing results.
    pub start_search_on: usize,
    pub clear_search: bool,
    pub initial_search: String,
    pub searchable_fields: Vec<String>,
}

impl Default for SearchInputOptions {
    fn default() -> Self {
        Self {
            placeholder: "Search...".into(),
            autofocus: false,
            autocomplete: false,
            start_search_on: 0,
            clear_search: true,
            initial_search: String::new(),
            searchable_fields: Vec::new(),
        }
    }
}

pub struct SearchInput {
    target: String,
    options: SearchInputOptions,
    mounted: AtomicBool,
    locale: RwLock<Option<String>>,
}

impl SearchInput {
    pub fn new(target: impl Into<String>, options: SearchInputOptions) -> Self {
        Self {
            target: target.into(),
            options,
            mounted: AtomicBool::new(false),
            locale: RwLock::new(None),
        }
    }

    pub fn options(&self) -> &SearchInputOptions {
        &self.options
    }

    pub fn locale(&self) -> Option<String> {
        self.locale.read().clone()
    }

    pub fn handle_search(&self, ctx: &WidgetContext, text: &str) -> ActionFuture {
        let visible = text.chars().count() >= self.options.start_search_on;
        debug!(widget = %self.target, visible, "search input changed");
        actions::simple_search_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            text,
            visible,
        )
    }

    pub fn clear_search(&self, ctx: &WidgetContext) -> ActionFuture {
        actions::simple_search_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            "",
            self.options.start_search_on == 0,
        )
    }

    /// Searches for the completion currently offered, if any.
    pub fn accept_first_suggestion(&self, ctx: &WidgetContext) -> Option<ActionFuture> {
        let completion = self.completion(ctx)?;
        Some(actions::simple_search_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            &completion,
            true,
        ))
    }

    fn completion(&self, ctx: &WidgetContext) -> Option<String> {
        if !self.options.autocomplete {
            return None;
        }
        let text = ctx.store.current_query().text.to_lowercase();
        if text.is_empty() {
            return None;
        }
        let result = ctx.store.current_result()?;
        result
            .suggestions
            .iter()
            .find(|suggestion| {
                let lowered = suggestion.to_lowercase();
                lowered.starts_with(&text) && lowered != text
            })
            .cloned()
    }
}

impl Widget for SearchInput {
    fn target(&self) -> &str {
        &self.target
    }

    fn render(&self, ctx: &WidgetContext, dictionary: &Dictionary) -> anyhow::Result<WidgetView> {
        if !self.mounted.swap(true, Ordering::SeqCst) {
            actions::initial_search_setup(
                &ctx.environment,
                &ctx.store.current_query(),
                &self.options.initial_search,
                self.options.autocomplete,
                &self.options.searchable_fields,
            );
        }

        let text = ctx.store.current_query().text.clone();
        let clear_search = (self.options.clear_search && !text.is_empty())
            .then(|| translate(dictionary, "Clear"));

        Ok(WidgetView::SearchInput(SearchInputView {
            placeholder: translate(dictionary, &self.options.placeholder),
            autofocus: self.options.autofocus,
            clear_search,
            autocomplete: self.completion(ctx),
            locale: self.locale(),
            text,
        }))
    }

    fn to_url_object(
        &self,
        query: &QueryValue,
        url: &mut UrlScope<'_>,
    ) -> Result<(), UrlStateError> {
        if !query.text.is_empty() {
            url.set(QUERY_TEXT_URL_KEY, query.text.clone())?;
        }
        Ok(())
    }

    fn from_url_object(&self, url: &UrlObject, query: &mut QueryValue) {
        if let Some(text) = url.first(QUERY_TEXT_URL_KEY) {
            query.set_text(text);
        }
    }

    fn with_config(&self, config: &UiConfig) {
        *self.locale.write() = config.options.locale.clone();
    }
}
