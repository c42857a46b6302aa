//! Action functions: clone the current query, apply one semantic change,
//! optionally fetch, and publish the outcome on the environment dispatcher.
//!
//! Every action stamps a fresh [`Generation`] when it is called, before any
//! await point, so the store can discard results of superseded fetches.

use std::{fmt, sync::Arc};

use futures::future::{self, BoxFuture, FutureExt};
use search_client::{SearchError, SearchRepository};
use search_model::{
    AggregationRequest, AggregationSort, FilterApplication, ItemId, QueryValue, ResultValue,
};
use tracing::{debug, warn};

use crate::environment::{Environment, Generation};

pub const RENDER_INITIAL_DATA: &str = "render_initial_data";
pub const RENDER_FETCHED_DATA: &str = "render_fetched_data";
pub const UPDATE_SETUP: &str = "update_setup";
pub const FETCH_FAILED: &str = "fetch_failed";

const DEFAULT_SUGGESTION_COUNT: u32 = 1;

#[derive(Debug, Clone)]
pub enum Payload {
    Setup {
        generation: Generation,
        query: Arc<QueryValue>,
    },
    Data {
        generation: Generation,
        query: Arc<QueryValue>,
        result: Option<Arc<ResultValue>>,
        visible_results: bool,
    },
    Failure {
        generation: Generation,
        query: Arc<QueryValue>,
        error: SearchError,
    },
}

impl Payload {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Setup { generation, .. }
            | Self::Data { generation, .. }
            | Self::Failure { generation, .. } => *generation,
        }
    }

    pub fn query(&self) -> &Arc<QueryValue> {
        match self {
            Self::Setup { query, .. } | Self::Data { query, .. } | Self::Failure { query, .. } => {
                query
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Dispatched { generation: Generation },
    Hidden { generation: Generation },
    Failed {
        generation: Generation,
        error: SearchError,
    },
}

impl FetchOutcome {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Dispatched { generation }
            | Self::Hidden { generation }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub type ActionFuture = BoxFuture<'static, FetchOutcome>;

fn dispatch_setup(env: &Environment, query: QueryValue) -> Generation {
    let generation = env.next_generation();
    debug!(environment = %env.id(), %generation, "dispatching setup change");
    env.dispatcher().dispatch(
        UPDATE_SETUP,
        &Payload::Setup {
            generation,
            query: Arc::new(query),
        },
    );
    generation
}

fn fetch_and_dispatch(
    env: &Arc<Environment>,
    repository: &Arc<dyn SearchRepository>,
    query: QueryValue,
    event: &'static str,
) -> ActionFuture {
    let generation = env.next_generation();
    let env = Arc::clone(env);
    let repository = Arc::clone(repository);
    let query = Arc::new(query);

    async move {
        match repository.query(&query).await {
            Ok(result) => {
                debug!(environment = %env.id(), %generation, event, "fetch resolved");
                env.dispatcher().dispatch(
                    event,
                    &Payload::Data {
                        generation,
                        query,
                        result: Some(Arc::new(result)),
                        visible_results: true,
                    },
                );
                FetchOutcome::Dispatched { generation }
            }
            Err(error) => {
                warn!(environment = %env.id(), %generation, error = %error, "fetch failed");
                env.dispatcher().dispatch(
                    FETCH_FAILED,
                    &Payload::Failure {
                        generation,
                        query,
                        error: error.clone(),
                    },
                );
                FetchOutcome::Failed { generation, error }
            }
        }
    }
    .boxed()
}

/// Publishes an already prepared query as a setup change.
pub fn setup_changed(env: &Environment, query: QueryValue) -> Generation {
    dispatch_setup(env, query)
}

pub fn initial_search_setup(
    env: &Environment,
    current: &QueryValue,
    initial_search: &str,
    autocomplete: bool,
    searchable_fields: &[String],
) -> Generation {
    let mut query = current.clone();
    query.set_text(initial_search);
    query.reset_page();
    if !searchable_fields.is_empty() {
        query.searchable_fields = searchable_fields.to_vec();
    }
    if autocomplete {
        query.enable_suggestions();
        if query.suggestion_count.is_none() {
            query.suggestion_count = Some(DEFAULT_SUGGESTION_COUNT);
        }
    }
    dispatch_setup(env, query)
}

/// Searches for `text`. When `visible_results` is false the query is
/// published immediately with no result and the repository is not called.
pub fn simple_search_action(
    env: &Arc<Environment>,
    current: &QueryValue,
    repository: &Arc<dyn SearchRepository>,
    text: &str,
    visible_results: bool,
) -> ActionFuture {
    let mut query = current.clone();
    query.set_text(text);
    query.reset_page();

    if !visible_results {
        let generation = env.next_generation();
        env.dispatcher().dispatch(
            RENDER_FETCHED_DATA,
            &Payload::Data {
                generation,
                query: Arc::new(query),
                result: None,
                visible_results: false,
            },
        );
        return future::ready(FetchOutcome::Hidden { generation }).boxed();
    }

    fetch_and_dispatch(env, repository, query, RENDER_FETCHED_DATA)
}

pub fn aggregation_setup(
    env: &Environment,
    current: &QueryValue,
    request: AggregationRequest,
) -> Generation {
    let mut query = current.clone();
    query.aggregate_by(request);
    dispatch_setup(env, query)
}

/// New value set for one filter dimension together with its aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    pub filter_name: String,
    pub filter_field: String,
    pub aggregation_field: String,
    pub values: Vec<String>,
    pub application: FilterApplication,
    pub sort: AggregationSort,
    pub fetch_limit: u16,
}

pub fn filter_action(
    env: &Arc<Environment>,
    current: &QueryValue,
    repository: &Arc<dyn SearchRepository>,
    change: FilterChange,
) -> ActionFuture {
    let mut query = current.clone();
    query.filter_by(
        change.filter_name.clone(),
        change.filter_field,
        change.values,
        change.application,
    );
    query.aggregate_by(AggregationRequest {
        name: change.filter_name,
        field: change.aggregation_field,
        application: change.application,
        sort: change.sort,
        limit: change.fetch_limit,
    });
    query.reset_page();
    fetch_and_dispatch(env, repository, query, RENDER_FETCHED_DATA)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionsSetting {
    #[default]
    Disabled,
    Enabled,
    Count(u32),
}

#[derive(Clone)]
pub struct QueryTransform(Arc<dyn Fn(&mut QueryValue) + Send + Sync>);

impl QueryTransform {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&mut QueryValue) + Send + Sync + 'static,
    {
        Self(Arc::new(transform))
    }

    pub fn apply(&self, query: &mut QueryValue) {
        (self.0)(query)
    }
}

impl fmt::Debug for QueryTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueryTransform(..)")
    }
}

#[derive(Debug, Clone)]
pub struct QueryConfiguration {
    pub items_per_page: u32,
    pub highlights_enabled: bool,
    pub suggestions: SuggestionsSetting,
    pub promoted: Vec<ItemId>,
    pub excluded: Vec<ItemId>,
    pub fields: Vec<String>,
    pub transform: Option<QueryTransform>,
    pub min_score: f64,
}

impl Default for QueryConfiguration {
    fn default() -> Self {
        Self {
            items_per_page: search_model::query::DEFAULT_PAGE_SIZE,
            highlights_enabled: false,
            suggestions: SuggestionsSetting::Disabled,
            promoted: Vec::new(),
            excluded: Vec::new(),
            fields: Vec::new(),
            transform: None,
            min_score: 0.0,
        }
    }
}

impl QueryConfiguration {
    pub fn apply(&self, current: &QueryValue) -> QueryValue {
        let mut query = current.clone();
        if let Some(transform) = &self.transform {
            transform.apply(&mut query);
        }

        query.size = self.items_per_page;
        query.fields = self.fields.clone();

        if self.highlights_enabled {
            query.enable_highlights();
        }

        match self.suggestions {
            SuggestionsSetting::Disabled => {}
            SuggestionsSetting::Enabled => {
                query.enable_suggestions();
                query.suggestion_count = None;
            }
            SuggestionsSetting::Count(count) => {
                query.enable_suggestions();
                if count > 0 {
                    query.suggestion_count = Some(count);
                }
            }
        }

        for item in &self.promoted {
            query.promote(item.clone());
        }
        for item in &self.excluded {
            query.exclude(item.clone());
        }

        if self.min_score > 0.0 {
            query.min_score = Some(self.min_score);
        }
        query
    }
}

pub fn configure_query(
    env: &Environment,
    current: &QueryValue,
    configuration: &QueryConfiguration,
) -> Generation {
    dispatch_setup(env, configuration.apply(current))
}

pub fn infinite_scroll_next_page_action(
    env: &Arc<Environment>,
    current: &QueryValue,
    repository: &Arc<dyn SearchRepository>,
    next_page: u32,
) -> ActionFuture {
    let mut query = current.clone();
    query.page = next_page.max(1);
    fetch_and_dispatch(env, repository, query, RENDER_FETCHED_DATA)
}

pub fn enable_suggestions(env: &Environment, current: &QueryValue) -> Generation {
    let mut query = current.clone();
    query.enable_suggestions();
    dispatch_setup(env, query)
}

pub fn on_word_click_action(
    env: &Arc<Environment>,
    current: &QueryValue,
    repository: &Arc<dyn SearchRepository>,
    word: &str,
) -> ActionFuture {
    let mut query = current.clone();
    query.set_text(word);
    fetch_and_dispatch(env, repository, query, RENDER_FETCHED_DATA)
}

pub fn fetch_initial_query(
    env: &Arc<Environment>,
    current: &QueryValue,
    repository: &Arc<dyn SearchRepository>,
) -> ActionFuture {
    fetch_and_dispatch(env, repository, current.clone(), RENDER_INITIAL_DATA)
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;
