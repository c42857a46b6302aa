use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use search_model::{
    query::DEFAULT_AGGREGATION_LIMIT, AggregationRequest, AggregationSort, FilterApplication,
    QueryValue,
};

use super::{
    translate, Dictionary, FilterItemView, MultipleFilterView, ShowMoreView, Widget,
    WidgetContext, WidgetView,
};
use crate::{
    actions::{self, ActionFuture, FilterChange},
    store::Store,
    url_state::{UrlObject, UrlScope, UrlStateError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleFilterOptions {
    pub filter_name: String,
    pub filter_field: String,
    /// Defaults to `filter_field`.
    pub aggregation_field: Option<String>,
    pub application: FilterApplication,
    pub sort: AggregationSort,
    pub fetch_limit: u16,
    pub view_limit: Option<usize>,
    pub top_label: Option<String>,
    pub show_more_label: String,
    pub show_less_label: String,
}

impl MultipleFilterOptions {
    pub fn new(filter_name: impl Into<String>, filter_field: impl Into<String>) -> Self {
        Self {
            filter_name: filter_name.into(),
            filter_field: filter_field.into(),
            aggregation_field: None,
            application: FilterApplication::MustAll,
            sort: AggregationSort::default(),
            fetch_limit: DEFAULT_AGGREGATION_LIMIT,
            view_limit: None,
            top_label: None,
            show_more_label: "+ Show more".into(),
            show_less_label: "- Show less".into(),
        }
    }

    fn aggregation_field(&self) -> &str {
        self.aggregation_field
            .as_deref()
            .unwrap_or(&self.filter_field)
    }

    /// A view limit only counts when it is positive and below the fetch limit.
    fn effective_view_limit(&self) -> Option<usize> {
        self.view_limit
            .filter(|limit| *limit > 0 && *limit < usize::from(self.fetch_limit))
    }
}

pub struct MultipleFilter {
    target: String,
    options: MultipleFilterOptions,
    mounted: AtomicBool,
    view_limit: Mutex<usize>,
}

impl MultipleFilter {
    pub fn new(target: impl Into<String>, options: MultipleFilterOptions) -> Self {
        let view_limit = options
            .effective_view_limit()
            .unwrap_or(usize::from(options.fetch_limit));
        Self {
            target: target.into(),
            options,
            mounted: AtomicBool::new(false),
            view_limit: Mutex::new(view_limit),
        }
    }

    pub fn options(&self) -> &MultipleFilterOptions {
        &self.options
    }

    pub fn view_limit(&self) -> usize {
        *self.view_limit.lock()
    }

    /// Active values as reported by the last result, falling back to the query.
    pub fn active_values(&self, store: &Store) -> Vec<String> {
        let name = &self.options.filter_name;
        if let Some(aggregation) = store
            .current_result()
            .as_ref()
            .and_then(|result| result.aggregation(name).cloned())
        {
            return aggregation.active_elements;
        }
        store.current_query().active_filter_values(name).to_vec()
    }

    pub fn handle_click(&self, ctx: &WidgetContext, value: &str) -> ActionFuture {
        let values = search_model::toggle_value(value, &self.active_values(&ctx.store));
        actions::filter_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            FilterChange {
                filter_name: self.options.filter_name.clone(),
                filter_field: self.options.filter_field.clone(),
                aggregation_field: self.options.aggregation_field().to_string(),
                values,
                application: self.options.application,
                sort: self.options.sort,
                fetch_limit: self.options.fetch_limit,
            },
        )
    }

    pub fn show_more(&self, store: &Store) {
        let available = store
            .current_result()
            .and_then(|result| {
                result
                    .aggregation(&self.options.filter_name)
                    .map(|aggregation| aggregation.counters.len())
            })
            .unwrap_or(0);
        let mut limit = self.view_limit.lock();
        *limit = available.max(*limit);
    }

    pub fn show_less(&self) {
        if let Some(configured) = self.options.effective_view_limit() {
            *self.view_limit.lock() = configured;
        }
    }

    fn show_more_view(&self, available: usize, dictionary: &Dictionary) -> Option<ShowMoreView> {
        let configured = self.options.effective_view_limit()?;
        if available <= configured {
            return None;
        }
        let expands = self.view_limit() < available;
        let label = if expands {
            &self.options.show_more_label
        } else {
            &self.options.show_less_label
        };
        Some(ShowMoreView {
            label: translate(dictionary, label),
            expands,
        })
    }
}

impl Widget for MultipleFilter {
    fn target(&self) -> &str {
        &self.target
    }

    fn render(&self, ctx: &WidgetContext, dictionary: &Dictionary) -> anyhow::Result<WidgetView> {
        if !self.mounted.swap(true, Ordering::SeqCst) {
            actions::aggregation_setup(
                &ctx.environment,
                &ctx.store.current_query(),
                AggregationRequest {
                    name: self.options.filter_name.clone(),
                    field: self.options.aggregation_field().to_string(),
                    application: self.options.application,
                    sort: self.options.sort,
                    limit: self.options.fetch_limit,
                },
            );
        }

        let result = ctx.store.current_result();
        let aggregation = result
            .as_deref()
            .and_then(|result| result.aggregation(&self.options.filter_name));

        let mut items: Vec<FilterItemView> = aggregation
            .map(|aggregation| {
                aggregation
                    .used_counters()
                    .chain(aggregation.unused_counters())
                    .map(|counter| FilterItemView {
                        id: counter.id.clone(),
                        name: counter.name.clone(),
                        n: counter.n,
                        active: counter.used,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let available = items.len();
        items.truncate(self.view_limit());

        Ok(WidgetView::MultipleFilter(MultipleFilterView {
            name: self.options.filter_name.clone(),
            top: self
                .options
                .top_label
                .as_deref()
                .map(|label| translate(dictionary, label)),
            show_more: self.show_more_view(available, dictionary),
            items,
        }))
    }

    fn to_url_object(
        &self,
        query: &QueryValue,
        url: &mut UrlScope<'_>,
    ) -> Result<(), UrlStateError> {
        let values = query.active_filter_values(&self.options.filter_name);
        if !values.is_empty() {
            url.set_many(&self.options.filter_name, values.to_vec())?;
        }
        Ok(())
    }

    fn from_url_object(&self, url: &UrlObject, query: &mut QueryValue) {
        let Some(values) = url.get(&self.options.filter_name) else {
            return;
        };
        let values: Vec<String> = values
            .iter()
            .filter(|value| !value.is_empty())
            .cloned()
            .collect();
        if values.is_empty() {
            return;
        }
        query.filter_by(
            self.options.filter_name.clone(),
            self.options.filter_field.clone(),
            values,
            self.options.application,
        );
        query.aggregate_by(AggregationRequest {
            name: self.options.filter_name.clone(),
            field: self.options.aggregation_field().to_string(),
            application: self.options.application,
            sort: self.options.sort,
            limit: self.options.fetch_limit,
        });
    }
}
