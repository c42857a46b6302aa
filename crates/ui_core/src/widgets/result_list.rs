use std::sync::atomic::{AtomicBool, Ordering};

use super::{Dictionary, ResultItemView, ResultListView, Widget, WidgetContext, WidgetView};
use crate::actions::{self, QueryConfiguration};

pub struct ResultList {
    target: String,
    configuration: QueryConfiguration,
    mounted: AtomicBool,
}

impl ResultList {
    pub fn new(target: impl Into<String>, configuration: QueryConfiguration) -> Self {
        Self {
            target: target.into(),
            configuration,
            mounted: AtomicBool::new(false),
        }
    }

    pub fn configuration(&self) -> &QueryConfiguration {
        &self.configuration
    }
}

impl Widget for ResultList {
    fn target(&self) -> &str {
        &self.target
    }

    fn render(&self, ctx: &WidgetContext, _dictionary: &Dictionary) -> anyhow::Result<WidgetView> {
        if !self.mounted.swap(true, Ordering::SeqCst) {
            actions::configure_query(
                &ctx.environment,
                &ctx.store.current_query(),
                &self.configuration,
            );
        }

        let snapshot = ctx.store.snapshot();
        let visible = snapshot.visible_results;
        let (total_hits, items) = match snapshot.result.as_deref() {
            Some(result) if visible => (
                result.total_hits,
                result
                    .items
                    .iter()
                    .map(|item| ResultItemView {
                        id: item.id.to_string(),
                        fields: item.fields.clone(),
                        highlights: item.highlights.clone(),
                    })
                    .collect(),
            ),
            _ => (0, Vec::new()),
        };

        Ok(WidgetView::ResultList(ResultListView {
            visible,
            total_hits,
            items,
            error: snapshot
                .last_error
                .map(|failure| failure.error.to_string()),
        }))
    }
}
