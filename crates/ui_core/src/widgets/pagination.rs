use anyhow::ensure;
use search_model::QueryValue;

use super::{translate, Dictionary, PaginationView, Widget, WidgetContext, WidgetView};
use crate::{
    actions::{self, ActionFuture},
    url_state::{UrlObject, UrlScope, UrlStateError},
};

pub const PAGE_URL_KEY: &str = "page";

pub struct Pagination {
    target: String,
}

impl Pagination {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn go_to_page(&self, ctx: &WidgetContext, page: u32) -> ActionFuture {
        actions::infinite_scroll_next_page_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            page,
        )
    }

    pub fn next_page(&self, ctx: &WidgetContext) -> ActionFuture {
        let page = ctx.store.current_query().page.saturating_add(1);
        self.go_to_page(ctx, page)
    }

    pub fn previous_page(&self, ctx: &WidgetContext) -> ActionFuture {
        let page = ctx.store.current_query().page.saturating_sub(1).max(1);
        self.go_to_page(ctx, page)
    }
}

fn total_pages(total_hits: u64, size: u32) -> u32 {
    let pages = total_hits.div_ceil(u64::from(size)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl Widget for Pagination {
    fn target(&self) -> &str {
        &self.target
    }

    fn render(&self, ctx: &WidgetContext, dictionary: &Dictionary) -> anyhow::Result<WidgetView> {
        let query = ctx.store.current_query();
        ensure!(query.size > 0, "page size must be positive");

        let total_hits = ctx
            .store
            .current_result()
            .map(|result| result.total_hits)
            .unwrap_or(0);
        let total_pages = total_pages(total_hits, query.size);

        Ok(WidgetView::Pagination(PaginationView {
            page: query.page,
            total_pages,
            has_previous: query.page > 1,
            has_next: query.page < total_pages,
            previous_label: translate(dictionary, "Previous"),
            next_label: translate(dictionary, "Next"),
        }))
    }

    fn to_url_object(
        &self,
        query: &QueryValue,
        url: &mut UrlScope<'_>,
    ) -> Result<(), UrlStateError> {
        if query.page > 1 {
            url.set(PAGE_URL_KEY, query.page.to_string())?;
        }
        Ok(())
    }

    fn from_url_object(&self, url: &UrlObject, query: &mut QueryValue) {
        if let Some(page) = url
            .first(PAGE_URL_KEY)
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|page| *page > 0)
        {
            query.page = page;
        }
    }
}
