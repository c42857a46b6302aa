use std::{sync::Arc, time::Duration};

use axum::{extract::Path, routing::post, Json, Router};
use search_client::RepositoryConfig;
use search_model::{AggregationValue, Counter, Item, ItemId, QueryValue, ResultValue};
use tokio::net::TcpListener;
use ui_core::{
    widgets::{
        MultipleFilter, MultipleFilterOptions, Pagination, RecordingRenderer, ResultList,
        SearchInput, SearchInputOptions,
    },
    HistoryMode, InitOptions, MemoryAddressBar, SearchUi, UiConfig, Widget, WidgetView,
};

const BRANDS: [&str; 3] = ["nike", "puma", "adidas"];

/// Slow for short texts, so an early keystroke resolves after a later one.
async fn handle_query(
    Path((_app, _index)): Path<(String, String)>,
    Json(query): Json<QueryValue>,
) -> Json<ResultValue> {
    let delay = 60u64.saturating_sub(query.text.len() as u64 * 10);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    let active = query.active_filter_values("brand").to_vec();
    let counters = BRANDS
        .iter()
        .map(|brand| Counter {
            id: brand.to_string(),
            name: brand.to_uppercase(),
            n: 4,
            used: active.iter().any(|value| value == brand),
        })
        .collect();

    let mut result = ResultValue {
        items: (0..query.size.min(3))
            .map(|n| Item {
                id: ItemId::new(format!("{}-{}", query.page, n), "product"),
                fields: serde_json::Map::new(),
                highlights: Default::default(),
                score: None,
            })
            .collect(),
        suggestions: vec![format!("{} sale", query.text)],
        total_hits: 40,
        total_items: 40,
        ..ResultValue::default()
    };
    result.aggregations.insert(
        "brand".into(),
        AggregationValue {
            counters,
            active_elements: active,
            total: 12,
        },
    );
    Json(result)
}

async fn handle_click(Path(_segments): Path<(String, String, String)>) -> &'static str {
    "{}"
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/v1/:app/indices/:index/query", post(handle_query))
        .route("/v1/:app/indices/:index/items/:item/click", post(handle_click));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

struct Page {
    ui: SearchUi,
    renderer: Arc<RecordingRenderer>,
    address_bar: Arc<MemoryAddressBar>,
    search: Arc<SearchInput>,
    brand: Arc<MultipleFilter>,
    pages: Arc<Pagination>,
}

fn page(endpoint: &str, address_bar: MemoryAddressBar) -> Page {
    let config = UiConfig {
        repository: RepositoryConfig {
            endpoint: endpoint.to_string(),
            app_id: "shop".into(),
            index_id: "products".into(),
            token: "secret".into(),
            ..RepositoryConfig::default()
        },
        history: HistoryMode::Push,
        ..UiConfig::default()
    };
    let renderer = Arc::new(RecordingRenderer::new());
    let address_bar = Arc::new(address_bar);
    let ui = SearchUi::create_http(config, renderer.clone(), address_bar.clone()).expect("create");

    let search = Arc::new(SearchInput::new("#search", SearchInputOptions::default()));
    let brand = Arc::new(MultipleFilter::new(
        "#brand",
        MultipleFilterOptions::new("brand", "brand.id"),
    ));
    let pages = Arc::new(Pagination::new("#pages"));
    ui.add_widgets([
        search.clone() as Arc<dyn Widget>,
        brand.clone() as Arc<dyn Widget>,
        pages.clone() as Arc<dyn Widget>,
        Arc::new(ResultList::new("#results", Default::default())) as Arc<dyn Widget>,
    ])
    .expect("widgets");

    Page {
        ui,
        renderer,
        address_bar,
        search,
        brand,
        pages,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn browsing_state_survives_a_reload_through_the_url() {
    let endpoint = spawn_backend().await;
    let first = page(&endpoint, MemoryAddressBar::new());
    first.ui.init(InitOptions::default()).await.expect("init");

    let ctx = first.ui.context();
    assert!(!first.search.handle_search(&ctx, "shoes").await.is_failure());
    assert!(!first.brand.handle_click(&ctx, "puma").await.is_failure());
    assert!(!first.pages.next_page(&ctx).await.is_failure());

    let url = first.ui.current_url().expect("url written");
    assert_eq!(url, "brand=puma&page=2&q=shoes");
    assert_eq!(first.address_bar.entries().len(), 3);

    match first.renderer.last_for("#brand") {
        Some(WidgetView::MultipleFilter(view)) => {
            assert_eq!(view.items[0].id, "puma");
            assert!(view.items[0].active);
        }
        other => panic!("unexpected view {other:?}"),
    }

    let reloaded = page(&endpoint, MemoryAddressBar::with_initial(url.clone()));
    reloaded.ui.init(InitOptions::default()).await.expect("init");

    let restored = reloaded.ui.store().current_query();
    let original = first.ui.store().current_query();
    assert_eq!(restored.text, original.text);
    assert_eq!(restored.page, original.page);
    assert_eq!(restored.filters, original.filters);
    assert_eq!(reloaded.ui.current_url().as_deref(), Some(url.as_str()));
    assert_eq!(reloaded.address_bar.entries().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fast_typing_settles_on_the_last_keystroke() {
    let endpoint = spawn_backend().await;
    let page = page(&endpoint, MemoryAddressBar::new());
    page.ui.init(InitOptions::default()).await.expect("init");

    let ctx = page.ui.context();
    let keystrokes: Vec<_> = ["s", "sh", "sho", "shoe", "shoes"]
        .into_iter()
        .map(|text| tokio::spawn(page.search.handle_search(&ctx, text)))
        .collect();
    for keystroke in keystrokes {
        keystroke.await.expect("action task");
    }

    let store = page.ui.store();
    assert_eq!(store.current_query().text, "shoes");
    assert_eq!(
        store.current_result().expect("result").suggestions,
        vec!["shoes sale".to_string()]
    );
    assert_eq!(store.applied_generation(), page.ui.environment().latest_generation());

    match page.renderer.last_for("#search") {
        Some(WidgetView::SearchInput(view)) => assert_eq!(view.text, "shoes"),
        other => panic!("unexpected view {other:?}"),
    }
}

#[tokio::test]
async fn clicks_reach_the_backend() {
    let endpoint = spawn_backend().await;
    let page = page(&endpoint, MemoryAddressBar::new());
    page.ui
        .click(&ItemId::new("1-0", "product"))
        .await
        .expect("click accepted");
}

#[tokio::test]
async fn unreachable_backend_keeps_the_page_usable() {
    let page = page("http://127.0.0.1:9", MemoryAddressBar::new());
    let outcome = page
        .ui
        .init(InitOptions::default())
        .await
        .expect("init")
        .expect("first query ran");
    assert!(outcome.is_failure());

    match page.renderer.last_for("#results") {
        Some(WidgetView::ResultList(view)) => {
            assert!(view.items.is_empty());
            assert!(view.error.is_some());
        }
        other => panic!("unexpected view {other:?}"),
    }
}
