mod config;

use std::{collections::BTreeMap, io::Write, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use ui_core::{
    widgets::{
        MultipleFilter, MultipleFilterOptions, Pagination, ResultList, SearchInput,
        SearchInputOptions, SuggestionsFilter,
    },
    FetchOutcome, InitOptions, MemoryAddressBar, Renderer, SearchUi, Widget, WidgetView,
};

#[derive(Parser, Debug)]
#[command(about = "Drive a headless search page and print every painted view as JSON")]
struct Args {
    /// TOML settings file; `search_ui.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    app_id: Option<String>,
    #[arg(long)]
    index_id: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// false, push or replace.
    #[arg(long)]
    history: Option<String>,
    /// Incoming query string to restore from, e.g. `q=shoes&page=2`.
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// Facet to show, as `name=field`.
    #[arg(long = "facet", value_parser = parse_pair)]
    facets: Vec<(String, String)>,
    /// Facet value to toggle, as `name=value`.
    #[arg(long = "filter", value_parser = parse_pair)]
    filters: Vec<(String, String)>,
    #[arg(long)]
    page: Option<u32>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

struct JsonLineRenderer;

impl Renderer for JsonLineRenderer {
    fn paint(&self, target: &str, view: &WidgetView) {
        let line = json!({ "target": target, "view": view });
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{line}") {
            warn!(widget = %target, error = %err, "failed to write view");
        }
    }
}

fn report(step: &str, outcome: FetchOutcome) {
    if let FetchOutcome::Failed { generation, error } = outcome {
        warn!(step, %generation, error = %error, "step finished without fresh results");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(v) = args.endpoint {
        settings.repository.endpoint = v;
    }
    if let Some(v) = args.app_id {
        settings.repository.app_id = v;
    }
    if let Some(v) = args.index_id {
        settings.repository.index_id = v;
    }
    if let Some(v) = args.token {
        settings.repository.token = v;
    }
    if let Some(v) = args.history.as_deref() {
        settings.history = config::parse_history(v)?;
    }

    let address_bar = Arc::new(match args.url {
        Some(url) => MemoryAddressBar::with_initial(url),
        None => MemoryAddressBar::new(),
    });
    let ui = SearchUi::create_http(settings, Arc::new(JsonLineRenderer), address_bar)
        .context("failed to create search ui")?;

    let search = Arc::new(SearchInput::new("#search", SearchInputOptions::default()));
    let pages = Arc::new(Pagination::new("#pages"));
    let mut facets = BTreeMap::new();
    for (name, field) in &args.facets {
        let facet = Arc::new(MultipleFilter::new(
            format!("#facet-{name}"),
            MultipleFilterOptions::new(name.clone(), field.clone()),
        ));
        facets.insert(name.clone(), facet);
    }

    ui.add_widget(search.clone())?;
    for facet in facets.values() {
        ui.add_widget(facet.clone())?;
    }
    ui.add_widgets([
        Arc::new(SuggestionsFilter::new("#suggestions")) as Arc<dyn Widget>,
        Arc::new(ResultList::new("#results", Default::default())) as Arc<dyn Widget>,
        pages.clone() as Arc<dyn Widget>,
    ])?;

    if let Some(outcome) = ui.init(InitOptions::default()).await? {
        report("init", outcome);
    }

    let ctx = ui.context();
    if let Some(text) = &args.search {
        report("search", search.handle_search(&ctx, text).await);
    }
    for (name, value) in &args.filters {
        let Some(facet) = facets.get(name) else {
            bail!("--filter {name}={value} has no matching --facet {name}=<field>");
        };
        report("filter", facet.handle_click(&ctx, value).await);
    }
    if let Some(page) = args.page {
        report("page", pages.go_to_page(&ctx, page).await);
    }

    println!("{}", json!({ "url": ui.current_url() }));
    Ok(())
}
