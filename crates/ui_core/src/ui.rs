//! The public entry point: one [`SearchUi`] owns an environment, a store, the
//! widget registry and the URL synchronisation for a single search page.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};

use parking_lot::{Mutex, RwLock};
use search_client::{
    ensure_repository_config_is_valid, HttpRepository, SearchError, SearchRepository,
};
use search_model::{ItemId, QueryValue};
use tracing::{debug, info, warn};

use crate::{
    actions::{self, FetchOutcome},
    config::{HistoryMode, UiConfig},
    dispatcher::ListenerId,
    environment::Environment,
    error::UiError,
    lifecycle,
    registry::WidgetRegistry,
    store::{Store, StoreSnapshot, RENDER},
    url_state::{AddressBar, UrlObject},
    widgets::{Dictionary, Renderer, Widget, WidgetContext},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    pub first_query: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self { first_query: true }
    }
}

struct UiInner {
    config: UiConfig,
    environment: Arc<Environment>,
    store: Arc<Store>,
    repository: Arc<dyn SearchRepository>,
    registry: WidgetRegistry,
    renderer: Arc<dyn Renderer>,
    address_bar: Arc<dyn AddressBar>,
    dictionary: RwLock<Dictionary>,
    initialized: AtomicBool,
    url_sync: AtomicBool,
    last_url: Mutex<Option<String>>,
}

impl UiInner {
    fn context(&self) -> WidgetContext {
        WidgetContext {
            environment: Arc::clone(&self.environment),
            store: Arc::clone(&self.store),
            repository: Arc::clone(&self.repository),
        }
    }

    fn render(&self) {
        let dictionary = self.dictionary.read().clone();
        let passes = self
            .registry
            .render(&self.context(), &dictionary, self.renderer.as_ref());
        if passes > 0 {
            self.sync_url();
        }
    }

    fn sync_url(&self) {
        if !self.config.history.is_enabled() || !self.url_sync.load(Ordering::SeqCst) {
            return;
        }
        let object = match self.store.to_url_object(&self.registry) {
            Ok(object) => object,
            Err(err) => {
                warn!(error = %err, "url not updated");
                return;
            }
        };

        let encoded = object.to_query_string();
        let mut last = self.last_url.lock();
        if last.as_deref().unwrap_or_default() == encoded {
            return;
        }
        match self.config.history {
            HistoryMode::Replace => self.address_bar.replace(&encoded),
            HistoryMode::Push | HistoryMode::Disabled => self.address_bar.push(&encoded),
        }
        debug!(url = %encoded, mode = %self.config.history, "url updated");
        *last = Some(encoded);
    }
}

pub struct SearchUi {
    inner: Arc<UiInner>,
}

impl SearchUi {
    pub fn create(
        config: UiConfig,
        repository: Arc<dyn SearchRepository>,
        renderer: Arc<dyn Renderer>,
        address_bar: Arc<dyn AddressBar>,
    ) -> Result<Self, UiError> {
        ensure_repository_config_is_valid(&config.repository)?;

        let environment = Arc::new(Environment::new());
        let store = Arc::new(Store::new(
            QueryValue::match_all().with_size(config.options.default_page_size),
        ));
        store.wire(environment.dispatcher());

        info!(
            environment = %environment.id(),
            app_id = %config.repository.app_id,
            index_id = %config.repository.index_id,
            history = %config.history,
            "search ui created"
        );

        Ok(Self {
            inner: Arc::new(UiInner {
                registry: WidgetRegistry::new(config.clone()),
                config,
                environment,
                store,
                repository,
                renderer,
                address_bar,
                dictionary: RwLock::new(Dictionary::new()),
                initialized: AtomicBool::new(false),
                url_sync: AtomicBool::new(false),
                last_url: Mutex::new(None),
            }),
        })
    }

    /// Builds the UI on top of an [`HttpRepository`] for `config.repository`.
    pub fn create_http(
        config: UiConfig,
        renderer: Arc<dyn Renderer>,
        address_bar: Arc<dyn AddressBar>,
    ) -> Result<Self, UiError> {
        let repository = HttpRepository::new(config.repository.clone())?;
        Self::create(config, Arc::new(repository), renderer, address_bar)
    }

    pub fn add_widget(&self, widget: Arc<dyn Widget>) -> Result<&Self, UiError> {
        self.inner.registry.add(widget)?;
        Ok(self)
    }

    pub fn add_widgets<I>(&self, widgets: I) -> Result<&Self, UiError>
    where
        I: IntoIterator<Item = Arc<dyn Widget>>,
    {
        for widget in widgets {
            self.inner.registry.add(widget)?;
        }
        Ok(self)
    }

    /// Mounts every widget, restores state from the address bar and runs the
    /// first query. Returns the outcome of that query when one was requested.
    pub async fn init(&self, options: InitOptions) -> Result<Option<FetchOutcome>, UiError> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return Err(UiError::AlreadyInitialized);
        }

        self.inner.registry.push_config();

        let weak: Weak<UiInner> = Arc::downgrade(&self.inner);
        self.inner.store.on(RENDER, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.render();
            }
            Ok(())
        });

        let incoming = if self.inner.config.history.is_enabled() {
            self.inner
                .address_bar
                .current()
                .filter(|raw| !raw.trim().trim_start_matches('?').is_empty())
        } else {
            None
        };

        self.inner.render();

        if let Some(raw) = incoming {
            let object = UrlObject::from_query_string(&raw);
            let query = self
                .inner
                .store
                .query_from_url_object(&self.inner.registry, &object);
            info!(url = %raw, "restoring search state from url");
            *self.inner.last_url.lock() = Some(object.to_query_string());
            actions::setup_changed(&self.inner.environment, query);
        }

        self.inner.url_sync.store(true, Ordering::SeqCst);
        self.inner.sync_url();

        let outcome = if options.first_query {
            let current = self.inner.store.current_query();
            Some(
                actions::fetch_initial_query(
                    &self.inner.environment,
                    &current,
                    &self.inner.repository,
                )
                .await,
            )
        } else {
            None
        };

        if lifecycle::mark_loaded() {
            info!(environment = %self.inner.environment.id(), "search ui loaded");
        }
        Ok(outcome)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// Subscribes to store notifications such as `render` and `fetch_failed`.
    pub fn attach<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&StoreSnapshot) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.inner.store.on(event, listener)
    }

    /// Reports a click on `item` for the configured app and index.
    pub async fn click(&self, item: &ItemId) -> Result<(), SearchError> {
        let repository = &self.inner.config.repository;
        self.inner
            .repository
            .click(
                &repository.app_id,
                &repository.index_id,
                item,
                repository.user_id.as_deref(),
            )
            .await
    }

    /// Replaces the translations and repaints.
    pub fn set_dictionary(&self, dictionary: Dictionary) {
        *self.inner.dictionary.write() = dictionary;
        if self.is_initialized() {
            self.inner.render();
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.inner.environment
    }

    pub fn context(&self) -> WidgetContext {
        self.inner.context()
    }

    pub fn widget_targets(&self) -> Vec<String> {
        self.inner.registry.targets()
    }

    /// Last query string written to the address bar.
    pub fn current_url(&self) -> Option<String> {
        self.inner.last_url.lock().clone()
    }
}

#[cfg(test)]
#[path = "tests/ui_tests.rs"]
mod tests;
