use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Weak,
};

use anyhow::{anyhow, bail};
use parking_lot::RwLock;
use search_client::SearchError;
use search_model::{QueryValue, ResultValue};
use tracing::{debug, info, warn};

use crate::{
    actions::{Payload, FETCH_FAILED, RENDER_FETCHED_DATA, RENDER_INITIAL_DATA, UPDATE_SETUP},
    dispatcher::{Dispatcher, ListenerId},
    environment::Generation,
    url_state::{UrlCodec, UrlObject, UrlStateError},
};

pub const RENDER: &str = "render";
pub const FETCH_FAILED_NOTIFICATION: &str = "fetch_failed";

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub generation: Generation,
    pub error: SearchError,
}

/// Read-only view handed to store listeners.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub generation: Generation,
    pub query: Arc<QueryValue>,
    pub result: Option<Arc<ResultValue>>,
    pub visible_results: bool,
    pub last_error: Option<FetchFailure>,
}

struct StoreState {
    phase: StorePhase,
    query: Arc<QueryValue>,
    result: Option<Arc<ResultValue>>,
    visible_results: bool,
    applied_generation: Generation,
    /// Newest generation that produced data or a failure.
    settled_generation: Generation,
    initial_data_applied: bool,
    last_error: Option<FetchFailure>,
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            generation: self.applied_generation,
            query: Arc::clone(&self.query),
            result: self.result.clone(),
            visible_results: self.visible_results,
            last_error: self.last_error.clone(),
        }
    }

    fn is_stale(&self, generation: Generation) -> bool {
        generation < self.settled_generation
    }

    fn apply(&mut self, generation: Generation) {
        self.applied_generation = generation;
        self.settled_generation = self.settled_generation.max(generation);
        self.phase = StorePhase::Ready;
    }

    /// Only data from a strictly newer fetch supersedes a recorded failure.
    fn apply_data(&mut self, generation: Generation) {
        self.apply(generation);
        if self
            .last_error
            .as_ref()
            .is_some_and(|failure| failure.generation < generation)
        {
            self.last_error = None;
        }
    }
}

pub struct Store {
    state: RwLock<StoreState>,
    notifications: Dispatcher<StoreSnapshot>,
    /// Keyed subscription name on action dispatchers; unique per store.
    listener_key: String,
}

impl Store {
    pub fn new(default_query: QueryValue) -> Self {
        Self {
            state: RwLock::new(StoreState {
                phase: StorePhase::Uninitialized,
                query: Arc::new(default_query),
                result: None,
                visible_results: true,
                applied_generation: Generation::default(),
                settled_generation: Generation::default(),
                initial_data_applied: false,
                last_error: None,
            }),
            notifications: Dispatcher::new("store"),
            listener_key: format!("store-{}", NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    pub fn phase(&self) -> StorePhase {
        self.state.read().phase
    }

    pub fn current_query(&self) -> Arc<QueryValue> {
        Arc::clone(&self.state.read().query)
    }

    pub fn current_result(&self) -> Option<Arc<ResultValue>> {
        self.state.read().result.clone()
    }

    pub fn results_are_visible(&self) -> bool {
        self.state.read().visible_results
    }

    pub fn applied_generation(&self) -> Generation {
        self.state.read().applied_generation
    }

    pub fn settled_generation(&self) -> Generation {
        self.state.read().settled_generation
    }

    pub fn last_error(&self) -> Option<FetchFailure> {
        self.state.read().last_error.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().snapshot()
    }

    /// Subscribes to store notifications (`render`, `fetch_failed`, ...).
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&StoreSnapshot) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.notifications.register_listener(event, listener)
    }

    /// Subscribes the store handlers to `dispatcher`. Safe to call repeatedly;
    /// every store holds its own subscription, so several stores can share
    /// one dispatcher.
    pub fn wire(self: &Arc<Self>, dispatcher: &Dispatcher<Payload>) {
        let handlers: [(&'static str, fn(&Store, &Payload) -> anyhow::Result<()>); 4] = [
            (RENDER_INITIAL_DATA, Store::render_initial_data),
            (RENDER_FETCHED_DATA, Store::render_fetched_data),
            (UPDATE_SETUP, Store::update_setup),
            (FETCH_FAILED, Store::record_fetch_failure),
        ];
        for (event, handler) in handlers {
            let store: Weak<Store> = Arc::downgrade(self);
            dispatcher.register_keyed_listener(event, &self.listener_key, move |payload| {
                let store = store
                    .upgrade()
                    .ok_or_else(|| anyhow!("store dropped before '{event}' was handled"))?;
                handler(&store, payload)
            });
        }
    }

    fn emit(&self, event: &str, snapshot: StoreSnapshot) {
        self.notifications.dispatch(event, &snapshot);
    }

    pub(crate) fn update_setup(&self, payload: &Payload) -> anyhow::Result<()> {
        let Payload::Setup { generation, query } = payload else {
            bail!("'{UPDATE_SETUP}' expects a setup payload");
        };

        let snapshot = {
            let mut state = self.state.write();
            if state.is_stale(*generation) {
                debug!(
                    %generation,
                    settled = %state.settled_generation,
                    "discarding stale setup"
                );
                return Ok(());
            }
            state.query = Arc::clone(query);
            state.apply(*generation);
            state.snapshot()
        };
        self.emit(RENDER, snapshot);
        Ok(())
    }

    pub(crate) fn render_fetched_data(&self, payload: &Payload) -> anyhow::Result<()> {
        let Payload::Data {
            generation,
            query,
            result,
            visible_results,
        } = payload
        else {
            bail!("'{RENDER_FETCHED_DATA}' expects a data payload");
        };

        let snapshot = {
            let mut state = self.state.write();
            if state.is_stale(*generation) {
                debug!(
                    %generation,
                    settled = %state.settled_generation,
                    text = %query.text,
                    "discarding result of superseded fetch"
                );
                return Ok(());
            }
            state.query = Arc::clone(query);
            state.result = result.clone();
            state.visible_results = *visible_results;
            state.apply_data(*generation);
            state.snapshot()
        };
        self.emit(RENDER, snapshot);
        Ok(())
    }

    pub(crate) fn render_initial_data(&self, payload: &Payload) -> anyhow::Result<()> {
        let Payload::Data {
            generation,
            query,
            result,
            visible_results,
        } = payload
        else {
            bail!("'{RENDER_INITIAL_DATA}' expects a data payload");
        };

        let snapshot = {
            let mut state = self.state.write();
            if state.initial_data_applied {
                warn!(%generation, "initial data already applied; ignoring");
                return Ok(());
            }
            if state.is_stale(*generation) {
                debug!(
                    %generation,
                    settled = %state.settled_generation,
                    "discarding stale initial data"
                );
                return Ok(());
            }
            state.query = Arc::clone(query);
            state.result = result.clone();
            state.visible_results = *visible_results;
            state.initial_data_applied = true;
            state.apply_data(*generation);
            state.snapshot()
        };
        info!(generation = %snapshot.generation, "initial data applied");
        self.emit(RENDER, snapshot);
        Ok(())
    }

    pub(crate) fn record_fetch_failure(&self, payload: &Payload) -> anyhow::Result<()> {
        let Payload::Failure {
            generation, error, ..
        } = payload
        else {
            bail!("'{FETCH_FAILED}' expects a failure payload");
        };

        let snapshot = {
            let mut state = self.state.write();
            if state.is_stale(*generation) {
                debug!(%generation, "ignoring failure of superseded fetch");
                return Ok(());
            }
            state.settled_generation = *generation;
            state.last_error = Some(FetchFailure {
                generation: *generation,
                error: error.clone(),
            });
            state.snapshot()
        };
        warn!(%generation, error = %error, "keeping last good state after failed fetch");
        self.emit(FETCH_FAILED_NOTIFICATION, snapshot.clone());
        self.emit(RENDER, snapshot);
        Ok(())
    }

    /// Collects the URL contributions of every widget for the current query.
    pub fn to_url_object(&self, codec: &dyn UrlCodec) -> Result<UrlObject, UrlStateError> {
        let query = self.current_query();
        let mut object = UrlObject::new();
        codec.to_url_object(&query, &mut object)?;
        Ok(object)
    }

    /// Builds the query described by `object` on top of the current one.
    pub fn query_from_url_object(&self, codec: &dyn UrlCodec, object: &UrlObject) -> QueryValue {
        let mut query = (*self.current_query()).clone();
        codec.from_url_object(object, &mut query);
        query
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
