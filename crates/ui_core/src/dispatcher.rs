//! Named publish/subscribe bus, one per environment.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;
use tracing::{debug, warn};

pub type Listener<P> = Arc<dyn Fn(&P) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

struct Subscription<P> {
    id: ListenerId,
    key: Option<String>,
    listener: Listener<P>,
}

impl<P> Clone for Subscription<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            key: self.key.clone(),
            listener: Arc::clone(&self.listener),
        }
    }
}

pub struct Dispatcher<P> {
    name: String,
    next_id: AtomicU64,
    listeners: RwLock<HashMap<String, Vec<Subscription<P>>>>,
}

impl<P> Dispatcher<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a listener. Registering the same closure twice subscribes it twice.
    pub fn register_listener<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(event, None, Arc::new(listener))
    }

    /// Registers at most one listener per `(event, key)`; later registrations
    /// return the id of the first and are dropped.
    pub fn register_keyed_listener<F>(&self, event: &str, key: &str, listener: F) -> ListenerId
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        {
            let guard = self.listeners.read();
            if let Some(existing) = guard
                .get(event)
                .and_then(|subs| subs.iter().find(|sub| sub.key.as_deref() == Some(key)))
            {
                debug!(dispatcher = %self.name, event, key, "listener already registered");
                return existing.id;
            }
        }
        self.insert(event, Some(key.to_string()), Arc::new(listener))
    }

    fn insert(&self, event: &str, key: Option<String>, listener: Listener<P>) -> ListenerId {
        let mut guard = self.listeners.write();
        let subs = guard.entry(event.to_string()).or_default();
        // Re-check under the write lock so concurrent keyed registrations stay unique.
        if let Some(key) = key.as_deref() {
            if let Some(existing) = subs.iter().find(|sub| sub.key.as_deref() == Some(key)) {
                return existing.id;
            }
        }
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        subs.push(Subscription { id, key, listener });
        id
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    /// Invokes every listener of `event` in registration order. A failing
    /// listener is logged and does not stop the remaining ones.
    pub fn dispatch(&self, event: &str, payload: &P) -> DispatchReport {
        let snapshot: Vec<Subscription<P>> = self
            .listeners
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            debug!(dispatcher = %self.name, event, "dropping event without listeners");
            return DispatchReport::default();
        }

        let mut report = DispatchReport::default();
        for sub in snapshot {
            match (sub.listener)(payload) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        dispatcher = %self.name,
                        event,
                        listener = sub.id.0,
                        error = %format!("{err:#}"),
                        "listener failed"
                    );
                }
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
