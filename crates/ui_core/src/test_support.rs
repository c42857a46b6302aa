use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use search_client::{SearchError, SearchRepository};
use search_model::{AggregationValue, Counter, ItemId, QueryValue, ResultValue};
use tokio::sync::oneshot;

use crate::{
    actions::{Payload, FETCH_FAILED, RENDER_FETCHED_DATA, RENDER_INITIAL_DATA, UPDATE_SETUP},
    environment::Environment,
};

pub fn result_for(query: &QueryValue) -> ResultValue {
    ResultValue {
        suggestions: vec![format!("{}s", query.text)],
        total_hits: 25,
        total_items: 100,
        ..ResultValue::default()
    }
}

pub fn result_with_brand_counters(active: &[&str]) -> ResultValue {
    let counters = ["nike", "puma", "adidas"]
        .iter()
        .map(|id| Counter {
            id: id.to_string(),
            name: id.to_uppercase(),
            n: 3,
            used: active.contains(id),
        })
        .collect();
    let mut result = ResultValue::default();
    result.aggregations.insert(
        "brand".into(),
        AggregationValue {
            counters,
            active_elements: active.iter().map(|id| id.to_string()).collect(),
            total: 9,
        },
    );
    result
}

#[derive(Default)]
pub struct RecordingRepository {
    pub queries: Mutex<Vec<QueryValue>>,
    pub clicks: Mutex<Vec<(String, String, ItemId, Option<String>)>>,
    pub canned: Mutex<Option<ResultValue>>,
}

impl RecordingRepository {
    pub fn returning(result: ResultValue) -> Self {
        let repository = Self::default();
        *repository.canned.lock() = Some(result);
        repository
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl SearchRepository for RecordingRepository {
    async fn query(&self, query: &QueryValue) -> Result<ResultValue, SearchError> {
        self.queries.lock().push(query.clone());
        let canned = self.canned.lock().clone();
        Ok(canned.unwrap_or_else(|| result_for(query)))
    }

    async fn click(
        &self,
        app_id: &str,
        index_id: &str,
        item_id: &ItemId,
        user_id: Option<&str>,
    ) -> Result<(), SearchError> {
        self.clicks.lock().push((
            app_id.to_string(),
            index_id.to_string(),
            item_id.clone(),
            user_id.map(str::to_string),
        ));
        Ok(())
    }
}

pub struct FailingRepository;

#[async_trait]
impl SearchRepository for FailingRepository {
    async fn query(&self, _query: &QueryValue) -> Result<ResultValue, SearchError> {
        Err(SearchError::Transport("connection refused".into()))
    }

    async fn click(
        &self,
        _app_id: &str,
        _index_id: &str,
        _item_id: &ItemId,
        _user_id: Option<&str>,
    ) -> Result<(), SearchError> {
        Err(SearchError::Transport("connection refused".into()))
    }
}

/// Holds every query until the test releases it by query text.
#[derive(Default)]
pub struct GatedRepository {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    releases: Mutex<HashMap<String, oneshot::Sender<()>>>,
}

impl GatedRepository {
    pub fn gate(&self, text: &str) {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(text.to_string(), rx);
        self.releases.lock().insert(text.to_string(), tx);
    }

    pub fn release(&self, text: &str) {
        if let Some(tx) = self.releases.lock().remove(text) {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl SearchRepository for GatedRepository {
    async fn query(&self, query: &QueryValue) -> Result<ResultValue, SearchError> {
        let gate = self.gates.lock().remove(&query.text);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(result_for(query))
    }

    async fn click(
        &self,
        _app_id: &str,
        _index_id: &str,
        _item_id: &ItemId,
        _user_id: Option<&str>,
    ) -> Result<(), SearchError> {
        Ok(())
    }
}

/// Records every payload published on the environment dispatcher.
pub fn capture_payloads(env: &Environment) -> Arc<Mutex<Vec<(&'static str, Payload)>>> {
    let captured = Arc::new(Mutex::new(Vec::new()));
    for event in [
        UPDATE_SETUP,
        RENDER_FETCHED_DATA,
        RENDER_INITIAL_DATA,
        FETCH_FAILED,
    ] {
        let captured = Arc::clone(&captured);
        env.dispatcher().register_listener(event, move |payload: &Payload| {
            captured.lock().push((event, payload.clone()));
            Ok(())
        });
    }
    captured
}

pub fn as_repository<R: SearchRepository + 'static>(
    repository: R,
) -> (Arc<R>, Arc<dyn SearchRepository>) {
    let concrete = Arc::new(repository);
    let erased: Arc<dyn SearchRepository> = concrete.clone();
    (concrete, erased)
}
