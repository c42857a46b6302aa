use super::*;
use crate::{
    actions::{self, simple_search_action},
    environment::Environment,
    test_support::{as_repository, result_for, FailingRepository, GatedRepository},
};
use parking_lot::Mutex;

fn wired() -> (Arc<Environment>, Arc<Store>) {
    let env = Arc::new(Environment::new());
    let store = Arc::new(Store::new(QueryValue::match_all()));
    store.wire(env.dispatcher());
    (env, store)
}

fn count_renders(store: &Store) -> Arc<Mutex<Vec<Generation>>> {
    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    store.on(RENDER, move |snapshot| {
        sink.lock().push(snapshot.generation);
        Ok(())
    });
    renders
}

fn data(generation: u64, text: &str) -> Payload {
    let mut query = QueryValue::match_all();
    query.set_text(text);
    let result = result_for(&query);
    Payload::Data {
        generation: Generation(generation),
        query: Arc::new(query),
        result: Some(Arc::new(result)),
        visible_results: true,
    }
}

#[test]
fn starts_uninitialized_and_becomes_ready_on_setup() {
    let (env, store) = wired();
    assert_eq!(store.phase(), StorePhase::Uninitialized);
    assert!(store.current_result().is_none());

    let mut query = QueryValue::match_all();
    query.size = 30;
    actions::setup_changed(&env, query);

    assert_eq!(store.phase(), StorePhase::Ready);
    assert_eq!(store.current_query().size, 30);
    assert_eq!(store.applied_generation(), Generation(1));
}

#[test]
fn setup_replaces_query_and_keeps_result() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "shoes"));
    let result_before = store.current_result().expect("result");

    let mut query = (*store.current_query()).clone();
    query.enable_highlights();
    env.dispatcher().dispatch(
        UPDATE_SETUP,
        &Payload::Setup {
            generation: Generation(2),
            query: Arc::new(query),
        },
    );

    assert!(store.current_query().highlights_enabled);
    let result_after = store.current_result().expect("result kept");
    assert!(Arc::ptr_eq(&result_before, &result_after));
}

#[test]
fn every_applied_change_emits_render() {
    let (env, store) = wired();
    let renders = count_renders(&store);

    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "a"));
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(2, "ab"));
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "stale"));

    assert_eq!(*renders.lock(), vec![Generation(1), Generation(2)]);
}

#[test]
fn out_of_order_arrival_keeps_newest_generation() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(2, "shoes"));
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "sh"));

    assert_eq!(store.current_query().text, "shoes");
    assert_eq!(
        store.current_result().expect("result").suggestions,
        vec!["shoess".to_string()]
    );
    assert_eq!(store.applied_generation(), Generation(2));
}

#[tokio::test]
async fn later_fetch_resolving_first_wins_the_race() {
    let (env, store) = wired();
    let (gated, repository) = as_repository(GatedRepository::default());
    gated.gate("sh");
    gated.gate("shoes");

    let base = store.current_query();
    let first = simple_search_action(&env, &base, &repository, "sh", true);
    let second = simple_search_action(&env, &base, &repository, "shoes", true);

    let first = tokio::spawn(first);
    let second = tokio::spawn(second);

    gated.release("shoes");
    let second = second.await.expect("second task");
    assert_eq!(store.current_query().text, "shoes");

    gated.release("sh");
    let first = first.await.expect("first task");

    assert!(first.generation() < second.generation());
    assert_eq!(store.current_query().text, "shoes");
    assert_eq!(store.applied_generation(), second.generation());
    assert_eq!(
        store.current_result().expect("result").suggestions,
        vec!["shoess".to_string()]
    );
}

#[test]
fn hidden_results_clear_the_result_and_visibility() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "shoes"));
    env.dispatcher().dispatch(
        RENDER_FETCHED_DATA,
        &Payload::Data {
            generation: Generation(2),
            query: Arc::new(QueryValue::match_all()),
            result: None,
            visible_results: false,
        },
    );

    assert!(store.current_result().is_none());
    assert!(!store.results_are_visible());
}

#[test]
fn initial_data_is_applied_once() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_INITIAL_DATA, &data(1, "first"));
    env.dispatcher().dispatch(RENDER_INITIAL_DATA, &data(2, "second"));

    assert_eq!(store.phase(), StorePhase::Ready);
    assert_eq!(store.current_query().text, "first");
}

#[test]
fn stale_initial_data_is_discarded() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(3, "typed"));
    env.dispatcher().dispatch(RENDER_INITIAL_DATA, &data(1, ""));
    assert_eq!(store.current_query().text, "typed");
}

#[tokio::test]
async fn failed_fetch_keeps_last_good_state_and_exposes_error() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "shoes"));

    let failures = Arc::new(Mutex::new(0));
    {
        let failures = Arc::clone(&failures);
        store.on(FETCH_FAILED_NOTIFICATION, move |_| {
            *failures.lock() += 1;
            Ok(())
        });
    }

    let (_, repository) = as_repository(FailingRepository);
    let outcome =
        simple_search_action(&env, &store.current_query(), &repository, "boots", true).await;
    assert!(outcome.is_failure());

    assert_eq!(store.current_query().text, "shoes");
    assert!(store.current_result().is_some());
    let failure = store.last_error().expect("error recorded");
    assert_eq!(failure.generation, outcome.generation());
    assert_eq!(*failures.lock(), 1);

    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(10, "boots"));
    assert!(store.last_error().is_none());
}

#[test]
fn failure_of_superseded_fetch_is_ignored() {
    let (env, store) = wired();
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(5, "shoes"));
    env.dispatcher().dispatch(
        FETCH_FAILED,
        &Payload::Failure {
            generation: Generation(4),
            query: Arc::new(QueryValue::match_all()),
            error: SearchError::Transport("late".into()),
        },
    );
    assert!(store.last_error().is_none());
}

#[test]
fn older_success_does_not_overwrite_newer_failure() {
    let (env, store) = wired();
    let renders = count_renders(&store);
    env.dispatcher().dispatch(
        FETCH_FAILED,
        &Payload::Failure {
            generation: Generation(2),
            query: Arc::new(QueryValue::match_all()),
            error: SearchError::Transport("reset".into()),
        },
    );
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "shoe"));
    env.dispatcher().dispatch(RENDER_INITIAL_DATA, &data(1, "shoe"));

    let failure = store.last_error().expect("newer failure kept");
    assert_eq!(failure.generation, Generation(2));
    assert_eq!(store.current_query().text, "");
    assert!(store.current_result().is_none());
    assert_eq!(store.settled_generation(), Generation(2));
    assert_eq!(renders.lock().len(), 1);

    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(2, "shoe"));
    assert!(store.last_error().is_some(), "same generation does not supersede");
    assert_eq!(store.current_query().text, "shoe");

    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(3, "shoes"));
    assert!(store.last_error().is_none());
    assert_eq!(store.applied_generation(), Generation(3));
}

#[test]
fn wiring_twice_subscribes_once() {
    let (env, store) = wired();
    store.wire(env.dispatcher());
    for event in [RENDER_INITIAL_DATA, RENDER_FETCHED_DATA, UPDATE_SETUP, FETCH_FAILED] {
        assert_eq!(env.dispatcher().listener_count(event), 1, "{event}");
    }

    let renders = count_renders(&store);
    env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "a"));
    assert_eq!(renders.lock().len(), 1);
}

#[test]
fn mismatched_payload_is_reported_as_listener_failure() {
    let (env, store) = wired();
    let report = env.dispatcher().dispatch(
        UPDATE_SETUP,
        &data(1, "not a setup payload"),
    );
    assert_eq!(report.failed, 1);
    assert_eq!(store.phase(), StorePhase::Uninitialized);
}

#[test]
fn dropped_store_turns_dispatch_into_isolated_failure() {
    let (env, store) = wired();
    drop(store);
    let report = env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "a"));
    assert_eq!(report.failed, 1);
}

#[test]
fn stores_sharing_a_dispatcher_each_subscribe() {
    let (env, first) = wired();
    let second = Arc::new(Store::new(QueryValue::match_all()));
    second.wire(env.dispatcher());
    second.wire(env.dispatcher());
    for event in [RENDER_INITIAL_DATA, RENDER_FETCHED_DATA, UPDATE_SETUP, FETCH_FAILED] {
        assert_eq!(env.dispatcher().listener_count(event), 2, "{event}");
    }

    let report = env.dispatcher().dispatch(RENDER_FETCHED_DATA, &data(1, "boots"));
    assert_eq!(report.delivered, 2);
    assert_eq!(first.current_query().text, "boots");
    assert_eq!(second.current_query().text, "boots");
}
