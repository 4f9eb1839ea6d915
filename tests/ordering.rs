//! Ordering guarantees: FIFO delivery, state-before-action, exactly-once.

use epic_bridge::{Action, EpicPlugin, MemoryStore, Store};
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn ledger_store() -> Arc<MemoryStore<Vec<i64>>> {
    Arc::new(
        MemoryStore::builder(Vec::new())
            .mutation("push", |log: &mut Vec<i64>, payload| {
                log.push(payload.as_i64().unwrap_or(-1))
            })
            .action("record", |store, payload| store.commit("push", payload.clone()))
            .build(),
    )
}

#[test]
fn test_state_published_before_resulting_action() {
    let plugin: EpicPlugin<Vec<i64>> = EpicPlugin::default();
    let store = plugin.install(ledger_store()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    // Commit, then announce the commit as an action.
    plugin
        .run(|actions, _, _| {
            Some(actions.of_type(&["save"]).flat_map(|_| {
                epic_bridge::Stream::of(vec![
                    Action::mutation("push", json!(1)),
                    Action::dispatch("saved", json!(null)),
                ])
            }))
        })
        .unwrap();

    let l = Arc::clone(&log);
    plugin
        .run(move |_, states, _| {
            let l = Arc::clone(&l);
            Some(states.stream().filter_map(move |s: Vec<i64>| {
                l.lock().push(format!("state {:?}", s));
                None
            }))
        })
        .unwrap();
    let l = Arc::clone(&log);
    plugin
        .run(move |actions, _, _| {
            let l = Arc::clone(&l);
            Some(actions.stream().filter_map(move |a| {
                l.lock().push(format!("action {}", a.action_type()));
                None
            }))
        })
        .unwrap();

    store.dispatch_action("save").unwrap();

    assert_eq!(
        *log.lock(),
        vec!["action save", "state [1]", "action saved"]
    );
}

#[test]
fn test_reentrant_dispatch_is_queued_not_nested() {
    let plugin: EpicPlugin<Vec<i64>> = EpicPlugin::default();
    let store = plugin.install(ledger_store()).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Each "n" action fans out into two follow-ups; breadth-first order
    // shows the scheduler never nests deliveries.
    plugin
        .run(|actions, _, _| {
            Some(actions.of_type(&["n"]).flat_map(|a| {
                let n = a.payload().and_then(|p| p.as_i64()).unwrap_or(0);
                if n >= 4 {
                    epic_bridge::Stream::empty()
                } else {
                    epic_bridge::Stream::of(vec![
                        Action::dispatch("n", json!(n * 2)),
                        Action::dispatch("n", json!(n * 2 + 1)),
                    ])
                }
            }))
        })
        .unwrap();
    let s = Arc::clone(&seen);
    plugin
        .run(move |actions, _, _| {
            let s = Arc::clone(&s);
            Some(actions.of_type(&["n"]).filter_map(move |a| {
                s.lock().push(a.payload().and_then(|p| p.as_i64()).unwrap_or(0));
                None
            }))
        })
        .unwrap();

    store.dispatch_action(Action::dispatch("n", json!(1))).unwrap();

    assert_eq!(*seen.lock(), vec![1, 2, 3, 4, 5, 6, 7]);
}

proptest! {
    #[test]
    fn prop_dispatch_runs_handler_once_and_publishes_in_order(
        values in prop::collection::vec(0i64..1000, 0..40)
    ) {
        let plugin: EpicPlugin<Vec<i64>> = EpicPlugin::default();
        let store = plugin.install(ledger_store()).unwrap();
        let actions = store.action_view().tap();

        for v in &values {
            store.dispatch_action(("record", json!(v))).unwrap();
        }

        prop_assert_eq!(store.inner().dispatch_count(), values.len() as u64);
        prop_assert_eq!(store.state(), values.clone());
        let published: Vec<i64> = actions
            .drain()
            .iter()
            .map(|a| a.payload().and_then(|p| p.as_i64()).unwrap_or(-1))
            .collect();
        prop_assert_eq!(published, values);
    }

    #[test]
    fn prop_commit_snapshots_follow_mutations(
        ops in prop::collection::vec((any::<bool>(), 0i64..100), 0..40)
    ) {
        let plugin: EpicPlugin<Vec<i64>> = EpicPlugin::default();
        let store = plugin.install(ledger_store()).unwrap();
        let states = store.state_view().tap();

        let mut expected = Vec::new();
        let mut snapshots = Vec::new();
        for (registered, v) in &ops {
            let name = if *registered { "push" } else { "pop" };
            store.commit_action((name, json!(v))).unwrap();
            if *registered {
                expected.push(*v);
                snapshots.push(expected.clone());
            }
        }

        prop_assert_eq!(store.inner().commit_count(), snapshots.len() as u64);
        prop_assert_eq!(states.drain(), snapshots);
    }
}
