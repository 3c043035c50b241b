//! Property-based tests for the action queue

use proptest::prelude::*;
use serde_json::json;
use wolfpack_sync::client::offline::{ActionStore, MemoryActionStore};
use wolfpack_sync::shared::ActionKind;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(ActionKind),
    /// Remove the queued action at this position, if any
    Remove(usize),
    /// Remove an id that was never queued
    RemoveUnknown,
}

fn kind() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Order),
        Just(ActionKind::ProfileUpdate),
        Just(ActionKind::Feedback),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => kind().prop_map(Op::Enqueue),
        2 => (0usize..16).prop_map(Op::Remove),
        1 => Just(Op::RemoveUnknown),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_count_tracks_enqueues_minus_removals(ops in prop::collection::vec(op(), 0..40)) {
        runtime().block_on(async {
            let store = MemoryActionStore::new();
            let mut expected = Vec::new();

            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Enqueue(kind) => {
                        let action = store.enqueue(kind, json!({"n": n})).await.unwrap();
                        expected.push(action.id);
                    }
                    Op::Remove(index) if index < expected.len() => {
                        let id = expected.remove(index);
                        prop_assert!(store.remove(&id).await.unwrap());
                        // A second removal of the same id is a no-op.
                        prop_assert!(!store.remove(&id).await.unwrap());
                    }
                    Op::Remove(_) => {}
                    Op::RemoveUnknown => {
                        prop_assert!(!store.remove(&uuid::Uuid::new_v4()).await.unwrap());
                    }
                }
                prop_assert_eq!(store.count().await.unwrap(), expected.len());
            }

            let remaining: Vec<_> = store.dequeue_all().await.unwrap().into_iter().map(|a| a.id).collect();
            prop_assert_eq!(remaining, expected);
            Ok(())
        })?;
    }

    #[test]
    fn test_payload_is_stored_verbatim(rating in 1u8..=5, message in "[a-zA-Z ]{1,40}") {
        runtime().block_on(async {
            let store = MemoryActionStore::new();
            let payload = json!({"rating": rating, "message": message});
            store.enqueue(ActionKind::Feedback, payload.clone()).await.unwrap();
            let stored = store.dequeue_all().await.unwrap();
            prop_assert_eq!(stored.len(), 1);
            prop_assert_eq!(&stored[0].payload, &payload);
            Ok(())
        })?;
    }
}
