use delivery_core::retry::{retry, RetryPolicy};
use delivery_core::{KeyedTable, StoreError, TopicHub};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// --- Table + Hub working together, the way the domain stores use them ---

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    holder: Option<&'static str>,
}

/// Two tasks race to claim the same record; the entry guard in `modify`
/// must let exactly one through.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_claims_elect_exactly_one_winner() {
    let table = Arc::new(KeyedTable::new());
    table.insert(1u32, Slot { holder: None });

    let claim = |who: &'static str| {
        let table = Arc::clone(&table);
        tokio::spawn(async move {
            table
                .modify(&1, |slot: &mut Slot| match slot.holder {
                    Some(current) if current != who => Err(StoreError::Conflict(current.into())),
                    _ => {
                        slot.holder = Some(who);
                        Ok(())
                    }
                })
                .expect("record exists")
        })
    };

    let (a, b) = tokio::join!(claim("alpha"), claim("beta"));
    let outcomes = [a.unwrap(), b.unwrap()];
    let winners = outcomes.iter().filter(|o| o.is_ok()).count();

    assert_eq!(winners, 1, "exactly one claim must win: {outcomes:?}");
    let holder = table.get(&1).unwrap().holder.unwrap();
    assert!(holder == "alpha" || holder == "beta");

    // The loser's error names the winner.
    if let Some(Err(StoreError::Conflict(current))) = outcomes.iter().find(|o| o.is_err()) {
        assert_eq!(current.as_str(), holder);
    }
}

#[tokio::test]
async fn hub_fanout_survives_subscriber_churn() {
    let hub: TopicHub<u32, u32, u64> = TopicHub::new(4);

    let mut receivers = Vec::new();
    for session in 0..5 {
        receivers.push(hub.subscribe(7, session));
    }
    // Two sessions disconnect without unsubscribing.
    receivers.truncate(3);

    assert_eq!(hub.publish(&7, 99), 3);
    assert_eq!(hub.subscriber_count(&7), 3);
    for rx in &mut receivers {
        assert_eq!(rx.recv().await, Some(99));
    }
}

#[tokio::test]
async fn retry_recovers_a_flaky_operation() {
    let policy = RetryPolicy {
        max_retries: 4,
        first_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    };
    let failures_left = AtomicU32::new(3);

    let out = retry(&policy, "flaky", || {
        let fail = failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        async move {
            if fail {
                Err(StoreError::Unavailable("injected".into()))
            } else {
                Ok("recovered")
            }
        }
    })
    .await;

    assert_eq!(out, Ok("recovered"));
}
