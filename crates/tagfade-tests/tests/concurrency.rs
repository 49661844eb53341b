//! Dispatcher under parallel events on a multi-threaded runtime.
//!
//! Reader events race on worker threads. Once every event has been handled,
//! each Fade Record's target must agree with the reader's active set, and the
//! ramps must settle the CC on that target.

use std::sync::Arc;
use std::time::Duration;

use tagfade_core::{EventDispatcher, FadeKey, FadeScope, FadeSettings, TagEvent};
use tagfade_tests::helpers::*;

const ROUNDS: usize = 20;
const TASKS: usize = 64;

fn quick() -> FadeSettings {
    FadeSettings {
        step_size: 16,
        fade_in: Duration::from_millis(16),
        fade_out: Duration::from_millis(16),
    }
}

fn expected_target(d: &EventDispatcher, tag: &str) -> u8 {
    if d.presence().is_active(&"1".into(), &tag.into()) {
        127
    } else {
        0
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_present_absent_keeps_target_in_step_with_presence() {
    for round in 0..ROUNDS {
        let (d, sink) = rig_with(FadeScope::PerReader, quick());
        let d = Arc::new(d);

        let handles: Vec<_> = (0..TASKS)
            .map(|i| {
                let d = Arc::clone(&d);
                tokio::spawn(async move {
                    let event = match i % 4 {
                        0 => TagEvent::present("1", TAG_A),
                        1 => TagEvent::absent("1"),
                        2 => TagEvent::present("1", TAG_B),
                        _ => TagEvent::absent("1"),
                    };
                    tokio::task::yield_now().await;
                    d.handle_event(&event);
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        for (tag, cc) in [(TAG_A, 21), (TAG_B, 22)] {
            let want = expected_target(&d, tag);
            let key = FadeKey::new("1", tag);
            let target = d.fades().state(&key).map_or(0, |s| s.target);
            assert_eq!(target, want, "round {round}: target for {tag}");

            tokio::time::sleep(Duration::from_millis(200)).await;
            if let Some(state) = d.fades().state(&key) {
                assert_eq!(state.current, want, "round {round}: current for {tag}");
                assert_eq!(sink.last_value(cc), Some(want), "round {round}: cc {cc}");
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_case_variants_yield_one_active_tag() {
    let (d, sink) = rig_with(FadeScope::PerReader, quick());
    let d = Arc::new(d);
    let upper = TAG_A.to_ascii_uppercase();

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let d = Arc::clone(&d);
            let raw = if i % 2 == 0 { TAG_A.to_owned() } else { upper.clone() };
            tokio::spawn(async move {
                d.handle_event(&TagEvent::present("1", raw.as_str()));
            })
        })
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(d.presence().active_tags(&"1".into()).len(), 1);
    assert_eq!(d.fades().snapshot().len(), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.last_value(21), Some(127));
}
