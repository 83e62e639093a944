//! Quiet-period trigger: coalesces a burst of notifications into one action.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Trigger automaton state: no run scheduled, or one pending deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerState {
    Idle,
    Pending(Instant),
}

/// Fires a downstream action once per quiet window.
///
/// [`notify`](DebouncedTrigger::notify) records intent to run; each call
/// while a deadline is pending supersedes it, so the action fires exactly
/// once per burst, timed from the last notification. The state lives on a
/// single task, and notifications arriving while the action is awaited are
/// queued and coalesce into the next window.
pub struct DebouncedTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl DebouncedTrigger {
    /// Spawn the trigger task. The trigger stops when the returned handle is
    /// dropped; an in-flight action still runs to completion.
    pub fn spawn<A, Fut>(quiet: Duration, mut action: A) -> Self
    where
        A: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        tokio::spawn(async move {
            let mut state = TriggerState::Idle;
            loop {
                match state {
                    TriggerState::Idle => match rx.recv().await {
                        Some(()) => state = TriggerState::Pending(Instant::now() + quiet),
                        None => break,
                    },
                    TriggerState::Pending(deadline) => {
                        tokio::select! {
                            // An elapsed deadline wins over a queued
                            // notification: the fire happened first.
                            biased;
                            _ = sleep_until(deadline) => {
                                state = TriggerState::Idle;
                                action().await;
                            }
                            message = rx.recv() => match message {
                                // superseded: the window restarts from now
                                Some(()) => state = TriggerState::Pending(Instant::now() + quiet),
                                None => break,
                            },
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Record an intent to run the downstream action.
    pub fn notify(&self) {
        // Err means the trigger task is gone; nothing left to schedule.
        let _ = self.tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_trigger(quiet: Duration) -> (DebouncedTrigger, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let trigger = DebouncedTrigger::spawn(quiet, move || {
            let inner = inner.clone();
            async move {
                inner.fetch_add(1, Ordering::SeqCst);
            }
        });
        (trigger, count)
    }

    #[tokio::test]
    async fn burst_coalesces_into_one_run() {
        let (trigger, count) = counting_trigger(Duration::from_millis(100));

        for _ in 0..5 {
            trigger.notify();
            sleep(Duration::from_millis(10)).await;
        }

        sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn window_restarts_from_the_last_notification() {
        let (trigger, count) = counting_trigger(Duration::from_millis(200));

        trigger.notify();
        sleep(Duration::from_millis(100)).await;
        trigger.notify();

        // 200ms after the first notification, but only 100ms after the last:
        // still pending.
        sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn separated_notifications_fire_separately() {
        let (trigger, count) = counting_trigger(Duration::from_millis(50));

        trigger.notify();
        sleep(Duration::from_millis(200)).await;
        trigger.notify();
        sleep(Duration::from_millis(200)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn idle_trigger_does_nothing() {
        let (_trigger, count) = counting_trigger(Duration::from_millis(20));
        sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
