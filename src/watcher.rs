// src/watcher.rs
// One watcher task per platform: tick → poll → diff → notify → persist.
// Errors stop at the cycle boundary; the loop itself never exits.

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::diff::diff;
use crate::notify::Notifier;
use crate::platform::types::{PlatformPoller, PollError};
use crate::state::{LastSeenState, StateStore};
use crate::status::StatusRegistry;

/// One fetch–compare–notify–persist iteration.
///
/// State is committed only after delivery of this cycle's events has been
/// attempted; a poll failure leaves it untouched. A failed delivery is logged
/// and dropped with its id still committed, so a superseded item is never
/// re-sent.
pub async fn run_cycle<P, N>(
    poller: &P,
    notifier: &N,
    store: &StateStore,
    status: &StatusRegistry,
    state: &mut Option<LastSeenState>,
) where
    P: PlatformPoller,
    N: Notifier,
{
    let platform = poller.platform();
    let now = Utc::now();

    match poller.poll().await {
        Ok(snapshot) => {
            let (events, next) = diff(state.as_ref(), &snapshot, platform, now);

            let mut delivered = 0usize;
            for ev in &events {
                match notifier.send(ev).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(%platform, kind = ?ev.kind, "notification dropped: {e:#}");
                    }
                }
            }

            store.save(&next).await;
            *state = Some(next);

            let detail = if events.is_empty() {
                "no new content".to_string()
            } else {
                format!("{} event(s), {} delivered", events.len(), delivered)
            };
            if !events.is_empty() {
                tracing::info!(%platform, events = events.len(), delivered, "poll cycle done");
            }
            status.record_success(platform, now, detail);
        }
        Err(PollError::RateLimited) => {
            tracing::warn!(%platform, "upstream rate limit, skipping cycle");
            status.record_failure(platform, now, "rate limited by upstream API".into());
        }
        Err(PollError::Unavailable(e)) => {
            tracing::warn!(%platform, "poll failed: {e:#}");
            status.record_failure(platform, now, format!("{e:#}"));
        }
    }
}

/// Drives `run_cycle` forever on a fixed period. The first tick fires
/// immediately; an overrunning cycle delays the next tick instead of
/// bursting.
pub async fn run_watcher<P, N>(
    poller: P,
    notifier: N,
    store: StateStore,
    status: std::sync::Arc<StatusRegistry>,
    period: Duration,
) where
    P: PlatformPoller,
    N: Notifier,
{
    let platform = poller.platform();
    let mut state = store.load().await;
    tracing::info!(
        %platform,
        period_secs = period.as_secs(),
        seeded = state.is_some(),
        "watcher started"
    );

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_cycle(&poller, &notifier, &store, &status, &mut state).await;
    }
}
