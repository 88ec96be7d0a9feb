use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::DeviceApi;
use crate::reconciler::UpdateSink;
use crate::snapshot::Update;

/// Running poll schedule. Dropping it stops the schedule as well.
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancels the schedule. Requests already in flight may still finish,
    /// but nothing they return is published.
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct ResourcePoller;

impl ResourcePoller {
    /// Polls immediately, then every `period` until stopped.
    pub fn start<A: DeviceApi>(
        api: Arc<A>,
        period: Duration,
        sink: Arc<dyn UpdateSink>,
    ) -> PollerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(run_schedule(api, period, sink, token.clone()));
        PollerHandle {
            token,
            task: Some(task),
        }
    }

    /// A single unguarded fan-out, for one-shot callers.
    pub async fn poll_once<A: DeviceApi>(api: &A, sink: &dyn UpdateSink) {
        poll_cycle(api, sink, &CancellationToken::new()).await;
    }
}

async fn run_schedule<A: DeviceApi>(
    api: Arc<A>,
    period: Duration,
    sink: Arc<dyn UpdateSink>,
    token: CancellationToken,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                // cycles are not awaited here; a slow cycle may overlap the next one
                let api = Arc::clone(&api);
                let sink = Arc::clone(&sink);
                let guard = token.clone();
                tokio::spawn(async move {
                    poll_cycle(api.as_ref(), sink.as_ref(), &guard).await;
                });
            }
        }
    }

    debug!("poll schedule stopped");
}

async fn poll_cycle<A: DeviceApi + ?Sized>(api: &A, sink: &dyn UpdateSink, guard: &CancellationToken) {
    let status = async {
        match api.fetch_status().await {
            Ok(snapshot) => apply(sink, guard, Update::Status(snapshot)),
            Err(err) => warn!(resource = "status", error = %err, "fetch failed"),
        }
    };
    let gps = async {
        match api.fetch_gps().await {
            Ok(snapshot) => apply(sink, guard, Update::Gps(snapshot)),
            Err(err) => warn!(resource = "gps", error = %err, "fetch failed"),
        }
    };
    let ntp = async {
        match api.fetch_ntp().await {
            Ok(snapshot) => apply(sink, guard, Update::Ntp(snapshot)),
            Err(err) => warn!(resource = "ntp", error = %err, "fetch failed"),
        }
    };

    tokio::join!(status, gps, ntp);
}

fn apply(sink: &dyn UpdateSink, guard: &CancellationToken, update: Update) {
    if guard.is_cancelled() {
        debug!("discarding poll result after stop");
        return;
    }
    sink.publish(update);
}
