use tokio::sync::watch;

use crate::snapshot::{Update, ViewState};

/// Where producers push their updates.
pub trait UpdateSink: Send + Sync {
    fn publish(&self, update: Update);
}

/// Returns the view after applying one update; `previous` is left untouched.
pub fn reconcile(previous: &ViewState, update: Update) -> ViewState {
    let mut next = previous.clone();
    match update {
        Update::Status(status) => next.status = Some(status),
        Update::Gps(gps) => next.gps = Some(gps),
        Update::Ntp(ntp) => next.ntp = Some(ntp),
        Update::LiveTime(sample) => next.live_time = Some(sample),
        Update::Connection(state) => next.connection = state,
    }
    next
}

/// Sole owner of the current [`ViewState`].
pub struct Reconciler {
    tx: watch::Sender<ViewState>,
}

impl Reconciler {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ViewState {
        self.tx.borrow().clone()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateSink for Reconciler {
    fn publish(&self, update: Update) {
        // send_modify notifies even when nobody is subscribed yet
        self.tx.send_modify(|view| {
            let next = reconcile(view, update);
            *view = next;
        });
    }
}
