//! Render pass scheduling.
//!
//! Filter edits arrive in bursts. [`RenderScheduler`] collapses a burst into a
//! single pass fired once the input has been quiet for [`RENDER_DELAY`].
//! [`RenderGuard`] keeps at most one pass in flight.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};

pub const RENDER_DELAY: Duration = Duration::from_millis(200);

pub struct RenderScheduler {
    delay: Duration,
    tx: mpsc::UnboundedSender<()>,
    pending: Option<JoinHandle<()>>,
}

impl RenderScheduler {
    /// Each fired pass sends one `()` on `tx`.
    pub fn new(tx: mpsc::UnboundedSender<()>, delay: Duration) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Restarts the countdown, dropping any pass not yet fired.
    pub fn schedule(&mut self) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Re-entrancy guard for render passes.
#[derive(Debug, Clone, Default)]
pub struct RenderGuard {
    busy: Arc<AtomicBool>,
}

impl RenderGuard {
    /// `None` while another pass holds the guard; the caller drops its pass.
    pub fn try_begin(&self) -> Option<RenderPass> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RenderPass {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Held for the duration of a pass; releases the guard on drop.
#[must_use]
pub struct RenderPass {
    busy: Arc<AtomicBool>,
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
