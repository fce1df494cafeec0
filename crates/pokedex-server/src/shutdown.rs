//! Shutdown coordination.
//!
//! Two cooperating pieces drive the graceful drain:
//!
//! - [`ShutdownSignal`] is the trigger. It can be cloned across tasks and
//!   fired from anywhere (caller code or the OS signal watcher); every
//!   waiter sees the first trigger and later triggers are no-ops.
//! - [`ConnectionTracker`] counts live connections through RAII
//!   [`ConnectionToken`]s, so the drain can wait for the count to reach
//!   zero instead of guessing.
//!
//! # Example
//!
//! ```rust
//! use pokedex_server::ShutdownSignal;
//!
//! let shutdown = ShutdownSignal::new();
//! let handle = shutdown.clone();
//!
//! handle.trigger();
//! assert!(shutdown.is_shutdown());
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{broadcast, Notify};
use tracing::info;

/// A clonable, one-shot shutdown trigger.
///
/// All clones share the same state: the first [`trigger`](Self::trigger)
/// wakes every waiter, on every clone, exactly once.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    /// Latched once the signal has fired.
    triggered: Arc<AtomicBool>,

    /// Broadcast channel waking tasks blocked in [`recv`](Self::recv).
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Fires the signal. Idempotent; only the first call notifies waiters.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine; the latch still flips.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once the signal has fired.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that resolves when the signal fires.
    ///
    /// Resolves immediately when the signal has already fired, so it is
    /// safe to start waiting after the fact.
    pub fn recv(&self) -> ShutdownReceiver {
        let mut receiver = self.sender.subscribe();
        ShutdownReceiver {
            triggered: Arc::clone(&self.triggered),
            receiver: Box::pin(async move {
                let _ = receiver.recv().await;
            }),
        }
    }

    /// Creates a signal wired to the process signal handlers.
    ///
    /// The returned signal fires on SIGTERM or SIGINT, whichever comes
    /// first. It can still be triggered manually like any other signal.
    ///
    /// # Panics
    ///
    /// Panics if the OS signal handlers cannot be registered.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let watcher = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            watcher.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`ShutdownSignal::recv`].
pub struct ShutdownReceiver {
    triggered: Arc<AtomicBool>,
    // The broadcast `Recv` future deregisters its waker when dropped, so it
    // has to live across polls; boxing lets it own the subscribed receiver.
    receiver: Pin<Box<dyn Future<Output = ()> + Send + Sync>>,
}

impl Future for ShutdownReceiver {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Fast path covers waiters that subscribed after the trigger.
        if self.triggered.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }

        match self.receiver.as_mut().poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C on non-Unix platforms).
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to wait for Ctrl+C");
        info!("received Ctrl+C, shutting down");
    }
}

/// Counts live connections for the drain phase.
///
/// The accept loop [`acquire`](Self::acquire)s one token per connection and
/// hands it to the connection task; the token's drop is the bookkeeping, so
/// a connection can never be leaked out of the count, panics included.
///
/// # Example
///
/// ```rust
/// use pokedex_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Registers a connection and returns its token.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Returns the number of live connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Resolves once every token has been dropped.
    ///
    /// Completes immediately when nothing is registered.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before re-reading the count, otherwise a
            // token dropped between the read and the await is missed.
            if notified.as_mut().enable() || self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one live connection.
///
/// Dropping it decrements the tracker and wakes the drain waiter when it
/// was the last one.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        let prev = self.active.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready};

    #[test]
    fn test_signal_starts_untriggered() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
        assert!(!ShutdownSignal::default().is_shutdown());
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_clones_share_the_trigger() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();

        clone.trigger();

        assert!(signal.is_shutdown());
        assert!(clone.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_resolves_on_trigger() {
        let signal = ShutdownSignal::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("recv should resolve after trigger");
    }

    #[tokio::test]
    async fn test_recv_resolves_immediately_after_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        // Subscribing after the fact must not miss the signal.
        tokio::time::timeout(Duration::from_millis(10), signal.recv())
            .await
            .expect("recv should resolve immediately");
    }

    #[tokio::test]
    async fn test_recv_resolves_for_every_waiter() {
        let signal = ShutdownSignal::new();
        let first = signal.recv();
        let second = signal.recv();

        signal.trigger();

        tokio::time::timeout(Duration::from_millis(50), first)
            .await
            .expect("first waiter should resolve");
        tokio::time::timeout(Duration::from_millis(50), second)
            .await
            .expect("second waiter should resolve");
    }

    #[test]
    fn test_recv_is_pending_until_trigger() {
        let signal = ShutdownSignal::new();
        let mut recv = tokio_test::task::spawn(signal.recv());

        assert_pending!(recv.poll());

        signal.trigger();
        assert!(recv.is_woken());
        assert_ready!(recv.poll());
    }

    #[test]
    fn test_tracker_counts_tokens() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.active_connections(), 0);

        let token1 = tracker.acquire();
        let token2 = tracker.acquire();
        assert_eq!(tracker.active_connections(), 2);

        drop(token1);
        assert_eq!(tracker.active_connections(), 1);

        drop(token2);
        assert_eq!(tracker.active_connections(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_idle_is_immediate_when_empty() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_millis(10), tracker.wait_for_idle())
            .await
            .expect("wait_for_idle should resolve immediately");
    }

    #[tokio::test]
    async fn test_wait_for_idle_resolves_after_last_drop() {
        let tracker = ConnectionTracker::new();
        let token = tracker.acquire();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_for_idle().await })
        };

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(token);
        });

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should resolve")
            .expect("waiter task should not panic");
    }

    #[tokio::test]
    async fn test_wait_for_idle_outlasts_interleaved_tokens() {
        let tracker = ConnectionTracker::new();
        let token1 = tracker.acquire();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_for_idle().await })
        };

        // A second token arrives while the first is still open.
        let token2 = tracker.acquire();
        drop(token1);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(token2);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should resolve")
            .expect("waiter task should not panic");
    }

    #[test]
    fn test_wait_for_idle_wakes_on_last_drop() {
        let tracker = ConnectionTracker::new();
        let token = tracker.acquire();
        let mut wait = tokio_test::task::spawn(tracker.wait_for_idle());

        assert_pending!(wait.poll());

        drop(token);
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
    }
}
