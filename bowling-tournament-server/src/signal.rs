//! Graceful shutdown.
//!
//! The http listener and every open connection hold a [`ShutdownListener`]. Once
//! [`Shutdown::terminate`] is called all listeners are notified and `terminate` waits
//! until every listener was dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// Completes when the process receives SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => log::debug!("Received SIGINT"),
                    _ = sigterm.recv() => log::debug!("Received SIGTERM"),
                }
                return;
            }
            Err(err) => {
                log::warn!("Failed to install SIGTERM handler: {}", err);
            }
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for SIGINT: {}", err);
    }
}

#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
    listeners: Arc<Listeners>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);

        Self {
            tx,
            rx,
            listeners: Arc::default(),
        }
    }

    pub fn listen(&self) -> ShutdownListener {
        self.listeners.count.fetch_add(1, Ordering::SeqCst);

        ShutdownListener {
            rx: self.rx.clone(),
            listeners: self.listeners.clone(),
        }
    }

    /// Notifies all listeners and waits until all of them are dropped.
    pub async fn terminate(&self) {
        let _ = self.tx.send(true);

        log::debug!(
            "Awaiting {} shutdown listeners",
            self.listeners.count.load(Ordering::SeqCst)
        );

        loop {
            let notified = self.listeners.notify.notified();
            if self.listeners.count.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Listeners {
    count: AtomicUsize,
    notify: Notify,
}

#[derive(Debug)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
    listeners: Arc<Listeners>,
}

impl ShutdownListener {
    pub fn is_active(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the shutdown was started.
    pub async fn wait(&mut self) {
        while !self.is_active() {
            // The sender lives as long as the state.
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Drop for ShutdownListener {
    fn drop(&mut self) {
        if self.listeners.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.listeners.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Shutdown;

    #[tokio::test]
    async fn test_shutdown() {
        let shutdown = Shutdown::new();

        let mut listener = shutdown.listen();
        assert!(!listener.is_active());

        let task = tokio::task::spawn(async move {
            listener.wait().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        });

        tokio::time::timeout(Duration::from_secs(5), shutdown.terminate())
            .await
            .unwrap();

        task.await.unwrap();
        assert!(shutdown.listen().is_active());
    }
}
