//! Runtime - shutdown signal and background timer driver

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};

/// Shutdown signal broadcaster
#[derive(Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
    triggered: Arc<RwLock<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self { Self::new() }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender, triggered: Arc::new(RwLock::new(false)) }
    }

    /// Subscribe to shutdown signal
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown
    pub async fn trigger(&self) {
        let mut triggered = self.triggered.write().await;
        if !*triggered {
            *triggered = true;
            let _ = self.sender.send(());
        }
    }

    /// Check if shutdown was triggered
    pub async fn is_triggered(&self) -> bool {
        *self.triggered.read().await
    }
}

/// Advance shell timers from wall-clock time until shutdown.
///
/// `on_tick` receives the milliseconds elapsed since the previous tick,
/// normally `|ms| async move { shell.advance_timers(ms).await; }`. The shell is `!Send`, so run
/// this inside a `tokio::task::LocalSet`.
pub async fn drive_timers<F, Fut>(tick_ms: u64, mut shutdown: broadcast::Receiver<()>, mut on_tick: F)
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    let mut last = Instant::now();
    tracing::debug!(tick_ms, "timer driver started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::debug!("timer driver stopped");
                break;
            }
            _ = interval.tick() => {
                let now = Instant::now();
                let elapsed = now.duration_since(last).as_millis() as u64;
                last = now;
                on_tick(elapsed).await;
            }
        }
    }
}
