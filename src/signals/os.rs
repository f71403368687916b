//! OS Signal Listener
//!
//! Forwards process signals to a [`SignalBus`]:
//! - `SIGUSR1` posts [`LifecycleSignal::MemoryPressure`]
//! - `SIGUSR2` posts [`LifecycleSignal::EnteredBackground`]

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::error::Result;
use crate::signals::{LifecycleSignal, SignalBus};

/// Installs the OS signal handlers and spawns a task that forwards deliveries
/// to `bus`.
///
/// Handlers are installed before the task is spawned, so installation failures
/// are returned here rather than lost inside the task. Must be called from
/// within a tokio runtime.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be aborted during shutdown.
#[cfg(unix)]
pub fn spawn_os_signal_listener(bus: Arc<SignalBus>) -> Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut memory_pressure = signal(SignalKind::user_defined1())?;
    let mut entered_background = signal(SignalKind::user_defined2())?;

    Ok(tokio::spawn(async move {
        info!("Forwarding SIGUSR1/SIGUSR2 as lifecycle signals");

        loop {
            let signal = tokio::select! {
                received = memory_pressure.recv() => received.map(|_| LifecycleSignal::MemoryPressure),
                received = entered_background.recv() => received.map(|_| LifecycleSignal::EnteredBackground),
            };

            let Some(signal) = signal else {
                break;
            };

            // Handlers take a blocking lock on each cache.
            let bus = Arc::clone(&bus);
            match tokio::task::spawn_blocking(move || bus.post(signal)).await {
                Ok(delivered) => info!(%signal, delivered, "Lifecycle signal received"),
                Err(err) => {
                    tracing::warn!(%signal, error = %err, "Lifecycle signal handlers failed")
                }
            }
        }
    }))
}

/// Non-Unix hosts have no signal mapping; the task idles until aborted.
#[cfg(not(unix))]
pub fn spawn_os_signal_listener(bus: Arc<SignalBus>) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        let _bus = bus;
        info!("No OS lifecycle signals on this platform");
        std::future::pending::<()>().await;
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[cfg(unix)]
    use crate::cache::KingCache;
    #[cfg(unix)]
    use crate::signals::{LifecycleSignalSource, SignalHandler};

    #[tokio::test]
    async fn test_listener_starts_and_can_be_aborted() {
        let bus = Arc::new(SignalBus::new());

        let handle = spawn_os_signal_listener(bus).unwrap();
        assert!(!handle.is_finished());

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[cfg(unix)]
    fn send_to_self(signal: &str) {
        let status = std::process::Command::new("kill")
            .arg(signal)
            .arg(std::process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    async fn wait_until_empty(cache: &KingCache) -> bool {
        for _ in 0..200 {
            if cache.is_empty() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cache.is_empty()
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_signals_flush_subscribed_cache() {
        let bus = Arc::new(SignalBus::new());
        let cache = KingCache::with_source(bus.clone());
        let handle = spawn_os_signal_listener(Arc::clone(&bus)).unwrap();

        for (signal, flushes) in [("-USR1", 1), ("-USR2", 2)] {
            for key in 0..4_i64 {
                cache.set(key, key);
            }
            assert_eq!(cache.count(), 4);

            send_to_self(signal);

            assert!(wait_until_empty(&cache).await, "{signal} did not flush");
            assert_eq!(cache.stats().flushes, flushes);
        }

        // A panicking handler must not stop the listener
        let failing: SignalHandler = Arc::new(|_: LifecycleSignal| panic!("handler failure"));
        bus.subscribe(LifecycleSignal::MemoryPressure, failing);
        for (signal, flushes) in [("-USR1", 3), ("-USR2", 4)] {
            cache.set(1_i64, 1_i64);

            send_to_self(signal);

            assert!(wait_until_empty(&cache).await, "{signal} did not flush");
            assert_eq!(cache.stats().flushes, flushes);
        }
        assert!(!handle.is_finished());

        handle.abort();
    }
}
