//! Signal Bus Module
//!
//! In-process lifecycle signal source with synchronous delivery.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

// == Lifecycle Signal ==
/// Host events that make every subscribed cache drop its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleSignal {
    /// The host is running low on memory
    MemoryPressure,
    /// The host application moved to the background
    EnteredBackground,
}

impl LifecycleSignal {
    /// Every signal a cache subscribes to.
    pub const ALL: [LifecycleSignal; 2] = [
        LifecycleSignal::MemoryPressure,
        LifecycleSignal::EnteredBackground,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleSignal::MemoryPressure => "memory_pressure",
            LifecycleSignal::EnteredBackground => "entered_background",
        }
    }
}

impl fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked on signal delivery.
pub type SignalHandler = Arc<dyn Fn(LifecycleSignal) + Send + Sync>;

/// Identifies one registration with a signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

// == Signal Source ==
/// Anything that can deliver lifecycle signals to registered handlers.
pub trait LifecycleSignalSource: Send + Sync {
    /// Registers `handler` for `signal`.
    fn subscribe(&self, signal: LifecycleSignal, handler: SignalHandler) -> SubscriptionId;

    /// Removes a registration. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

// == Subscription Guard ==
/// Keeps a registration alive; unsubscribes when dropped.
pub struct Subscription {
    source: Arc<dyn LifecycleSignalSource>,
    id: SubscriptionId,
}

impl Subscription {
    /// Subscribes `handler` to `signal` on `source` and returns the guard.
    pub fn register(
        source: Arc<dyn LifecycleSignalSource>,
        signal: LifecycleSignal,
        handler: SignalHandler,
    ) -> Self {
        let id = source.subscribe(signal, handler);
        Self { source, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.source.unsubscribe(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// == Signal Bus ==
struct Registration {
    id: SubscriptionId,
    signal: LifecycleSignal,
    handler: SignalHandler,
}

static GLOBAL_BUS: Lazy<Arc<SignalBus>> = Lazy::new(|| Arc::new(SignalBus::new()));

/// A [`LifecycleSignalSource`] that delivers posted signals synchronously on
/// the posting thread.
#[derive(Default)]
pub struct SignalBus {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl SignalBus {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus.
    pub fn global() -> Arc<SignalBus> {
        Arc::clone(&GLOBAL_BUS)
    }

    // == Post ==
    /// Delivers `signal` to every handler registered for it.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// subscribe or unsubscribe. Returns the number of handlers invoked.
    pub fn post(&self, signal: LifecycleSignal) -> usize {
        let handlers: Vec<SignalHandler> = self
            .registrations
            .lock()
            .iter()
            .filter(|registration| registration.signal == signal)
            .map(|registration| Arc::clone(&registration.handler))
            .collect();

        debug!(%signal, handlers = handlers.len(), "Posting lifecycle signal");

        for handler in &handlers {
            handler(signal);
        }
        handlers.len()
    }

    /// Number of live registrations across all signals.
    pub fn subscriber_count(&self) -> usize {
        self.registrations.lock().len()
    }
}

impl LifecycleSignalSource for SignalBus {
    fn subscribe(&self, signal: LifecycleSignal, handler: SignalHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            signal,
            handler,
        });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.registrations
            .lock()
            .retain(|registration| registration.id != id);
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
