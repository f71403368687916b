//! Lifecycle Signals Module
//!
//! Process-wide events that flush subscribed caches, plus the OS wiring that
//! produces them.

mod bus;
mod os;

pub use bus::{
    LifecycleSignal, LifecycleSignalSource, SignalBus, SignalHandler, Subscription,
    SubscriptionId,
};
pub use os::spawn_os_signal_listener;
