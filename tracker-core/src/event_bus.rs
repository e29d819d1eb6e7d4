//! Typed pub/sub event bus connecting services (spec §2, §3 "Service
//! event", §9 "Event bus with heterogeneous events").
//!
//! Each event carries a tagged [`EventData`] payload rather than a C++
//! `std::variant`, per spec §9's guidance on mapping variants to Rust
//! enums. Subscribers are notified synchronously, in FIFO publish order; a
//! subscriber that resubscribes from inside its own callback only starts
//! receiving events published after that point (there is no backlog
//! replay).

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::gps::GpsLogEntry;

/// Identifies the service that originated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceIdentifier {
    Gnss,
    ArgosTx,
    ArgosRx,
    UwDetect,
    Ph,
    Pressure,
    SeaTemp,
    Als,
    Cdt,
    Axl,
}

/// The three event types the bus carries (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEventKind {
    Active,
    Inactive,
    LogUpdated,
}

/// Event payload. Only the variants services in this crate actually
/// consume are modelled; sensor-specific payloads from out-of-scope
/// services are carried opaquely.
#[derive(Debug, Clone, Copy)]
pub enum EventData {
    None,
    Bool(bool),
    GpsFix(GpsLogEntry),
}

/// A single published event.
#[derive(Debug, Clone, Copy)]
pub struct ServiceEvent {
    pub source: ServiceIdentifier,
    pub kind: ServiceEventKind,
    pub data: EventData,
    /// Distinguishes repeated events from the same source (e.g. successive
    /// TX attempts), per spec §3.
    pub originator_id: u32,
}

/// Implemented by services that want to observe the bus. All methods
/// default to "ignore", matching spec §9's "set of methods, each defaulted
/// to ignore" guidance.
pub trait ServiceEventListener {
    fn on_event(&mut self, _event: &ServiceEvent) {}
}

/// FIFO-ordered pub/sub bus. Subscribers are references into the owning
/// services (the scheduler owns the services themselves, per spec §9), so
/// the bus stores raw pointers behind a lifetime-erased trait object only
/// for the duration of a `publish` call — callers drive dispatch by handing
/// the bus a fresh slice of listeners each time rather than the bus owning
/// them across calls. This keeps the core free of `unsafe` and of a global
/// singleton registry.
#[derive(Default)]
pub struct EventBus {
    #[cfg(feature = "alloc")]
    queue: Vec<ServiceEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event for later dispatch. Interrupts deliver events this
    /// way (spec §5): they must not touch configuration-store or
    /// depth-pile state directly, only enqueue.
    #[cfg(feature = "alloc")]
    pub fn publish(&mut self, event: ServiceEvent) {
        self.queue.push(event);
    }

    /// Drains the queue, dispatching each event to every listener in FIFO
    /// order. A listener added to `listeners` mid-drain (by resubscribing
    /// inside `on_event`) is the caller's responsibility to honour: this
    /// bus dispatches to exactly the slice handed to it for each drain.
    #[cfg(feature = "alloc")]
    pub fn drain_dispatch(&mut self, listeners: &mut [&mut dyn ServiceEventListener]) {
        for event in self.queue.drain(..) {
            for listener in listeners.iter_mut() {
                listener.on_event(&event);
            }
        }
    }

    #[cfg(feature = "alloc")]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;

    struct Counter(u32);
    impl ServiceEventListener for Counter {
        fn on_event(&mut self, _event: &ServiceEvent) {
            self.0 += 1;
        }
    }

    #[test]
    fn dispatches_in_fifo_order_to_all_listeners() {
        let mut bus = EventBus::new();
        bus.publish(ServiceEvent {
            source: ServiceIdentifier::Gnss,
            kind: ServiceEventKind::LogUpdated,
            data: EventData::None,
            originator_id: 1,
        });
        bus.publish(ServiceEvent {
            source: ServiceIdentifier::Gnss,
            kind: ServiceEventKind::LogUpdated,
            data: EventData::None,
            originator_id: 2,
        });
        let mut a = Counter(0);
        let mut b = Counter(0);
        let mut listeners: [&mut dyn ServiceEventListener; 2] = [&mut a, &mut b];
        bus.drain_dispatch(&mut listeners);
        assert_eq!(a.0, 2);
        assert_eq!(b.0, 2);
        assert!(bus.is_empty());
    }
}
