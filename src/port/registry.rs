use crate::packet::{Packet, PortEvent};
use crate::port::subscription::{lock_slot, ListenerSlot, Subscription};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{trace, warn};

/// Injection side of an exposed input port.
pub struct InputPort {
    name: String,
    tx: mpsc::UnboundedSender<Packet>,
}

impl InputPort {
    /// Delivers one packet into the network.
    ///
    /// Delivery is asynchronous; the call reports nothing about what the
    /// network does with the packet. A packet posted after the network side
    /// has gone away is dropped.
    pub fn post(&self, packet: Packet) {
        trace!("{}: posting {} packet", self.name, packet.kind());
        if self.tx.send(packet).is_err() {
            warn!("{}: network side of inport is gone, packet dropped", self.name);
        }
    }
}

/// Listening side of an exposed output port.
///
/// Holds the slot for the port's single listener. At most one subscription
/// is live at a time; subscribing again replaces the previous listener and
/// orphans its aggregation window.
pub struct OutputPort {
    name: String,
    listener: ListenerSlot,
}

impl OutputPort {
    /// Attaches a fresh listener, replacing any existing one.
    pub fn subscribe(&self) -> Subscription {
        Subscription::attach(self.name.clone(), Arc::clone(&self.listener))
    }
}

/// Handle the network uses to deliver events to an output port.
///
/// Events emitted while no listener is attached are dropped, like a stream
/// nobody is watching.
#[derive(Clone)]
pub struct OutputEmitter {
    name: String,
    listener: ListenerSlot,
}

impl OutputEmitter {
    /// Delivers one event to the port's current listener, if any.
    pub fn emit(&self, event: PortEvent) {
        let listener = lock_slot(&self.listener);
        match listener.as_ref() {
            Some(l) => {
                // A replaced listener's receiver may be gone already.
                if l.tx.send(event).is_err() {
                    trace!("{}: listener receiver dropped, event lost", self.name);
                }
            }
            None => trace!("{}: no listener, event dropped", self.name),
        }
    }

    /// Emit an old-style payload event
    pub fn data(&self, payload: impl Into<Value>) {
        self.emit(PortEvent::Data(payload.into()));
    }

    /// Emit an old-style group-start event
    pub fn begin_group(&self, label: impl Into<Value>) {
        self.emit(PortEvent::BeginGroup(label.into()));
    }

    /// Emit an old-style end-of-transmission event
    pub fn disconnect(&self) {
        self.emit(PortEvent::Disconnect);
    }

    /// Emit one packet of the unified stream
    pub fn ip(&self, packet: Packet) {
        self.emit(PortEvent::Ip(packet));
    }
}

/// Named ports exposed by the network under test.
///
/// Built once when the bench is assembled: the code wiring up the network
/// opens each exported port here and keeps the returned channel ends, then
/// hands the registry to the bench. Dispatcher and synchronizer resolve
/// port names against it; a name that was never opened is an unknown port.
#[derive(Default)]
pub struct PortRegistry {
    ins: HashMap<String, InputPort>,
    outs: HashMap<String, OutputPort>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposes an input port, returning the receiving end the network
    /// consumes posted packets from. Re-opening a name replaces the
    /// previous channel.
    pub fn open_input(&mut self, name: &str) -> UnboundedReceiver<Packet> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.ins.insert(
            name.to_string(),
            InputPort {
                name: name.to_string(),
                tx,
            },
        );
        rx
    }

    /// Exposes an output port, returning the emitter the network delivers
    /// events through.
    pub fn open_output(&mut self, name: &str) -> OutputEmitter {
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let emitter = OutputEmitter {
            name: name.to_string(),
            listener: Arc::clone(&listener),
        };
        self.outs.insert(
            name.to_string(),
            OutputPort {
                name: name.to_string(),
                listener,
            },
        );
        emitter
    }

    /// Look up an exposed input port by name
    pub fn input(&self, name: &str) -> Option<&InputPort> {
        self.ins.get(name)
    }

    /// Look up an exposed output port by name
    pub fn output(&self, name: &str) -> Option<&OutputPort> {
        self.outs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_reaches_network_receiver() {
        let mut registry = PortRegistry::new();
        let mut rx = registry.open_input("in");

        let input = registry.input("in").expect("inport should be exposed");
        input.post(Packet::data("payload"));

        assert_eq!(rx.recv().await, Some(Packet::Data(json!("payload"))));
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let mut registry = PortRegistry::new();
        let emitter = registry.open_output("out");

        let mut sub = registry.output("out").expect("outport").subscribe();
        emitter.data(7);

        assert_eq!(sub.next().await, Some(PortEvent::Data(json!(7))));
    }

    #[test]
    fn test_emit_without_listener_is_dropped() {
        let mut registry = PortRegistry::new();
        let emitter = registry.open_output("out");

        // Nothing listening: must not panic or buffer
        emitter.data(1);
        emitter.disconnect();
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_listener() {
        let mut registry = PortRegistry::new();
        let emitter = registry.open_output("out");
        let out = registry.output("out").expect("outport");

        let mut first = out.subscribe();
        let mut second = out.subscribe();

        emitter.data(42);
        assert_eq!(second.next().await, Some(PortEvent::Data(json!(42))));
        // The replaced subscription's channel closed without delivering
        assert_eq!(first.next().await, None);
    }

    #[tokio::test]
    async fn test_cancel_detaches_listener() {
        let mut registry = PortRegistry::new();
        let emitter = registry.open_output("out");
        let out = registry.output("out").expect("outport");

        let sub = out.subscribe();
        sub.cancel();
        emitter.data(1);

        // A new subscription sees only events emitted after it attached
        let mut fresh = out.subscribe();
        emitter.data(2);
        assert_eq!(fresh.next().await, Some(PortEvent::Data(json!(2))));
    }

    #[tokio::test]
    async fn test_cancel_of_replaced_subscription_leaves_newer_listener() {
        let mut registry = PortRegistry::new();
        let emitter = registry.open_output("out");
        let out = registry.output("out").expect("outport");

        let old = out.subscribe();
        let mut new = out.subscribe();

        // Cancelling the orphaned handle must not detach the live one
        old.cancel();
        emitter.data(9);
        assert_eq!(new.next().await, Some(PortEvent::Data(json!(9))));
    }

    #[test]
    fn test_unknown_names_resolve_to_none() {
        let registry = PortRegistry::new();
        assert!(registry.input("nope").is_none());
        assert!(registry.output("nope").is_none());
    }
}
