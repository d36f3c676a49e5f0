use crate::bench::errors::{BenchError, Result};
use crate::packet::Packet;
use crate::port::PortRegistry;
use serde_json::Value;
use tracing::debug;

/// A value on its way into an input port: either a raw value to wrap as a
/// data packet, or an already-formed packet to forward unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Value(Value),
    Packet(Packet),
}

impl Outgoing {
    fn into_packet(self) -> Packet {
        match self {
            Outgoing::Packet(packet) => packet,
            Outgoing::Value(value) => Packet::Data(value),
        }
    }
}

impl From<Packet> for Outgoing {
    fn from(packet: Packet) -> Self {
        Outgoing::Packet(packet)
    }
}

impl From<Value> for Outgoing {
    fn from(value: Value) -> Self {
        Outgoing::Value(value)
    }
}

impl From<&str> for Outgoing {
    fn from(value: &str) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

impl From<String> for Outgoing {
    fn from(value: String) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

impl From<i32> for Outgoing {
    fn from(value: i32) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

impl From<i64> for Outgoing {
    fn from(value: i64) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

impl From<f64> for Outgoing {
    fn from(value: f64) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

impl From<bool> for Outgoing {
    fn from(value: bool) -> Self {
        Outgoing::Value(Value::from(value))
    }
}

/// Posts caller-supplied values into exposed input ports.
pub struct Dispatcher<'a> {
    registry: &'a PortRegistry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a PortRegistry) -> Self {
        Self { registry }
    }

    /// Sends one value to one inport.
    ///
    /// A raw value is wrapped as a single data packet, forming one
    /// complete, self-terminating transmission rather than an open stream;
    /// a packet is forwarded unchanged. Fails synchronously on an unknown
    /// port name, with nothing posted. The call says nothing about
    /// delivery beyond its own return.
    pub fn send(&self, port: &str, value: impl Into<Outgoing>) -> Result<()> {
        let input = self
            .registry
            .input(port)
            .ok_or_else(|| BenchError::UnknownInport(port.to_string()))?;
        input.post(value.into().into_packet());
        Ok(())
    }

    /// Sends one value to each named inport.
    ///
    /// Every name is validated before any packet is posted, so an unknown
    /// port in the middle of the map leaves the network untouched.
    pub fn send_map<S, V>(&self, entries: Vec<(S, V)>) -> Result<()>
    where
        S: AsRef<str>,
        V: Into<Outgoing>,
    {
        for (port, _) in &entries {
            if self.registry.input(port.as_ref()).is_none() {
                return Err(BenchError::UnknownInport(port.as_ref().to_string()));
            }
        }
        debug!("posting to {} inports", entries.len());
        for (port, value) in entries {
            if let Some(input) = self.registry.input(port.as_ref()) {
                input.post(value.into().into_packet());
            }
        }
        Ok(())
    }
}
