use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One atomic unit of data or control flowing through a port.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Packet {
    /// A payload-carrying packet.
    Data(Value),
    /// Opens a logical group, with an optional label.
    OpenBracket(Option<Value>),
    /// Closes the innermost open group.
    CloseBracket,
    /// Bracket-free end-of-transmission signal, kept for ports that
    /// predate bracketed streams.
    Disconnect,
}

impl Packet {
    /// Create a data packet from any JSON-convertible payload
    pub fn data(payload: impl Into<Value>) -> Self {
        Packet::Data(payload.into())
    }

    /// Create a labelled open bracket
    pub fn open_bracket(label: impl Into<Value>) -> Self {
        Packet::OpenBracket(Some(label.into()))
    }

    /// Create an unlabelled open bracket
    pub fn open_bracket_anonymous() -> Self {
        Packet::OpenBracket(None)
    }

    /// Check if this packet carries a payload
    pub fn is_data(&self) -> bool {
        matches!(self, Packet::Data(_))
    }

    /// Check if this packet is an open or close bracket
    pub fn is_bracket(&self) -> bool {
        matches!(self, Packet::OpenBracket(_) | Packet::CloseBracket)
    }

    /// Get the packet kind as a string
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Data(_) => "data",
            Packet::OpenBracket(_) => "openBracket",
            Packet::CloseBracket => "closeBracket",
            Packet::Disconnect => "disconnect",
        }
    }
}

/// An event as delivered by an output port.
///
/// Ports speak two dialects. Old-style ports emit separate `Data`,
/// `BeginGroup` and `Disconnect` events per transmission; newer ports
/// deliver a unified packet stream via `Ip`. Ports in transition emit both
/// representations of the same transmission, so an aggregation window must
/// commit to one family and ignore the other.
#[derive(Debug, Clone, PartialEq)]
pub enum PortEvent {
    /// Old-style payload event
    Data(Value),
    /// Old-style group-start event
    BeginGroup(Value),
    /// Old-style end-of-transmission event
    Disconnect,
    /// One packet of the unified stream
    Ip(Packet),
}

impl PortEvent {
    /// Get the event kind as a string
    pub fn kind(&self) -> &'static str {
        match self {
            PortEvent::Data(_) => "data",
            PortEvent::BeginGroup(_) => "begingroup",
            PortEvent::Disconnect => "disconnect",
            PortEvent::Ip(_) => "ip",
        }
    }
}
