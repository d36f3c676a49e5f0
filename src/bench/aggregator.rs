use crate::packet::{Packet, PortEvent};
use crate::port::Subscription;
use serde_json::Value;
use tracing::{debug, trace};

/// Which event family drives the current window.
///
/// Every window starts in `Legacy`. The first unified packet event switches
/// it to `Structured` for the rest of the window, and old-style events are
/// ignored from then on. A port that emits both representations of the same
/// transmission therefore counts it once, as long as the unified event
/// arrives first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Old-style events; the window completes at the first disconnect.
    Legacy,
    /// Unified packets; the window completes whenever bracket depth is zero
    /// after a packet has been processed.
    Structured,
}

/// Consolidated result of one aggregation window.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    /// Collected payloads. A window that collected exactly one value
    /// unwraps to that scalar; zero or several stay an ordered array.
    pub data: Value,
    /// Distinct group labels in order of first appearance
    pub groups: Vec<Value>,
    /// How many payloads were collected
    pub data_count: usize,
    /// How many distinct groups were seen
    pub group_count: usize,
}

/// State collected over one aggregation window on one port.
///
/// The state machine is synchronous and self-contained; [`collect`] drives
/// it from a port subscription. It trusts the wire: bracket depth going
/// negative or events arriving after completion are not corrected.
#[derive(Debug)]
pub struct Aggregation {
    data: Vec<Value>,
    groups: Vec<Value>,
    depth: i64,
    mode: WindowMode,
    complete: bool,
}

impl Aggregation {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            groups: Vec::new(),
            depth: 0,
            mode: WindowMode::Legacy,
            complete: false,
        }
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn bracket_depth(&self) -> i64 {
        self.depth
    }

    /// Feeds one event through the state machine.
    ///
    /// Returns `true` once the window has completed; the caller should then
    /// detach from the port and stop feeding events.
    pub fn observe(&mut self, event: PortEvent) -> bool {
        match event {
            PortEvent::Ip(packet) => self.observe_packet(packet),
            PortEvent::Data(payload) => {
                if self.mode == WindowMode::Legacy {
                    self.data.push(payload);
                }
            }
            PortEvent::BeginGroup(label) => {
                if self.mode == WindowMode::Legacy {
                    self.push_group(label);
                }
            }
            PortEvent::Disconnect => {
                if self.mode == WindowMode::Legacy {
                    self.complete = true;
                }
            }
        }
        self.complete
    }

    fn observe_packet(&mut self, packet: Packet) {
        self.mode = WindowMode::Structured;
        match packet {
            Packet::OpenBracket(label) => {
                self.depth += 1;
                // Null labels mark anonymous groups and are not collected
                if let Some(label) = label {
                    if !label.is_null() {
                        self.push_group(label);
                    }
                }
            }
            Packet::CloseBracket => {
                self.depth -= 1;
            }
            Packet::Data(payload) => {
                self.data.push(payload);
            }
            Packet::Disconnect => {}
        }
        // Any packet can end the window once no brackets are open. An
        // isolated data packet at depth zero is a one-packet transmission
        // and completes on the spot.
        if self.depth == 0 {
            self.complete = true;
        }
    }

    fn push_group(&mut self, label: Value) {
        if !self.groups.contains(&label) {
            self.groups.push(label);
        }
    }

    /// Consumes the window into its consolidated result.
    pub fn into_transmission(self) -> Transmission {
        let data_count = self.data.len();
        let group_count = self.groups.len();
        let mut collected = self.data;
        let data = if collected.len() == 1 {
            collected.remove(0)
        } else {
            Value::Array(collected)
        };
        Transmission {
            data,
            groups: self.groups,
            data_count,
            group_count,
        }
    }
}

impl Default for Aggregation {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one aggregation window over a port subscription.
///
/// Resolves once the window completes, after detaching the listener. A
/// stream that ends without completing (the emitter went away, or a newer
/// subscription replaced this one) never resolves; bounding the wait is
/// the caller's responsibility.
pub async fn collect(mut sub: Subscription) -> Transmission {
    let mut window = Aggregation::new();
    loop {
        let Some(event) = sub.next().await else {
            debug!("{}: event stream ended mid-window", sub.port_name());
            return std::future::pending().await;
        };
        trace!("{}: observed {} event", sub.port_name(), event.kind());
        if window.observe(event) {
            break;
        }
    }
    sub.cancel();
    debug!(
        "{}: window complete ({} data, {} groups)",
        sub.port_name(),
        window.data.len(),
        window.groups.len()
    );
    window.into_transmission()
}
