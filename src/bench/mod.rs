pub mod aggregator;
pub mod dispatcher;
pub mod errors;
pub mod synchronizer;

pub use aggregator::{Aggregation, Transmission, WindowMode};
pub use dispatcher::{Dispatcher, Outgoing};
pub use errors::{BenchError, Result};
pub use synchronizer::{PendingJoin, PendingTransmission, ReceiveSpec, Synchronizer};

use crate::port::PortRegistry;

/// Test bench over one exposed port set.
///
/// Owns the registry built at setup time and hands it by reference to the
/// dispatcher and synchronizer, so there is no shared mutable port state
/// between test cases beyond what the registry itself holds.
pub struct Bench {
    registry: PortRegistry,
}

impl Bench {
    pub fn new(registry: PortRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PortRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry)
    }

    pub fn synchronizer(&self) -> Synchronizer<'_> {
        Synchronizer::new(&self.registry)
    }

    /// Sends one value to one inport. See [`Dispatcher::send`].
    pub fn send(&self, port: &str, value: impl Into<Outgoing>) -> Result<()> {
        self.dispatcher().send(port, value)
    }

    /// Sends one value to each named inport. See [`Dispatcher::send_map`].
    pub fn send_map<S, V>(&self, entries: Vec<(S, V)>) -> Result<()>
    where
        S: AsRef<str>,
        V: Into<Outgoing>,
    {
        self.dispatcher().send_map(entries)
    }

    /// Opens one aggregation window on an outport. See
    /// [`Synchronizer::receive`].
    pub fn receive(&self, port: &str) -> Result<PendingTransmission> {
        self.synchronizer().receive(port)
    }

    /// Opens one window with a completion callback. See
    /// [`Synchronizer::receive_with`].
    pub fn receive_with(
        &self,
        port: &str,
        callback: impl FnOnce(&Transmission) + Send + 'static,
    ) -> Result<PendingTransmission> {
        self.synchronizer().receive_with(port, callback)
    }

    /// Opens one window per listed entry and joins them. See
    /// [`Synchronizer::receive_all`].
    pub fn receive_all(&self, specs: Vec<ReceiveSpec>) -> Result<PendingJoin> {
        self.synchronizer().receive_all(specs)
    }
}
