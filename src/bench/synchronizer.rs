use crate::bench::aggregator::{collect, Transmission};
use crate::bench::errors::{BenchError, Result};
use crate::port::{PortRegistry, Subscription};
use futures::future::join_all;

/// Callback invoked when one port's window completes, with the shaped
/// result: data, distinct groups, data count and group count.
pub type CompletionCallback = Box<dyn FnOnce(&Transmission) + Send>;

/// One aggregation window, subscribed but not yet driven.
///
/// The listener is already attached when this handle exists, so packets
/// delivered before [`wait`](PendingTransmission::wait) is polled are
/// buffered and not lost.
pub struct PendingTransmission {
    sub: Subscription,
    callback: Option<CompletionCallback>,
}

impl std::fmt::Debug for PendingTransmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransmission")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl PendingTransmission {
    /// Resolves once the window completes.
    ///
    /// The completion callback, if any, fires before this returns. There is
    /// no timeout: a port that never completes holds its listener
    /// indefinitely, and bounding the wait is the caller's job.
    pub async fn wait(self) -> Transmission {
        let transmission = collect(self.sub).await;
        if let Some(callback) = self.callback {
            callback(&transmission);
        }
        transmission
    }
}

/// Fan-in join over several pending windows.
pub struct PendingJoin {
    pending: Vec<PendingTransmission>,
}

impl std::fmt::Debug for PendingJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingJoin")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl PendingJoin {
    /// Resolves only once every listed port's window has completed.
    ///
    /// Results are ordered by listing order regardless of completion order.
    /// Per-port callbacks fire in the order their own windows complete; no
    /// ordering holds across different ports.
    pub async fn wait(self) -> Vec<Transmission> {
        join_all(self.pending.into_iter().map(PendingTransmission::wait)).await
    }
}

/// One entry of a fan-in receive: a port name plus an optional completion
/// callback.
pub struct ReceiveSpec {
    pub port: String,
    pub callback: Option<CompletionCallback>,
}

impl ReceiveSpec {
    /// Await a port without a callback
    pub fn port(name: impl Into<String>) -> Self {
        Self {
            port: name.into(),
            callback: None,
        }
    }

    /// Await a port, invoking the callback on completion
    pub fn with_callback(
        name: impl Into<String>,
        callback: impl FnOnce(&Transmission) + Send + 'static,
    ) -> Self {
        Self {
            port: name.into(),
            callback: Some(Box::new(callback)),
        }
    }
}

/// Opens aggregation windows on exposed output ports and joins them.
pub struct Synchronizer<'a> {
    registry: &'a PortRegistry,
}

impl<'a> Synchronizer<'a> {
    pub fn new(registry: &'a PortRegistry) -> Self {
        Self { registry }
    }

    /// Opens one window on `port`.
    ///
    /// Fails synchronously if the name is not an exposed outport, with no
    /// listener attached. On success the listener is installed before this
    /// returns, replacing (and orphaning) any window still pending on the
    /// same port.
    pub fn receive(&self, port: &str) -> Result<PendingTransmission> {
        self.open_window(port, None)
    }

    /// Opens one window on `port`, invoking `callback` on completion.
    pub fn receive_with(
        &self,
        port: &str,
        callback: impl FnOnce(&Transmission) + Send + 'static,
    ) -> Result<PendingTransmission> {
        self.open_window(port, Some(Box::new(callback)))
    }

    /// Opens one window per listed entry and joins them.
    ///
    /// Every name is validated before any listener is attached, so an
    /// unknown port in the middle of the list leaves no subscription
    /// behind.
    pub fn receive_all(&self, specs: Vec<ReceiveSpec>) -> Result<PendingJoin> {
        for spec in &specs {
            if self.registry.output(&spec.port).is_none() {
                return Err(BenchError::UnknownOutport(spec.port.clone()));
            }
        }
        let mut pending = Vec::with_capacity(specs.len());
        for spec in specs {
            pending.push(self.open_window(&spec.port, spec.callback)?);
        }
        Ok(PendingJoin { pending })
    }

    fn open_window(
        &self,
        port: &str,
        callback: Option<CompletionCallback>,
    ) -> Result<PendingTransmission> {
        let out = self
            .registry
            .output(port)
            .ok_or_else(|| BenchError::UnknownOutport(port.to_string()))?;
        Ok(PendingTransmission {
            sub: out.subscribe(),
            callback,
        })
    }
}
