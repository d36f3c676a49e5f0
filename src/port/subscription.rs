use crate::packet::PortEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// The listener currently attached to an output port, if any.
#[derive(Debug)]
pub(crate) struct Listener {
    pub(crate) id: u64,
    pub(crate) tx: UnboundedSender<PortEvent>,
}

pub(crate) type ListenerSlot = Arc<Mutex<Option<Listener>>>;

pub(crate) fn lock_slot(slot: &ListenerSlot) -> MutexGuard<'_, Option<Listener>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to one live listener on an output port.
///
/// Created by [`OutputPort::subscribe`](crate::port::OutputPort::subscribe),
/// which replaces whatever listener was attached before. A replaced
/// subscription keeps its handle but its event channel closes and it never
/// receives another event. Call [`cancel`](Subscription::cancel) to detach
/// explicitly; dropping the handle alone does not detach it.
#[derive(Debug)]
pub struct Subscription {
    name: String,
    id: u64,
    rx: UnboundedReceiver<PortEvent>,
    slot: ListenerSlot,
}

impl Subscription {
    pub(crate) fn attach(name: String, slot: ListenerSlot) -> Self {
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut listener = lock_slot(&slot);
            if listener.is_some() {
                debug!("{}: replacing pending listener, old window orphaned", name);
            }
            *listener = Some(Listener { id, tx });
        }
        debug!("{}: listener attached", name);
        Self { name, id, rx, slot }
    }

    /// Waits for the next event on this port.
    ///
    /// Returns `None` once the subscription has been replaced by a newer one
    /// and no emitter holds the channel open anymore.
    pub async fn next(&mut self) -> Option<PortEvent> {
        self.rx.recv().await
    }

    /// Detaches this listener from the port.
    ///
    /// A subscription that was already replaced by a newer one leaves the
    /// newer listener in place.
    pub fn cancel(&self) {
        let mut listener = lock_slot(&self.slot);
        if listener.as_ref().is_some_and(|l| l.id == self.id) {
            *listener = None;
            debug!("{}: listener detached", self.name);
        }
    }

    /// Name of the subscribed port
    pub fn port_name(&self) -> &str {
        &self.name
    }
}
