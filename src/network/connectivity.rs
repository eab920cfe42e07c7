//! Host-owned online/offline flag.
//!
//! The current value lives in a `watch` channel for cheap `is_online()` reads.
//! Transitions are also fanned out to every `Transitions` subscriber over an
//! unbounded channel, so a consumer that falls behind still sees each
//! offline/online edge in order.

use std::sync::Mutex;

use tokio::sync::{mpsc, watch};

/// Write side of the connectivity flag. Held by whatever observes the host
/// network (the probe in the CLI, the embedder otherwise).
#[derive(Debug)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<bool>>>,
}

impl Connectivity {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self {
            tx,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Publish the current state. Returns true if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        let mut subscribers = self.subscribers.lock().expect("connectivity mutex poisoned");

        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            subscribers.retain(|tx| tx.send(online).is_ok());
        }
        changed
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Read-only handle for consumers that only need the current value.
    pub fn watch(&self) -> ConnectivityWatch {
        ConnectivityWatch {
            rx: self.tx.subscribe(),
        }
    }

    /// Subscribe to every transition from now on.
    ///
    /// The returned stream starts at the state read under the same lock, so
    /// no transition falls between the initial read and the first event.
    pub fn transitions(&self) -> Transitions {
        let mut subscribers = self.subscribers.lock().expect("connectivity mutex poisoned");
        let (tx, rx) = mpsc::unbounded_channel();
        subscribers.push(tx);

        Transitions {
            initial: *self.tx.borrow(),
            rx,
        }
    }
}

/// Read side of the connectivity flag.
#[derive(Debug, Clone)]
pub struct ConnectivityWatch {
    rx: watch::Receiver<bool>,
}

impl ConnectivityWatch {
    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Ordered stream of connectivity transitions.
#[derive(Debug)]
pub struct Transitions {
    initial: bool,
    rx: mpsc::UnboundedReceiver<bool>,
}

impl Transitions {
    /// State at the moment of subscribing.
    pub fn initial(&self) -> bool {
        self.initial
    }

    /// Next transition, or `None` once the host side is dropped.
    pub async fn next(&mut self) -> Option<bool> {
        self.rx.recv().await
    }
}
