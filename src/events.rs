//! Registry lifecycle events.
//!
//! A small pub/sub bus over std mpsc channels. The registry publishes an
//! event for every observable state change, which is how callers learn that
//! a deployment reached its terminal state without polling `get`.

use crate::deployment::DeploymentStatus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Observable registry state changes.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A model was registered.
    ModelRegistered {
        identity: String,
        name: String,
        version: String,
    },
    /// A deployment was created and is in the `deploying` state.
    DeploymentStarted {
        deployment_id: String,
        model_identity: String,
    },
    /// A deployment reached a terminal state, either through the scheduled
    /// completion or an external `resolve_deployment` signal.
    DeploymentCompleted {
        deployment_id: String,
        model_identity: String,
        status: DeploymentStatus,
    },
    /// Tags were merged into a model record.
    TagsUpdated { identity: String },
}

/// Handle for one subscription; dropping it detaches the subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: usize,
    receiver: Receiver<RegistryEvent>,
}

impl Subscription {
    /// Receive the next event without blocking.
    pub fn try_recv(&self) -> Result<RegistryEvent, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive the next event, blocking until one arrives or the bus drops.
    pub fn recv(&self) -> Result<RegistryEvent, mpsc::RecvError> {
        self.receiver.recv()
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

/// Publish-subscribe bus for [`RegistryEvent`]s.
pub struct EventBus {
    subscribers: Mutex<HashMap<usize, Sender<RegistryEvent>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Publish an event to every live subscriber. Subscribers whose
    /// receiver was dropped are pruned on the way through.
    pub fn publish(&self, event: RegistryEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|_, sender| sender.send(event.clone()).is_ok());
    }

    /// Subscribe to all registry events.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().unwrap().insert(id, sender);
        Subscription { id, receiver }
    }

    /// Detach a subscriber by ID.
    pub fn unsubscribe(&self, subscription_id: usize) {
        self.subscribers.lock().unwrap().remove(&subscription_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
