//! Typed change notification for profile setters.
//!
//! There is one channel per value domain. Handlers run synchronously on the
//! caller's thread, in registration order. A panicking handler is logged and
//! skipped; the remaining handlers still receive the event.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::domain::{Domain, DomainValue};

/// A setter's change, tagged by domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    StringChanged { key: String, value: String },
    IntChanged { key: String, value: i64 },
    BooleanChanged { key: String, value: bool },
    FloatChanged { key: String, value: f64 },
}

impl ChangeEvent {
    /// Channel this event is delivered on.
    pub fn domain(&self) -> Domain {
        match self {
            ChangeEvent::StringChanged { .. } => Domain::Text,
            ChangeEvent::IntChanged { .. } => Domain::Integer,
            ChangeEvent::BooleanChanged { .. } => Domain::Boolean,
            ChangeEvent::FloatChanged { .. } => Domain::Float,
        }
    }

    /// Key that changed.
    pub fn key(&self) -> &str {
        match self {
            ChangeEvent::StringChanged { key, .. }
            | ChangeEvent::IntChanged { key, .. }
            | ChangeEvent::BooleanChanged { key, .. }
            | ChangeEvent::FloatChanged { key, .. } => key,
        }
    }

    /// Event kind name, e.g. `"int-changed"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChangeEvent::StringChanged { .. } => "string-changed",
            ChangeEvent::IntChanged { .. } => "int-changed",
            ChangeEvent::BooleanChanged { .. } => "boolean-changed",
            ChangeEvent::FloatChanged { .. } => "float-changed",
        }
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Boxed event handler.
pub type ChangeHandler = Box<dyn Fn(&ChangeEvent) + Send>;

/// Per-domain lists of subscribed handlers.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    channels: [Vec<(SubscriptionId, ChangeHandler)>; 4],
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.len())
            .finish_non_exhaustive()
    }
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on the channel for `domain`.
    pub fn subscribe<F>(&mut self, domain: Domain, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.channels[domain.index()].push((id, Box::new(handler)));
        id
    }

    /// Register a handler that receives the key and typed value of changes
    /// in `T`'s domain.
    pub fn subscribe_typed<T, F>(&mut self, handler: F) -> SubscriptionId
    where
        T: DomainValue,
        F: Fn(&str, &T) + Send + 'static,
    {
        self.subscribe(T::DOMAIN, move |event| {
            if let Some((key, value)) = T::from_event(event) {
                handler(key, value);
            }
        })
    }

    /// Remove a handler. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for channel in &mut self.channels {
            if let Some(pos) = channel.iter().position(|(sid, _)| *sid == id) {
                channel.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every handler on its channel.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let mut delivered = 0;
        for (id, handler) in &self.channels[event.domain().index()] {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(_) => log::warn!(
                    "{} handler {:?} panicked for key '{}'",
                    event.kind_name(),
                    id,
                    event.key()
                ),
            }
        }
        delivered
    }

    /// Number of handlers subscribed on `domain`.
    pub fn subscriber_count(&self, domain: Domain) -> usize {
        self.channels[domain.index()].len()
    }

    /// Total number of handlers across all channels.
    pub fn len(&self) -> usize {
        self.channels.iter().map(Vec::len).sum()
    }

    /// Whether no handlers are subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
