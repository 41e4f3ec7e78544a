//! Change events and listeners
//!
//! Listeners run synchronously on the mutating call's thread, after the
//! mutation and all index notifications are committed. The first failing
//! listener stops delivery; the store reports it as `ListenerFailed`.

use relstore_core::{Error, Result, RowId};
use std::fmt;

/// Handle returned by [`Store::add_listener`](crate::Store::add_listener)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A committed change to the store's id set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A batch insert committed these ids
    ObjectsInserted(Vec<RowId>),
    /// A single-row insert committed this id
    ObjectInserted(RowId),
    /// A bulk delete removed these ids
    ObjectsRemoved(Vec<RowId>),
    /// A single-id delete removed this id
    ObjectRemoved(RowId),
}

impl StoreEvent {
    /// Ids carried by the event
    pub fn ids(&self) -> &[RowId] {
        match self {
            StoreEvent::ObjectsInserted(ids) | StoreEvent::ObjectsRemoved(ids) => ids,
            StoreEvent::ObjectInserted(id) | StoreEvent::ObjectRemoved(id) => {
                std::slice::from_ref(id)
            }
        }
    }

    /// True for insert events
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            StoreEvent::ObjectsInserted(_) | StoreEvent::ObjectInserted(_)
        )
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            StoreEvent::ObjectsInserted(_) => "objects-inserted",
            StoreEvent::ObjectInserted(_) => "object-inserted",
            StoreEvent::ObjectsRemoved(_) => "objects-removed",
            StoreEvent::ObjectRemoved(_) => "object-removed",
        };
        write!(f, "{}({})", kind, self.ids().len())
    }
}

/// Receives store change events
pub trait StoreListener: Send + Sync {
    /// Handle one event. An error stops delivery to later listeners.
    fn on_event(&mut self, event: &StoreEvent) -> Result<()>;
}

impl<F> StoreListener for F
where
    F: FnMut(&StoreEvent) -> Result<()> + Send + Sync,
{
    fn on_event(&mut self, event: &StoreEvent) -> Result<()> {
        self(event)
    }
}

/// Ordered listener list owned by the store
#[derive(Default)]
pub(crate) struct ListenerList {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn StoreListener>)>,
}

impl ListenerList {
    pub(crate) fn add(&mut self, listener: Box<dyn StoreListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deliver in registration order, stopping at the first failure
    pub(crate) fn fire(&mut self, event: &StoreEvent) -> Result<()> {
        for (id, listener) in self.entries.iter_mut() {
            listener.on_event(event).map_err(|e| match e {
                Error::ListenerFailed(msg) => Error::ListenerFailed(msg),
                other => Error::ListenerFailed(format!("listener {}: {}", id.0, other)),
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ListenerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("listeners", &self.entries.len())
            .finish()
    }
}
