/// A change to a collection, carrying the affected element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    /// An element was added.
    Added(T),
    /// An element was removed.
    Removed(T),
}

impl<T> ChangeEvent<T> {
    pub fn element(&self) -> &T {
        match self {
            ChangeEvent::Added(e) | ChangeEvent::Removed(e) => e,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, ChangeEvent::Added(_))
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, ChangeEvent::Removed(_))
    }
}

/// Receives change notifications.
///
/// Any `FnMut(&ChangeEvent<T>) + Send` closure is a listener.
pub trait Listener<T>: Send {
    fn on_change(&mut self, event: &ChangeEvent<T>);
}

impl<T, F> Listener<T> for F
where
    F: FnMut(&ChangeEvent<T>) + Send,
{
    fn on_change(&mut self, event: &ChangeEvent<T>) {
        self(event)
    }
}

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Registry of listeners, notified synchronously in subscription order.
///
/// Ids are never reused, so a stale id can't unsubscribe a newer listener.
pub struct Listeners<T> {
    entries: Vec<(ListenerId, Box<dyn Listener<T>>)>,
    next_id: u64,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, listener: impl Listener<T> + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &ChangeEvent<T>) {
        for (_, listener) in &mut self.entries {
            listener.on_change(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
