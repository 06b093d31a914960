//! Scoped event subscriptions
//!
//! A layer subscribes to a set of [`ViewEventKind`]s and receives a
//! [`Subscription`] handle. The subscription stays registered exactly as long
//! as the handle is alive; dropping it removes every kind at once.

use crate::input::events::ViewEventKind;
use crate::prelude::{HashMap, RefCell, Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    subscriptions: HashMap<SubscriptionId, Vec<ViewEventKind>>,
}

/// Registry of live subscriptions, owned by the host
#[derive(Debug, Default)]
pub struct EventHub {
    state: Rc<RefCell<HubState>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kinds` under a fresh subscription
    pub fn subscribe(&self, kinds: &[ViewEventKind]) -> Subscription {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();

        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        log::debug!("{} installed for {:?}", id, kinds);
        state.subscriptions.insert(id, kinds);

        Subscription {
            id,
            hub: Rc::downgrade(&self.state),
        }
    }

    /// Subscriptions interested in `kind`, in subscription order
    pub fn listeners(&self, kind: ViewEventKind) -> Vec<SubscriptionId> {
        let state = self.state.borrow();
        let mut ids: Vec<SubscriptionId> = state
            .subscriptions
            .iter()
            .filter(|(_, kinds)| kinds.contains(&kind))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn listener_count(&self, kind: ViewEventKind) -> usize {
        self.state
            .borrow()
            .subscriptions
            .values()
            .filter(|kinds| kinds.contains(&kind))
            .count()
    }

    /// Number of live subscription handles
    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }
}

/// Handle for a set of event kinds; unsubscribes when dropped
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    hub: Weak<RefCell<HubState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            state.borrow_mut().subscriptions.remove(&self.id);
            log::debug!("{} released", self.id);
        }
    }
}
