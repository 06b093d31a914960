pub mod events;
pub mod hub;

// Re-export the essential types
pub use events::{ViewEvent, ViewEventKind};
pub use hub::{EventHub, Subscription, SubscriptionId};
