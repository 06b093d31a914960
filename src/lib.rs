//! # vector-renderer
//!
//! Viewport tracking and transform coordination for vector layers drawn on a
//! pannable, zoomable map, in the style of Leaflet's `Renderer`.
//!
//! A [`VectorRenderer`] owns no drawing primitives. It keeps a padded pixel
//! clip box (and its geographic top-left corner) in sync with the host view,
//! moves and scales its surface container during zoom, and tells registered
//! [`Drawable`]s when to reproject or redraw. The host view is reached through
//! the [`MapView`] trait; [`Viewport`] and [`Map`] are a Web Mercator reference
//! host that fires events in Leaflet's order.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{RendererOptions, RendererProfile, SurfaceCapabilities},
    geo::{LatLng, Point},
    map::{Map, MapOptions},
    viewport::Viewport,
};

pub use input::{EventHub, Subscription, SubscriptionId, ViewEvent, ViewEventKind};

pub use layers::{
    manager::LayerManager,
    renderer::{
        DrawableId, Notification, RenderFrame, RendererLifecycle, TransformStrategy,
        VectorRenderer, ViewportState,
    },
};

pub use traits::{Configurable, Drawable, LayerOperations, MapView};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, RendererError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// A lifecycle contract was violated, e.g. a transform applied while detached
    #[error("invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: RendererLifecycle,
    },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A drawable was already borrowed when the renderer tried to notify it
    #[error("{0} is already borrowed; notifications cannot re-enter a drawable")]
    ReentrantDispatch(DrawableId),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = RendererError;
