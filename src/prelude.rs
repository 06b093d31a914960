//! Prelude module for common vector-renderer types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use vector_renderer::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{RendererOptions, RendererProfile, SurfaceCapabilities},
    geo::{LatLng, Point},
    map::{Map, MapOptions},
    viewport::Viewport,
};

pub use crate::input::{EventHub, Subscription, SubscriptionId, ViewEvent, ViewEventKind};

pub use crate::layers::{
    manager::LayerManager,
    renderer::{
        DrawableId, Notification, RenderFrame, RendererLifecycle, SurfaceContainer,
        SurfaceTransform, TransformStrategy, VectorRenderer, ViewportState,
    },
    LayerTrait,
};

pub use crate::traits::{Configurable, Drawable, LayerOperations, Lerp, MapView};

pub use crate::{Error as RendererError, Result};

pub use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

pub use fxhash::FxHashMap as HashMap;
