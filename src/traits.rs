//! Shared trait abstractions
//!
//! These are the seams between the renderer and its collaborators: the host
//! view that owns projection math, the drawables that own geometry, and the
//! layer manager that composes layers.

use crate::{
    core::geo::{LatLng, Point},
    input::{EventHub, SubscriptionId, ViewEvent, ViewEventKind},
    layers::renderer::RenderFrame,
    Result,
};

/// Host view state and coordinate conversions consumed by renderers.
///
/// Conversions are fallible so that a host can reject coordinates it cannot
/// project; renderers propagate those errors to whoever fired the event.
pub trait MapView {
    /// Container size in pixels
    fn size(&self) -> Point;

    fn center(&self) -> LatLng;

    fn zoom(&self) -> f64;

    /// Whether the host delivers animated zoom frames
    fn zoom_animated(&self) -> bool {
        true
    }

    /// Container pixels to layer-local pixels
    fn container_point_to_layer_point(&self, point: Point) -> Result<Point>;

    /// Layer-local pixels to a geographic coordinate
    fn layer_point_to_lat_lng(&self, point: Point) -> Result<LatLng>;

    /// Geographic coordinate to layer-local pixels at the current zoom
    fn lat_lng_to_layer_point(&self, lat_lng: LatLng) -> Result<Point>;

    /// Scale ratio between two zoom levels
    fn zoom_scale(&self, to_zoom: f64, from_zoom: f64) -> f64;

    /// Layer point of `lat_lng` in the frame the view would have at `zoom`
    /// centered on `center`
    fn lat_lng_to_new_layer_point(&self, lat_lng: LatLng, zoom: f64, center: LatLng)
        -> Result<Point>;
}

/// A shape registered with a renderer for lifecycle notifications.
pub trait Drawable {
    /// Drop cached projections and reproject from source coordinates, then redraw
    fn on_reset(&mut self, frame: &RenderFrame<'_>) -> Result<()>;

    /// Reproject after a discrete zoom change
    fn on_zoom_end(&mut self, frame: &RenderFrame<'_>) -> Result<()>;

    /// Redraw from already-projected coordinates (clip to the new bounds, etc.)
    fn on_update(&mut self, frame: &RenderFrame<'_>) -> Result<()>;
}

/// Capability interface composed by the layer manager
pub trait LayerOperations {
    /// Get layer ID
    fn id(&self) -> &str;

    /// View events this layer wants while attached
    fn events(&self, view: &dyn MapView) -> Vec<ViewEventKind>;

    /// Layer lifecycle events
    fn on_add(&mut self, view: &dyn MapView, hub: &EventHub) -> Result<()>;

    fn on_remove(&mut self) -> Result<()>;

    fn handle_event(&mut self, event: &ViewEvent, view: &dyn MapView) -> Result<()>;

    /// Subscription held while attached
    fn subscription_id(&self) -> Option<SubscriptionId>;

    /// Dynamic casting support
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Trait for configurable components
pub trait Configurable {
    type Config: Clone;

    /// Get the current configuration
    fn config(&self) -> &Self::Config;

    /// Set new configuration
    fn set_config(&mut self, config: Self::Config) -> Result<()>;

    /// Validate configuration
    fn validate_config(config: &Self::Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Update configuration with a partial change
    fn update_config<F>(&mut self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config().clone();
        updater(&mut config);
        Self::validate_config(&config)?;
        self.set_config(config)
    }
}

/// Linear interpolation, used by hosts to produce intermediate zoom frames
pub trait Lerp {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }
}

impl Lerp for LatLng {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        LatLng::new(self.lat.lerp(&other.lat, t), self.lng.lerp(&other.lng, t))
    }
}
