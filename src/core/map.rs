use crate::{
    core::{
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::{EventHub, ViewEvent},
    layers::{manager::LayerManager, LayerTrait},
    traits::Lerp,
    Error, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Deliver animated zoom frames to layers that ask for them
    pub zoom_animation: bool,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            zoom_animation: true,
            min_zoom: None,
            max_zoom: None,
        }
    }
}

/// Reference host: owns the viewport, the event hub and the layers, and fires
/// view events in the order layers expect.
pub struct Map {
    viewport: Viewport,
    hub: EventHub,
    layer_manager: LayerManager,
    options: MapOptions,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(viewport, MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            viewport,
            hub: EventHub::new(),
            layer_manager: LayerManager::new(),
            options,
        };

        map.viewport.set_zoom_animated(map.options.zoom_animation);
        if map.options.min_zoom.is_some() || map.options.max_zoom.is_some() {
            let min = map.options.min_zoom.unwrap_or(map.viewport.min_zoom);
            let max = map.options.max_zoom.unwrap_or(map.viewport.max_zoom);
            map.viewport.set_zoom_limits(min, max);
            let (center, zoom) = (map.viewport.center, map.viewport.zoom);
            map.viewport.reset_view(center, zoom);
        }

        map
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn set_zoom_animation_enabled(&mut self, enabled: bool) {
        self.options.zoom_animation = enabled;
        self.viewport.set_zoom_animated(enabled);
    }

    /// Adds a layer and attaches it to this map
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        self.layer_manager.add_layer(layer, &self.viewport, &self.hub)
    }

    /// Detaches and drops a layer; unknown IDs are ignored
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.layer_manager.remove_layer(layer_id)?;
        Ok(())
    }

    /// Detaches a layer and hands it back to the caller
    pub fn take_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        self.layer_manager.remove_layer(layer_id)
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    /// Typed access to a layer
    pub fn layer<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layer_manager
            .get_layer(layer_id)
            .and_then(|layer| layer.as_any().downcast_ref::<T>())
    }

    pub fn layer_mut<T: 'static, R>(&mut self, layer_id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.layer_manager
            .with_layer_mut(layer_id, |layer| layer.as_any_mut().downcast_mut::<T>().map(f))
            .flatten()
    }

    /// Delivers one event to every subscribed layer
    pub fn fire(&mut self, event: ViewEvent) -> Result<usize> {
        log::debug!("fire {}", event.kind());
        self.layer_manager.dispatch(&event, &self.hub, &self.viewport)
    }

    /// Hard view reset: zoomstart?, zoom?, move, zoomend?, moveend, viewreset
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        check_target(center, zoom)?;
        let zoom = self.viewport.limit_zoom(zoom);
        let zoom_changed = zoom != self.viewport.zoom;

        if zoom_changed {
            self.fire(ViewEvent::ZoomStart)?;
        }
        self.viewport.reset_view(center, zoom);
        if zoom_changed {
            self.fire(ViewEvent::Zoom)?;
        }
        self.fire(ViewEvent::Move)?;
        if zoom_changed {
            self.fire(ViewEvent::ZoomEnd)?;
        }
        self.fire(ViewEvent::MoveEnd)?;
        self.fire(ViewEvent::ViewReset)?;
        Ok(())
    }

    /// Pans by a container pixel offset without resetting the view
    pub fn pan_by(&mut self, offset: Point) -> Result<()> {
        if !offset.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "pan offset ({}, {}) is not finite",
                offset.x, offset.y
            )));
        }
        self.viewport.pan_by(offset);
        self.fire(ViewEvent::Move)?;
        self.fire(ViewEvent::MoveEnd)?;
        Ok(())
    }

    /// Animated zoom with `frames` intermediate keyframes. Falls back to
    /// [`Map::set_view`] when zoom animation is off or no frames are requested.
    pub fn animate_zoom_to(&mut self, center: LatLng, zoom: f64, frames: usize) -> Result<()> {
        check_target(center, zoom)?;
        if !self.options.zoom_animation || frames == 0 {
            return self.set_view(center, zoom);
        }

        let zoom = self.viewport.limit_zoom(zoom);
        let start_center = self.viewport.center;
        let start_zoom = self.viewport.zoom;

        self.fire(ViewEvent::ZoomStart)?;
        for frame in 1..=frames {
            let t = frame as f64 / frames as f64;
            self.fire(ViewEvent::ZoomAnim {
                center: start_center.lerp(&center, t),
                zoom: start_zoom.lerp(&zoom, t),
            })?;
        }

        self.viewport.move_to(center, zoom);
        self.fire(ViewEvent::Zoom)?;
        self.fire(ViewEvent::Move)?;
        self.fire(ViewEvent::ZoomEnd)?;
        self.fire(ViewEvent::MoveEnd)?;
        Ok(())
    }

    pub fn set_bearing(&mut self, bearing: f64) -> Result<()> {
        if !bearing.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "bearing {} is not finite",
                bearing
            )));
        }
        self.viewport.set_bearing(bearing);
        self.fire(ViewEvent::Rotate {
            bearing: self.viewport.bearing,
        })?;
        Ok(())
    }

    /// Resizes the container, keeping the center in place
    pub fn resize(&mut self, size: Point) -> Result<()> {
        if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
            return Err(Error::InvalidCoordinates(format!(
                "container size ({}, {}) is invalid",
                size.x, size.y
            )));
        }
        self.viewport.resize(size);
        self.fire(ViewEvent::Move)?;
        self.fire(ViewEvent::MoveEnd)?;
        Ok(())
    }
}

fn check_target(center: LatLng, zoom: f64) -> Result<()> {
    if !center.is_finite() || !zoom.is_finite() {
        return Err(Error::InvalidCoordinates(format!(
            "view target ({}, {}) at zoom {} is not finite",
            center.lat, center.lng, zoom
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RendererOptions;
    use crate::input::ViewEventKind;
    use crate::layers::renderer::VectorRenderer;

    fn map() -> Map {
        Map::new(LatLng::new(40.0, -74.0), 10.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_zoom_limits_from_options() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 12.0, Point::new(100.0, 100.0));
        let map = Map::with_options(
            viewport,
            MapOptions {
                min_zoom: Some(2.0),
                max_zoom: Some(8.0),
                ..MapOptions::default()
            },
        );
        assert_eq!(map.viewport().zoom, 8.0);
    }

    #[test]
    fn test_single_zoom_limit_from_options() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 12.0, Point::new(100.0, 100.0));
        let map = Map::with_options(
            viewport.clone(),
            MapOptions {
                max_zoom: Some(8.0),
                ..MapOptions::default()
            },
        );
        assert_eq!(map.viewport().zoom, 8.0);
        assert_eq!(map.viewport().min_zoom, 0.0);

        let map = Map::with_options(
            viewport,
            MapOptions {
                min_zoom: Some(14.0),
                ..MapOptions::default()
            },
        );
        assert_eq!(map.viewport().zoom, 14.0);
        assert_eq!(map.viewport().max_zoom, 18.0);
    }

    #[test]
    fn test_typed_layer_access() {
        let mut map = map();
        map.add_layer(Box::new(VectorRenderer::new("paths", RendererOptions::default()).unwrap()))
            .unwrap();

        assert!(map.layer::<VectorRenderer>("paths").unwrap().is_attached());
        let tolerance = map.layer_mut("paths", |renderer: &mut VectorRenderer| {
            renderer.tolerance()
        });
        assert_eq!(tolerance, Some(0.0));
        assert!(map.layer::<Map>("paths").is_none());
    }

    #[test]
    fn test_remove_layer_unsubscribes() {
        let mut map = map();
        map.add_layer(Box::new(VectorRenderer::new("paths", RendererOptions::default()).unwrap()))
            .unwrap();
        assert_eq!(map.hub().listener_count(ViewEventKind::ViewReset), 1);

        map.remove_layer("paths").unwrap();
        assert_eq!(map.hub().listener_count(ViewEventKind::ViewReset), 0);
        assert_eq!(map.fire(ViewEvent::ViewReset).unwrap(), 0);
    }

    #[test]
    fn test_rejects_non_finite_targets() {
        let mut map = map();
        assert!(map.set_view(LatLng::new(f64::NAN, 0.0), 3.0).is_err());
        assert!(map.animate_zoom_to(LatLng::new(0.0, 0.0), f64::INFINITY, 4).is_err());
        assert!(map.pan_by(Point::new(f64::NAN, 0.0)).is_err());
        assert!(map.resize(Point::new(-1.0, 10.0)).is_err());
        assert_eq!(map.viewport().zoom, 10.0);
    }

    #[test]
    fn test_set_bearing_normalizes() {
        let mut map = map();
        map.set_bearing(-90.0).unwrap();
        assert_eq!(map.viewport().bearing, 270.0);
    }
}
