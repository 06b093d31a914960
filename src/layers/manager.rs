use crate::{
    input::{EventHub, ViewEvent},
    layers::LayerTrait,
    prelude::HashMap,
    traits::MapView,
    Result,
};

/// Manages layers for the map, handling ordering and event routing
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Layer IDs in insertion order
    order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            order: Vec::new(),
        }
    }

    /// Adds a layer and attaches it to the view. A layer with the same ID is
    /// removed first.
    pub fn add_layer(
        &mut self,
        mut layer: Box<dyn LayerTrait>,
        view: &dyn MapView,
        hub: &EventHub,
    ) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            log::debug!("replacing layer '{}'", layer_id);
            self.remove_layer(&layer_id)?;
        }

        layer.on_add(view, hub)?;
        self.layers.insert(layer_id.clone(), layer);
        self.order.push(layer_id);
        Ok(())
    }

    /// Detaches and removes a layer
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        self.order.retain(|id| id != layer_id);
        match self.layers.remove(layer_id) {
            Some(mut layer) => {
                layer.on_remove()?;
                Ok(Some(layer))
            }
            None => Ok(None),
        }
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Lists all layer IDs in insertion order
    pub fn list_layers(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Routes `event` to every layer whose subscription covers it, in
    /// insertion order. Stops at the first layer error.
    pub fn dispatch(&mut self, event: &ViewEvent, hub: &EventHub, view: &dyn MapView) -> Result<usize> {
        let listeners = hub.listeners(event.kind());
        if listeners.is_empty() {
            return Ok(0);
        }

        let mut delivered = 0;
        for id in &self.order {
            let Some(layer) = self.layers.get_mut(id) else {
                continue;
            };
            let subscribed = layer
                .subscription_id()
                .map(|subscription| listeners.contains(&subscription))
                .unwrap_or(false);
            if subscribed {
                layer.handle_event(event, view)?;
                delivered += 1;
            }
        }

        log::trace!("{} delivered to {} layers", event.kind(), delivered);
        Ok(delivered)
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        config::RendererOptions,
        geo::{LatLng, Point},
        viewport::Viewport,
    };
    use crate::layers::renderer::VectorRenderer;

    fn view() -> Viewport {
        Viewport::new(LatLng::new(51.5, -0.12), 9.0, Point::new(640.0, 480.0))
    }

    fn renderer(id: &str) -> Box<dyn LayerTrait> {
        Box::new(VectorRenderer::new(id, RendererOptions::default()).unwrap())
    }

    #[test]
    fn test_add_and_remove() {
        let view = view();
        let hub = EventHub::new();
        let mut manager = LayerManager::new();

        manager.add_layer(renderer("a"), &view, &hub).unwrap();
        manager.add_layer(renderer("b"), &view, &hub).unwrap();
        assert_eq!(manager.list_layers(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(hub.subscription_count(), 2);

        let removed = manager.remove_layer("a").unwrap().unwrap();
        assert!(removed.subscription_id().is_none());
        assert_eq!(hub.subscription_count(), 1);
        assert!(manager.remove_layer("a").unwrap().is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_replacing_layer_releases_old_subscription() {
        let view = view();
        let hub = EventHub::new();
        let mut manager = LayerManager::new();

        manager.add_layer(renderer("a"), &view, &hub).unwrap();
        manager.add_layer(renderer("a"), &view, &hub).unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.list_layers().len(), 1);
        assert_eq!(hub.subscription_count(), 1);
    }

    #[test]
    fn test_dispatch_only_reaches_subscribers() {
        let view = view();
        let hub = EventHub::new();
        let mut manager = LayerManager::new();
        manager.add_layer(renderer("a"), &view, &hub).unwrap();

        assert_eq!(manager.dispatch(&ViewEvent::MoveEnd, &hub, &view).unwrap(), 1);
        assert_eq!(manager.dispatch(&ViewEvent::ZoomStart, &hub, &view).unwrap(), 0);

        manager
            .with_layer_mut("a", |layer| layer.on_remove())
            .unwrap()
            .unwrap();
        assert_eq!(manager.dispatch(&ViewEvent::MoveEnd, &hub, &view).unwrap(), 0);
    }

    #[test]
    fn test_downcast_through_as_any() {
        let view = view();
        let hub = EventHub::new();
        let mut manager = LayerManager::new();
        manager.add_layer(renderer("a"), &view, &hub).unwrap();

        let layer = manager.get_layer("a").unwrap();
        let renderer = layer.as_any().downcast_ref::<VectorRenderer>().unwrap();
        assert!(renderer.is_attached());
    }
}
