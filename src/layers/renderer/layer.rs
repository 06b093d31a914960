use crate::core::{
    bounds::Bounds,
    config::{RendererOptions, SurfaceCapabilities},
    geo::LatLng,
};
use crate::input::{EventHub, Subscription, SubscriptionId, ViewEvent, ViewEventKind};
use crate::layers::renderer::{
    registry::{ChildRegistry, DrawableId, Notification, RenderFrame},
    transform::{SurfaceContainer, TransformStrategy},
    viewport_state::ViewportState,
};
use crate::prelude::{RefCell, Rc};
use crate::traits::{Configurable, Drawable, LayerOperations, MapView};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a renderer is in its attach/detach cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererLifecycle {
    Detached,
    Attaching,
    Attached,
    Detaching,
}

impl std::fmt::Display for RendererLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererLifecycle::Detached => write!(f, "detached"),
            RendererLifecycle::Attaching => write!(f, "attaching"),
            RendererLifecycle::Attached => write!(f, "attached"),
            RendererLifecycle::Detaching => write!(f, "detaching"),
        }
    }
}

/// Base vector renderer: tracks a padded clip box around the view, keeps its
/// surface container transformed to follow pans and zooms, and tells its
/// drawables when to reproject or redraw.
///
/// Concrete backends own the pixels; this type only decides where they go.
#[derive(Debug)]
pub struct VectorRenderer {
    id: String,
    options: RendererOptions,
    strategy: TransformStrategy,
    lifecycle: RendererLifecycle,
    viewport: Option<ViewportState>,
    container: Option<SurfaceContainer>,
    subscription: Option<Subscription>,
    children: ChildRegistry,
}

impl VectorRenderer {
    /// Creates a renderer for a surface that supports combined transforms
    pub fn new(id: impl Into<String>, options: RendererOptions) -> Result<Self> {
        Self::with_capabilities(id, options, SurfaceCapabilities::default())
    }

    /// Fails with `InvalidOptions` if `options` do not validate
    pub fn with_capabilities(
        id: impl Into<String>,
        options: RendererOptions,
        capabilities: SurfaceCapabilities,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            id: id.into(),
            options,
            strategy: TransformStrategy::for_capabilities(&capabilities),
            lifecycle: RendererLifecycle::Detached,
            viewport: None,
            container: None,
            subscription: None,
            children: ChildRegistry::new(),
        })
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn strategy(&self) -> TransformStrategy {
        self.strategy
    }

    pub fn lifecycle(&self) -> RendererLifecycle {
        self.lifecycle
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle == RendererLifecycle::Attached
    }

    /// Last captured clip state; `None` while detached
    pub fn viewport_state(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.viewport.map(|state| state.bounds())
    }

    pub fn top_left(&self) -> Option<LatLng> {
        self.viewport.map(|state| state.top_left())
    }

    pub fn tolerance(&self) -> f64 {
        self.options.tolerance
    }

    pub fn container(&self) -> Option<&SurfaceContainer> {
        self.container.as_ref()
    }

    /// View events the renderer reacts to while attached
    pub fn events(&self, view: &dyn MapView) -> Vec<ViewEventKind> {
        let mut kinds = vec![
            ViewEventKind::ViewReset,
            ViewEventKind::Zoom,
            ViewEventKind::MoveEnd,
            ViewEventKind::ZoomEnd,
            ViewEventKind::Rotate,
        ];
        if self.follows_zoom_animation(view) {
            kinds.push(ViewEventKind::ZoomAnim);
        }
        kinds
    }

    fn follows_zoom_animation(&self, view: &dyn MapView) -> bool {
        self.strategy.supports_zoom_animation() && view.zoom_animated()
    }

    /// Creates the container, captures the first clip state and subscribes to
    /// view events. Drawables are not notified by the first capture.
    pub fn on_attach_to_view(&mut self, view: &dyn MapView, hub: &EventHub) -> Result<()> {
        if self.lifecycle != RendererLifecycle::Detached {
            log::debug!("renderer '{}' already {}, attach ignored", self.id, self.lifecycle);
            return Ok(());
        }

        self.lifecycle = RendererLifecycle::Attaching;
        self.container = Some(SurfaceContainer::new(self.follows_zoom_animation(view)));

        let captured = self
            .recompute_viewport(view)
            .and_then(|state| self.apply_transform(state.center(), state.zoom(), view));
        if let Err(err) = captured {
            self.container = None;
            self.viewport = None;
            self.lifecycle = RendererLifecycle::Detached;
            return Err(err);
        }

        self.subscription = Some(hub.subscribe(&self.events(view)));
        self.lifecycle = RendererLifecycle::Attached;
        log::info!(
            "renderer '{}' attached with {} drawables",
            self.id,
            self.children.len()
        );
        Ok(())
    }

    /// Releases the subscription and drops the container and clip state.
    /// Registered drawables stay registered for the next attach.
    pub fn on_detach_from_view(&mut self) {
        if self.lifecycle != RendererLifecycle::Attached {
            log::debug!("renderer '{}' is {}, detach ignored", self.id, self.lifecycle);
            return;
        }

        self.lifecycle = RendererLifecycle::Detaching;
        self.subscription = None;
        self.container = None;
        self.viewport = None;
        self.lifecycle = RendererLifecycle::Detached;
        log::info!("renderer '{}' detached", self.id);
    }

    /// Reacts to one host view event
    pub fn handle_view_event(&mut self, event: &ViewEvent, view: &dyn MapView) -> Result<()> {
        if !self.is_attached() {
            return Err(Error::InvalidState {
                operation: "handle view events",
                state: self.lifecycle,
            });
        }

        match event {
            ViewEvent::ViewReset => {
                self.refresh(view)?;
                self.notify(Notification::Reset, view)?;
            }
            ViewEvent::Zoom => self.apply_transform(view.center(), view.zoom(), view)?,
            ViewEvent::ZoomAnim { center, zoom } => self.apply_transform(*center, *zoom, view)?,
            ViewEvent::MoveEnd | ViewEvent::Rotate { .. } => self.refresh(view)?,
            ViewEvent::ZoomEnd => {
                self.notify(Notification::ZoomEnd, view)?;
            }
            ViewEvent::ZoomStart | ViewEvent::Move => {}
        }
        Ok(())
    }

    /// Recaptures the clip state, realigns the container with it and sends
    /// UPDATE to the drawables
    fn refresh(&mut self, view: &dyn MapView) -> Result<()> {
        let state = self.recompute_viewport(view)?;
        self.apply_transform(state.center(), state.zoom(), view)?;
        self.notify(Notification::Update, view)?;
        Ok(())
    }

    /// Replaces the stored clip state with a fresh capture from `view`
    pub fn recompute_viewport(&mut self, view: &dyn MapView) -> Result<ViewportState> {
        self.require_live("recompute the viewport")?;
        let state = ViewportState::capture(view, self.options.padding)?;
        self.viewport = Some(state);
        Ok(state)
    }

    /// Moves and scales the container so its origin sits on the stored
    /// top-left at `zoom` around `center`
    pub fn apply_transform(&mut self, center: LatLng, zoom: f64, view: &dyn MapView) -> Result<()> {
        self.require_live("apply a transform")?;
        let (state, container) = match (self.viewport.as_ref(), self.container.as_mut()) {
            (Some(state), Some(container)) => (state, container),
            _ => {
                return Err(Error::InvalidState {
                    operation: "apply a transform without captured bounds",
                    state: self.lifecycle,
                })
            }
        };

        let scale = view.zoom_scale(zoom, state.zoom());
        let offset = view.lat_lng_to_new_layer_point(state.top_left(), zoom, center)?;
        self.strategy.apply(container, offset, scale);

        log::trace!(
            "renderer '{}' transform {}",
            self.id,
            container.transform()
        );
        Ok(())
    }

    /// Sends `kind` to every registered drawable
    pub fn notify(&mut self, kind: Notification, view: &dyn MapView) -> Result<usize> {
        let state = match self.viewport.as_ref() {
            Some(state) => state,
            None => {
                return Err(Error::InvalidState {
                    operation: "notify drawables",
                    state: self.lifecycle,
                })
            }
        };
        let frame = RenderFrame::new(state, self.options.tolerance, view);
        self.children.dispatch(kind, &frame)
    }

    fn require_live(&self, operation: &'static str) -> Result<()> {
        match self.lifecycle {
            RendererLifecycle::Attaching | RendererLifecycle::Attached => Ok(()),
            state => Err(Error::InvalidState { operation, state }),
        }
    }

    /// Registers a drawable under a fresh identifier
    pub fn register<D: Drawable + 'static>(&mut self, drawable: &Rc<RefCell<D>>) -> DrawableId {
        self.children.register(drawable)
    }

    /// Registers a drawable under `id`, replacing any previous entry
    pub fn attach<D: Drawable + 'static>(&mut self, id: DrawableId, drawable: &Rc<RefCell<D>>) {
        self.children.attach(id, drawable);
    }

    /// Removes a drawable; unknown identifiers are ignored
    pub fn detach(&mut self, id: DrawableId) {
        if !self.children.detach(id) {
            log::debug!("renderer '{}' has no {}", self.id, id);
        }
    }

    pub fn contains(&self, id: DrawableId) -> bool {
        self.children.contains(id)
    }

    pub fn drawable_count(&self) -> usize {
        self.children.len()
    }
}

impl Configurable for VectorRenderer {
    type Config = RendererOptions;

    fn config(&self) -> &Self::Config {
        &self.options
    }

    fn set_config(&mut self, config: Self::Config) -> Result<()> {
        Self::validate_config(&config)?;
        self.options = config;
        Ok(())
    }

    fn validate_config(config: &Self::Config) -> Result<()> {
        config.validate()
    }
}

impl LayerOperations for VectorRenderer {
    fn id(&self) -> &str {
        &self.id
    }

    fn events(&self, view: &dyn MapView) -> Vec<ViewEventKind> {
        VectorRenderer::events(self, view)
    }

    fn on_add(&mut self, view: &dyn MapView, hub: &EventHub) -> Result<()> {
        self.on_attach_to_view(view, hub)
    }

    fn on_remove(&mut self) -> Result<()> {
        self.on_detach_from_view();
        Ok(())
    }

    fn handle_event(&mut self, event: &ViewEvent, view: &dyn MapView) -> Result<()> {
        self.handle_view_event(event, view)
    }

    fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(|subscription| subscription.id())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
