//! Child registry and notification fan-out
//!
//! The registry holds non-owning handles: a drawable's owner keeps the strong
//! `Rc`, and a drawable dropped without being detached is pruned on the next
//! dispatch.

use crate::core::{
    bounds::Bounds,
    geo::LatLng,
};
use crate::layers::renderer::viewport_state::ViewportState;
use crate::prelude::{HashMap, RefCell, Rc, Weak};
use crate::traits::{Drawable, MapView};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identifier of a drawable inside one renderer's registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrawableId(u64);

impl DrawableId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DrawableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "drawable#{}", self.0)
    }
}

/// Notifications fanned out to drawables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notification {
    /// Discard projected geometry and reproject from source coordinates
    Reset,
    /// A discrete zoom finished; reproject
    ZoomEnd,
    /// Bounds moved; redraw from already-projected coordinates
    Update,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Reset => write!(f, "reset"),
            Notification::ZoomEnd => write!(f, "zoomend"),
            Notification::Update => write!(f, "update"),
        }
    }
}

/// Read-only view of the renderer handed to drawables during a notification
pub struct RenderFrame<'a> {
    state: &'a ViewportState,
    tolerance: f64,
    view: &'a dyn MapView,
}

impl<'a> RenderFrame<'a> {
    pub(crate) fn new(state: &'a ViewportState, tolerance: f64, view: &'a dyn MapView) -> Self {
        Self {
            state,
            tolerance,
            view,
        }
    }

    pub fn viewport(&self) -> &ViewportState {
        self.state
    }

    /// Clip bounds in layer pixels
    pub fn bounds(&self) -> Bounds {
        self.state.bounds()
    }

    pub fn top_left(&self) -> LatLng {
        self.state.top_left()
    }

    /// Hit-test tolerance in pixels
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Host view, for reprojecting source coordinates
    pub fn view(&self) -> &dyn MapView {
        self.view
    }
}

type DrawableHandle = Weak<RefCell<dyn Drawable>>;

/// Arena of drawables keyed by [`DrawableId`]. Iteration order is unspecified.
#[derive(Default)]
pub struct ChildRegistry {
    children: HashMap<DrawableId, DrawableHandle>,
    next_id: u64,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `drawable` under a freshly assigned identifier
    pub fn register<D: Drawable + 'static>(&mut self, drawable: &Rc<RefCell<D>>) -> DrawableId {
        let id = loop {
            self.next_id += 1;
            let candidate = DrawableId(self.next_id);
            if !self.children.contains_key(&candidate) {
                break candidate;
            }
        };
        self.attach(id, drawable);
        id
    }

    /// Adds `drawable` under `id`, replacing any previous entry. Returns true
    /// if an entry was replaced.
    pub fn attach<D: Drawable + 'static>(&mut self, id: DrawableId, drawable: &Rc<RefCell<D>>) -> bool {
        let handle: Rc<RefCell<dyn Drawable>> = drawable.clone();
        let replaced = self.children.insert(id, Rc::downgrade(&handle)).is_some();
        if replaced {
            log::debug!("{} re-attached, previous handle replaced", id);
        }
        replaced
    }

    /// Removes `id`; unknown identifiers are ignored. Returns true if an entry
    /// was removed.
    pub fn detach(&mut self, id: DrawableId) -> bool {
        self.children.remove(&id).is_some()
    }

    /// True while `id` is registered and its drawable is still alive
    pub fn contains(&self, id: DrawableId) -> bool {
        self.children
            .get(&id)
            .map(|handle| handle.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Number of live drawables. Entries whose drawable was dropped are not
    /// counted, even before the next dispatch prunes them.
    pub fn len(&self) -> usize {
        self.children
            .values()
            .filter(|handle| handle.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<DrawableId> {
        let mut ids: Vec<DrawableId> = self.children.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Sends `kind` to every live drawable and returns how many were notified.
    /// The first drawable error aborts the fan-out and is returned.
    pub fn dispatch(&mut self, kind: Notification, frame: &RenderFrame<'_>) -> Result<usize> {
        self.children.retain(|id, handle| {
            let alive = handle.strong_count() > 0;
            if !alive {
                log::warn!("{} was dropped without being detached", id);
            }
            alive
        });

        let mut live: Vec<(DrawableId, Rc<RefCell<dyn Drawable>>)> = self
            .children
            .iter()
            .filter_map(|(id, handle)| handle.upgrade().map(|drawable| (*id, drawable)))
            .collect();
        live.sort_by_key(|(id, _)| *id);

        for (id, drawable) in &live {
            let mut drawable = drawable
                .try_borrow_mut()
                .map_err(|_| Error::ReentrantDispatch(*id))?;
            match kind {
                Notification::Reset => drawable.on_reset(frame)?,
                Notification::ZoomEnd => drawable.on_zoom_end(frame)?,
                Notification::Update => drawable.on_update(frame)?,
            }
        }

        log::trace!("{} sent to {} drawables", kind, live.len());
        Ok(live.len())
    }
}

impl std::fmt::Debug for ChildRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildRegistry")
            .field("children", &self.ids())
            .finish()
    }
}
