use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Lifecycle events fired by the host view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewEvent {
    /// The view was reset; layer points must be recomputed from scratch
    ViewReset,
    /// A zoom change is about to start
    ZoomStart,
    /// The zoom level changed (fired after the view has its new zoom)
    Zoom,
    /// One frame of an animated zoom, carrying the in-flight target
    ZoomAnim { center: LatLng, zoom: f64 },
    /// The view moved
    Move,
    /// A pan or zoom completed
    MoveEnd,
    /// A zoom completed
    ZoomEnd,
    /// The container was rotated
    Rotate { bearing: f64 },
}

/// Discriminant of [`ViewEvent`], used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewEventKind {
    ViewReset,
    ZoomStart,
    Zoom,
    ZoomAnim,
    Move,
    MoveEnd,
    ZoomEnd,
    Rotate,
}

impl ViewEvent {
    pub fn kind(&self) -> ViewEventKind {
        match self {
            ViewEvent::ViewReset => ViewEventKind::ViewReset,
            ViewEvent::ZoomStart => ViewEventKind::ZoomStart,
            ViewEvent::Zoom => ViewEventKind::Zoom,
            ViewEvent::ZoomAnim { .. } => ViewEventKind::ZoomAnim,
            ViewEvent::Move => ViewEventKind::Move,
            ViewEvent::MoveEnd => ViewEventKind::MoveEnd,
            ViewEvent::ZoomEnd => ViewEventKind::ZoomEnd,
            ViewEvent::Rotate { .. } => ViewEventKind::Rotate,
        }
    }
}

impl std::fmt::Display for ViewEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewEventKind::ViewReset => write!(f, "viewreset"),
            ViewEventKind::ZoomStart => write!(f, "zoomstart"),
            ViewEventKind::Zoom => write!(f, "zoom"),
            ViewEventKind::ZoomAnim => write!(f, "zoomanim"),
            ViewEventKind::Move => write!(f, "move"),
            ViewEventKind::MoveEnd => write!(f, "moveend"),
            ViewEventKind::ZoomEnd => write!(f, "zoomend"),
            ViewEventKind::Rotate => write!(f, "rotate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        let anim = ViewEvent::ZoomAnim {
            center: LatLng::new(1.0, 2.0),
            zoom: 3.5,
        };
        assert_eq!(anim.kind(), ViewEventKind::ZoomAnim);
        assert_eq!(ViewEvent::MoveEnd.kind(), ViewEventKind::MoveEnd);
        assert_eq!(
            ViewEvent::Rotate { bearing: 45.0 }.kind(),
            ViewEventKind::Rotate
        );
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(ViewEventKind::ViewReset.to_string(), "viewreset");
        assert_eq!(ViewEventKind::ZoomAnim.to_string(), "zoomanim");
        assert_eq!(ViewEventKind::MoveEnd.to_string(), "moveend");
    }
}
