use crate::core::{config::SurfaceCapabilities, geo::Point};
use serde::Serialize;

/// Translate + scale currently applied to a surface container
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceTransform {
    pub offset: Point,
    pub scale: f64,
}

impl SurfaceTransform {
    pub fn new(offset: Point, scale: f64) -> Self {
        Self { offset, scale }
    }

    pub fn is_identity(&self) -> bool {
        self.offset == Point::default() && self.scale == 1.0
    }
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self::new(Point::default(), 1.0)
    }
}

impl std::fmt::Display for SurfaceTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "translate3d({}px, {}px, 0) scale({})",
            self.offset.x, self.offset.y, self.scale
        )
    }
}

/// The element a renderer draws into. Drawables paint in layer pixels relative
/// to the renderer's clip bounds; the container carries the transform that
/// places those pixels on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceContainer {
    transform: SurfaceTransform,
    zoom_animated: bool,
}

impl SurfaceContainer {
    pub fn new(zoom_animated: bool) -> Self {
        Self {
            transform: SurfaceTransform::default(),
            zoom_animated,
        }
    }

    pub fn transform(&self) -> SurfaceTransform {
        self.transform
    }

    /// Whether the container follows animated zoom frames
    pub fn is_zoom_animated(&self) -> bool {
        self.zoom_animated
    }

    pub fn set_transform(&mut self, offset: Point, scale: f64) {
        self.transform = SurfaceTransform::new(offset, scale);
    }

    /// Moves the container without scaling it
    pub fn set_position(&mut self, offset: Point) {
        self.transform = SurfaceTransform::new(offset, 1.0);
    }
}

/// How a renderer applies transforms to its container, chosen once from the
/// surface capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransformStrategy {
    /// Single translate + scale operation
    Combined,
    /// Reposition only; content renders at native resolution
    PositionOnly,
}

impl TransformStrategy {
    pub fn for_capabilities(capabilities: &SurfaceCapabilities) -> Self {
        if capabilities.combined_transforms {
            Self::Combined
        } else {
            Self::PositionOnly
        }
    }

    /// Animated zoom frames need a scalable surface
    pub fn supports_zoom_animation(self) -> bool {
        matches!(self, Self::Combined)
    }

    pub fn apply(self, container: &mut SurfaceContainer, offset: Point, scale: f64) {
        match self {
            Self::Combined => container.set_transform(offset, scale),
            Self::PositionOnly => container.set_position(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_capabilities() {
        assert_eq!(
            TransformStrategy::for_capabilities(&SurfaceCapabilities::default()),
            TransformStrategy::Combined
        );
        assert_eq!(
            TransformStrategy::for_capabilities(&SurfaceCapabilities::position_only()),
            TransformStrategy::PositionOnly
        );
        assert!(TransformStrategy::Combined.supports_zoom_animation());
        assert!(!TransformStrategy::PositionOnly.supports_zoom_animation());
    }

    #[test]
    fn test_combined_applies_scale() {
        let mut container = SurfaceContainer::new(true);
        assert!(container.transform().is_identity());

        TransformStrategy::Combined.apply(&mut container, Point::new(-12.0, 7.5), 4.0);
        assert_eq!(
            container.transform(),
            SurfaceTransform::new(Point::new(-12.0, 7.5), 4.0)
        );
    }

    #[test]
    fn test_position_only_keeps_native_scale() {
        let mut container = SurfaceContainer::new(false);
        TransformStrategy::PositionOnly.apply(&mut container, Point::new(3.0, 4.0), 0.5);

        let transform = container.transform();
        assert_eq!(transform.offset, Point::new(3.0, 4.0));
        assert_eq!(transform.scale, 1.0);
        assert!(!container.is_zoom_animated());
    }

    #[test]
    fn test_transform_display() {
        let transform = SurfaceTransform::new(Point::new(-80.0, 60.0), 2.0);
        assert_eq!(
            transform.to_string(),
            "translate3d(-80px, 60px, 0) scale(2)"
        );
    }
}
