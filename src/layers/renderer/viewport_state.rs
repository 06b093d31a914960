use crate::core::{
    bounds::Bounds,
    geo::{LatLng, Point},
};
use crate::traits::MapView;
use crate::Result;
use serde::Serialize;

/// Snapshot of the renderer's clip area, captured from the host view.
///
/// Bounds and top-left are produced together by [`ViewportState::capture`] and
/// the whole value is replaced on every recomputation, so readers never see a
/// bounds/top-left pair from different events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    bounds: Bounds,
    top_left: LatLng,
    center: LatLng,
    zoom: f64,
}

impl ViewportState {
    /// Computes the padded clip box in layer pixels and its geographic top-left.
    ///
    /// All four corners go through the host projection because a rotated
    /// container maps its extreme corners to different layer corners.
    pub fn capture(view: &dyn MapView, padding: f64) -> Result<Self> {
        let mut corners = padded_corners(view.size(), padding);
        for corner in corners.iter_mut() {
            *corner = view.container_point_to_layer_point(*corner)?.floor();
        }
        let bounds = Bounds::from_points(corners).unwrap_or_default();
        let top_left = view.layer_point_to_lat_lng(bounds.min)?;

        log::debug!(
            "clip bounds ({:.0}, {:.0})-({:.0}, {:.0}) at zoom {}",
            bounds.min.x,
            bounds.min.y,
            bounds.max.x,
            bounds.max.y,
            view.zoom()
        );

        Ok(Self {
            bounds,
            top_left,
            center: view.center(),
            zoom: view.zoom(),
        })
    }

    /// Padded clip area in layer pixels, with integer corners
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Geographic coordinate of `bounds().min`
    pub fn top_left(&self) -> LatLng {
        self.top_left
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }
}

/// Container rectangle grown by `padding` of its size on every side
pub(crate) fn padded_corners(size: Point, padding: f64) -> [Point; 4] {
    let pad_min = size.multiply(-padding);
    let pad_max = size.multiply(1.0 + padding);
    [
        Point::new(pad_min.x, pad_min.y),
        Point::new(pad_min.x, pad_max.y),
        Point::new(pad_max.x, pad_min.y),
        Point::new(pad_max.x, pad_max.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::Viewport;
    use crate::Error;

    /// Flat host: layer = container - offset, one degree per 100 pixels
    struct FlatView {
        size: Point,
        offset: Point,
        fail: bool,
    }

    impl FlatView {
        fn new(width: f64, height: f64) -> Self {
            Self {
                size: Point::new(width, height),
                offset: Point::default(),
                fail: false,
            }
        }
    }

    impl MapView for FlatView {
        fn size(&self) -> Point {
            self.size
        }

        fn center(&self) -> LatLng {
            LatLng::new(0.0, 0.0)
        }

        fn zoom(&self) -> f64 {
            5.0
        }

        fn container_point_to_layer_point(&self, point: Point) -> Result<Point> {
            if self.fail {
                return Err(Error::InvalidCoordinates("projection offline".into()));
            }
            Ok(point.subtract(&self.offset))
        }

        fn layer_point_to_lat_lng(&self, point: Point) -> Result<LatLng> {
            Ok(LatLng::new(-point.y / 100.0, point.x / 100.0))
        }

        fn lat_lng_to_layer_point(&self, lat_lng: LatLng) -> Result<Point> {
            Ok(Point::new(lat_lng.lng * 100.0, -lat_lng.lat * 100.0))
        }

        fn zoom_scale(&self, to_zoom: f64, from_zoom: f64) -> f64 {
            2_f64.powf(to_zoom - from_zoom)
        }

        fn lat_lng_to_new_layer_point(
            &self,
            lat_lng: LatLng,
            _zoom: f64,
            _center: LatLng,
        ) -> Result<Point> {
            self.lat_lng_to_layer_point(lat_lng)
        }
    }

    #[test]
    fn test_padded_bounds_for_800_by_600() {
        let view = FlatView::new(800.0, 600.0);
        let state = ViewportState::capture(&view, 0.1).unwrap();
        let bounds = state.bounds();

        assert_eq!(bounds.min, Point::new(-80.0, -60.0));
        assert_eq!(bounds.max, Point::new(880.0, 660.0));
        assert_eq!(bounds.width(), 960.0);
        assert_eq!(bounds.height(), 720.0);
        assert_eq!(bounds.center(), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_bounds_are_floored_and_enclose_padding() {
        let mut view = FlatView::new(333.0, 177.0);
        view.offset = Point::new(0.25, -0.75);

        for padding in [0.0, 0.05, 0.1, 0.37, 1.0] {
            let bounds = ViewportState::capture(&view, padding).unwrap().bounds();
            for value in [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y] {
                assert_eq!(value, value.floor());
            }
            for corner in padded_corners(view.size, padding) {
                let layer = corner.subtract(&view.offset).floor();
                assert!(bounds.contains(&layer), "padding {}: {:?}", padding, layer);
            }
        }
    }

    #[test]
    fn test_top_left_matches_bounds_min() {
        let view = FlatView::new(800.0, 600.0);
        let state = ViewportState::capture(&view, 0.1).unwrap();

        assert!(state.top_left().equals(&LatLng::new(0.6, -0.8), 1e-12));
        let back = view.lat_lng_to_layer_point(state.top_left()).unwrap();
        assert!(back.distance_to(&state.bounds().min) < 1e-9);
        assert_eq!(state.zoom(), 5.0);
    }

    #[test]
    fn test_projection_errors_propagate() {
        let mut view = FlatView::new(800.0, 600.0);
        view.fail = true;
        assert!(matches!(
            ViewportState::capture(&view, 0.1),
            Err(Error::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_top_left_round_trip_through_mercator() {
        let viewport = Viewport::new(
            LatLng::new(48.8566, 2.3522),
            13.0,
            Point::new(800.0, 600.0),
        );
        let state = ViewportState::capture(&viewport, 0.1).unwrap();
        let min = viewport
            .lat_lng_to_new_layer_point(state.top_left(), 13.0, viewport.center)
            .unwrap();

        assert!(min.distance_to(&state.bounds().min) < 1e-6);
    }

    #[test]
    fn test_rotated_view_uses_all_four_corners() {
        let mut viewport = Viewport::new(
            LatLng::new(48.8566, 2.3522),
            13.0,
            Point::new(800.0, 600.0),
        );
        viewport.set_bearing(90.0);
        let bounds = ViewportState::capture(&viewport, 0.1).unwrap().bounds();

        // a quarter turn swaps the padded extents
        assert!((bounds.width() - 720.0).abs() <= 1.0);
        assert!((bounds.height() - 960.0).abs() <= 1.0);
        assert!((bounds.center().x - 400.0).abs() <= 1.0);
        assert!((bounds.center().y - 300.0).abs() <= 1.0);
    }
}
