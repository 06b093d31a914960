use crate::core::constants::{EARTH_RADIUS, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::traits::MapView;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Manages the current view of the map: center, zoom, bearing and screen dimensions.
///
/// Layer points are measured from `pixel_origin`, which only moves on a view
/// reset or a completed zoom. Panning shifts `pane_offset` instead, so layer
/// points of already-projected geometry stay valid until the next reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// Clockwise rotation of the container in degrees
    pub bearing: f64,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Projected pixel coordinate of layer point (0, 0)
    pixel_origin: Point,
    /// Accumulated pan offset of the map pane inside the container
    pane_offset: Point,
    zoom_animated: bool,
}

impl Viewport {
    /// Creates a new viewport and resets it to `center` at `zoom`
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let mut viewport = Self {
            center,
            zoom,
            size,
            bearing: 0.0,
            min_zoom: 0.0,
            max_zoom: 18.0,
            pixel_origin: Point::default(),
            pane_offset: Point::default(),
            zoom_animated: true,
        };
        viewport.reset_view(center, zoom);
        viewport
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.limit_zoom(self.zoom);
    }

    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn set_zoom_animated(&mut self, animated: bool) {
        self.zoom_animated = animated;
    }

    pub fn pixel_origin(&self) -> Point {
        self.pixel_origin
    }

    pub fn pane_offset(&self) -> Point {
        self.pane_offset
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);

        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;

        let half_world = PI * EARTH_RADIUS;
        let pixel_x = (x + half_world) / (2.0 * half_world) * scale;
        let pixel_y = (half_world - y) / (2.0 * half_world) * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: f64) -> LatLng {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);
        let half_world = PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * (2.0 * half_world) - half_world;
        let y = half_world - (pixel.y / scale) * (2.0 * half_world);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Pixel origin the view would have if centered on `center` at `zoom`,
    /// keeping the current pane offset
    pub fn new_pixel_origin(&self, center: &LatLng, zoom: f64) -> Point {
        let view_half = self.size.divide(2.0);
        self.project(center, zoom)
            .subtract(&view_half)
            .add(&self.pane_offset)
            .round()
    }

    /// Hard reset: pane back to the container origin and a fresh pixel origin
    pub fn reset_view(&mut self, center: LatLng, zoom: f64) {
        self.pane_offset = Point::default();
        self.move_to(center, zoom);
    }

    /// Moves to `center`/`zoom` without touching the pane offset
    pub fn move_to(&mut self, center: LatLng, zoom: f64) {
        self.zoom = self.limit_zoom(zoom);
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
        self.pixel_origin = self.new_pixel_origin(&self.center, self.zoom);
    }

    /// Pans by a container pixel offset; the center follows the container midpoint.
    /// The pane sits inside the rotated container, so the offset is unrotated first.
    pub fn pan_by(&mut self, offset: Point) {
        self.pane_offset = self.pane_offset.subtract(&offset.rotate(-self.bearing));
        self.center = self.container_center_lat_lng();
    }

    /// Resizes the container, keeping the geographic center in the middle
    pub fn resize(&mut self, size: Point) {
        let old_half = self.size.divide(2.0).round();
        let new_half = size.divide(2.0).round();
        self.size = size;
        self.pane_offset = self.pane_offset.add(&new_half.subtract(&old_half));
        self.center = self.container_center_lat_lng();
    }

    pub fn set_bearing(&mut self, bearing: f64) {
        self.bearing = bearing.rem_euclid(360.0);
    }

    fn container_center_lat_lng(&self) -> LatLng {
        let layer_center = self.size.divide(2.0).subtract(&self.pane_offset);
        self.unproject(&layer_center.add(&self.pixel_origin), self.zoom)
    }

    /// Converts a layer point to a container point, rotating around the container center
    pub fn layer_point_to_container_point(&self, point: &Point) -> Point {
        let view_half = self.size.divide(2.0);
        point
            .add(&self.pane_offset)
            .subtract(&view_half)
            .rotate(self.bearing)
            .add(&view_half)
    }

    pub fn container_point_to_lat_lng(&self, point: &Point) -> Result<LatLng> {
        let layer_point = self.container_point_to_layer_point(*point)?;
        self.layer_point_to_lat_lng(layer_point)
    }
}

fn finite_point(point: Point, what: &str) -> Result<Point> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(Error::InvalidCoordinates(format!(
            "{} ({}, {}) is not finite",
            what, point.x, point.y
        )))
    }
}

fn finite_lat_lng(lat_lng: LatLng, what: &str) -> Result<LatLng> {
    if lat_lng.is_finite() {
        Ok(lat_lng)
    } else {
        Err(Error::InvalidCoordinates(format!(
            "{} ({}, {}) is not finite",
            what, lat_lng.lat, lat_lng.lng
        )))
    }
}

impl MapView for Viewport {
    fn size(&self) -> Point {
        self.size
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn zoom_animated(&self) -> bool {
        self.zoom_animated
    }

    fn container_point_to_layer_point(&self, point: Point) -> Result<Point> {
        let point = finite_point(point, "container point")?;
        let view_half = self.size.divide(2.0);
        Ok(point
            .subtract(&view_half)
            .rotate(-self.bearing)
            .add(&view_half)
            .subtract(&self.pane_offset))
    }

    fn layer_point_to_lat_lng(&self, point: Point) -> Result<LatLng> {
        let point = finite_point(point, "layer point")?;
        Ok(self.unproject(&point.add(&self.pixel_origin), self.zoom))
    }

    fn lat_lng_to_layer_point(&self, lat_lng: LatLng) -> Result<Point> {
        let lat_lng = finite_lat_lng(lat_lng, "coordinate")?;
        Ok(self
            .project(&lat_lng, self.zoom)
            .round()
            .subtract(&self.pixel_origin))
    }

    fn zoom_scale(&self, to_zoom: f64, from_zoom: f64) -> f64 {
        2_f64.powf(to_zoom - from_zoom)
    }

    fn lat_lng_to_new_layer_point(&self, lat_lng: LatLng, zoom: f64, center: LatLng) -> Result<Point> {
        let lat_lng = finite_lat_lng(lat_lng, "coordinate")?;
        let center = finite_lat_lng(center, "center")?;
        let origin = self.new_pixel_origin(&center, zoom);
        Ok(self.project(&lat_lng, zoom).subtract(&origin))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf_viewport() -> Viewport {
        Viewport::new(
            LatLng::new(37.7749, -122.4194),
            10.0,
            Point::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = sf_viewport();

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 37.7749);
        assert_eq!(viewport.size.x, 800.0);
        assert_eq!(viewport.pane_offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_container_origin_is_layer_origin_after_reset() {
        let viewport = sf_viewport();
        let layer = viewport
            .container_point_to_layer_point(Point::new(0.0, 0.0))
            .unwrap();
        assert_eq!(layer, Point::new(0.0, 0.0));

        let center = viewport
            .container_point_to_lat_lng(&Point::new(400.0, 300.0))
            .unwrap();
        assert!(center.equals(&viewport.center, 1e-3));
    }

    #[test]
    fn test_project_unproject_round_trip() {
        let viewport = Viewport::default();
        let coord = LatLng::new(51.5074, -0.1278);
        let back = viewport.unproject(&viewport.project(&coord, 7.0), 7.0);
        assert!(back.equals(&coord, 1e-9));
    }

    #[test]
    fn test_rotated_container_layer_round_trip() {
        let mut viewport = sf_viewport();
        viewport.set_bearing(37.0);
        viewport.pan_by(Point::new(25.0, -60.0));

        let container = Point::new(123.0, 456.0);
        let layer = viewport.container_point_to_layer_point(container).unwrap();
        let back = viewport.layer_point_to_container_point(&layer);
        assert!(back.distance_to(&container) < 1e-9);
    }

    #[test]
    fn test_pan_keeps_pixel_origin() {
        let mut viewport = sf_viewport();
        let origin = viewport.pixel_origin();
        viewport.pan_by(Point::new(100.0, 50.0));

        assert_eq!(viewport.pixel_origin(), origin);
        assert_eq!(viewport.pane_offset(), Point::new(-100.0, -50.0));
        assert_eq!(viewport.new_pixel_origin(&viewport.center, viewport.zoom), origin);
    }

    #[test]
    fn test_rotated_pan_moves_along_screen_axes() {
        let mut viewport = sf_viewport();
        viewport.set_bearing(90.0);
        let layer = viewport
            .container_point_to_layer_point(Point::new(500.0, 300.0))
            .unwrap();

        viewport.pan_by(Point::new(100.0, 0.0));

        let moved = viewport.layer_point_to_container_point(&layer);
        assert!(moved.distance_to(&Point::new(400.0, 300.0)) < 1e-9);
        let mid = viewport
            .container_point_to_lat_lng(&Point::new(400.0, 300.0))
            .unwrap();
        assert!(mid.equals(&viewport.center, 1e-9));
    }

    #[test]
    fn test_resize_keeps_center() {
        let mut viewport = sf_viewport();
        let center = viewport.center;
        viewport.resize(Point::new(1024.0, 768.0));

        // pixel origins are rounded, so the center may drift by half a pixel
        assert!(viewport.center.equals(&center, 1e-3));
        let mid = viewport
            .container_point_to_lat_lng(&Point::new(512.0, 384.0))
            .unwrap();
        assert!(mid.equals(&center, 1e-3));
    }

    #[test]
    fn test_zoom_scale() {
        let viewport = sf_viewport();
        assert_eq!(viewport.zoom_scale(12.0, 10.0), 4.0);
        assert_eq!(viewport.zoom_scale(9.0, 10.0), 0.5);
        assert_eq!(viewport.zoom_scale(10.0, 10.0), 1.0);
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        let viewport = sf_viewport();
        assert!(matches!(
            viewport.container_point_to_layer_point(Point::new(f64::NAN, 0.0)),
            Err(Error::InvalidCoordinates(_))
        ));
        assert!(viewport
            .lat_lng_to_new_layer_point(LatLng::new(0.0, f64::INFINITY), 3.0, viewport.center)
            .is_err());
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.move_to(viewport.center, 1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.move_to(viewport.center, 20.0);
        assert_eq!(viewport.zoom, 15.0);
    }
}
