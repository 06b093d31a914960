//! Core constants derived from Leaflet defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels; the world is this wide at zoom 0.
pub const TILE_SIZE: u32 = 256;

/// Spherical Mercator earth radius in meters (EPSG:3857).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// How far the renderer's clip area extends around the view, relative to its size.
pub const DEFAULT_PADDING: f64 = 0.1;

/// Extra click tolerance (in pixels) handed to drawables.
pub const DEFAULT_TOLERANCE: f64 = 0.0;
