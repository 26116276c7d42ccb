//! Coordinate type definitions

use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Web Mercator latitude limit. Bounding boxes are clamped to it.
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;
pub const MIN_MERCATOR_LAT: f64 = -85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom range accepted by the projector.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Kilometres per degree of latitude used for radius conversions.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Errors raised by the projector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude/longitude outside the valid domain or at a singularity.
    #[error("Invalid coordinate ({lat}, {lon}): {reason}")]
    InvalidCoordinate { lat: f64, lon: f64, reason: String },

    /// Zoom level outside 0..=22.
    #[error(
        "Invalid zoom level: {0} (must be between {min} and {max})",
        min = MIN_ZOOM,
        max = MAX_ZOOM
    )]
    InvalidZoom(u8),

    /// Bounding box edges are inconsistent.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Tile URL template is missing a placeholder.
    #[error("Invalid tile URL template '{template}': missing {placeholder}")]
    InvalidTemplate {
        template: String,
        placeholder: &'static str,
    },
}

impl CoordError {
    pub(crate) fn coordinate(lat: f64, lon: f64, reason: impl Into<String>) -> Self {
        CoordError::InvalidCoordinate {
            lat,
            lon,
            reason: reason.into(),
        }
    }
}

/// A single tile in the slippy-map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilePoint {
    /// Column, 0 at the antimeridian going east
    pub x: u32,
    /// Row, 0 at the north edge
    pub y: u32,
    /// Zoom level
    pub z: u8,
}

impl TilePoint {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for TilePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic extent in degrees.
///
/// `west > east` describes a box that crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    ///
    /// Latitudes must lie strictly inside (-90, 90), longitudes inside
    /// [-180, 180], and `north >= south`.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, CoordError> {
        let bbox = Self {
            north,
            south,
            east,
            west,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the box edges without constructing a new value.
    pub fn validate(&self) -> Result<(), CoordError> {
        for (lat, lon) in [(self.north, self.west), (self.south, self.east)] {
            validate_lat_lon(lat, lon)?;
        }
        if self.north < self.south {
            return Err(CoordError::InvalidBoundingBox(format!(
                "north ({}) is below south ({})",
                self.north, self.south
            )));
        }
        Ok(())
    }

    /// Whether the box crosses longitude 180.
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N{:.5} S{:.5} E{:.5} W{:.5}",
            self.north, self.south, self.east, self.west
        )
    }
}

pub(crate) fn validate_lat_lon(lat: f64, lon: f64) -> Result<(), CoordError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(CoordError::coordinate(lat, lon, "coordinates must be finite"));
    }
    if lat <= -90.0 || lat >= 90.0 {
        return Err(CoordError::coordinate(
            lat,
            lon,
            "latitude must be strictly between -90 and 90",
        ));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::coordinate(
            lat,
            lon,
            "longitude must be between -180 and 180",
        ));
    }
    Ok(())
}

/// A fetchable tile resource.
///
/// Equality and hashing use the URL only: the URL is the cache key.
#[derive(Debug, Clone)]
pub struct TileRequest {
    pub url: String,
    /// Tile the URL was built from, when known.
    pub tile: Option<TilePoint>,
}

impl TileRequest {
    pub fn new(url: impl Into<String>, tile: TilePoint) -> Self {
        Self {
            url: url.into(),
            tile: Some(tile),
        }
    }

    /// Wrap an arbitrary URL supplied by the caller.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tile: None,
        }
    }
}

impl PartialEq for TileRequest {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for TileRequest {}

impl Hash for TileRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// ArcGIS World Imagery. Note the z/y/x path order.
pub const DEFAULT_TILE_URL_TEMPLATE: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";

/// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
///
/// Substitution is by name, so the provider's path order is preserved
/// exactly as written in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
}

impl TileUrlTemplate {
    pub fn parse(template: impl Into<String>) -> Result<Self, CoordError> {
        let template = template.into();
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(CoordError::InvalidTemplate {
                    template,
                    placeholder,
                });
            }
        }
        Ok(Self { template })
    }

    /// Build the URL for one tile.
    pub fn url_for(&self, tile: &TilePoint) -> String {
        self.template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Build a [`TileRequest`] for one tile.
    pub fn request_for(&self, tile: TilePoint) -> TileRequest {
        TileRequest::new(self.url_for(&tile), tile)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for TileUrlTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
        }
    }
}

impl fmt::Display for TileUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_template_preserves_zyx_order() {
        let template = TileUrlTemplate::default();
        let url = template.url_for(&TilePoint::new(548, 380, 10));
        assert!(url.ends_with("/tile/10/380/548"), "got {}", url);
    }

    #[test]
    fn test_template_missing_placeholder() {
        let err = TileUrlTemplate::parse("https://tiles.example.com/{z}/{x}.png").unwrap_err();
        assert!(matches!(
            err,
            CoordError::InvalidTemplate {
                placeholder: "{y}",
                ..
            }
        ));
    }

    #[test]
    fn test_tile_request_equality_by_url() {
        let a = TileRequest::new("https://t/1/2/3", TilePoint::new(3, 2, 1));
        let b = TileRequest::from_url("https://t/1/2/3");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_bounding_box_rejects_inverted_latitudes() {
        let err = BoundingBox::new(10.0, 20.0, 5.0, 0.0).unwrap_err();
        assert!(matches!(err, CoordError::InvalidBoundingBox(_)));
    }

    #[test]
    fn test_bounding_box_rejects_pole() {
        let err = BoundingBox::new(90.0, 10.0, 5.0, 0.0).unwrap_err();
        assert!(matches!(err, CoordError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_bounding_box_antimeridian_flag() {
        let bbox = BoundingBox::new(10.0, -10.0, -170.0, 170.0).unwrap();
        assert!(bbox.crosses_antimeridian());
        let bbox = BoundingBox::new(10.0, -10.0, 20.0, 10.0).unwrap();
        assert!(!bbox.crosses_antimeridian());
    }

    #[test]
    fn test_tile_point_display() {
        assert_eq!(TilePoint::new(1, 2, 3).to_string(), "3/1/2");
    }
}
