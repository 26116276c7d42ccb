//! Coordinate projection module
//!
//! Converts geographic coordinates and bounding boxes into slippy-map tile
//! coordinates and tile URLs using the Web Mercator projection.

mod types;


pub use types::{
    BoundingBox, CoordError, TilePoint, TileRequest, TileUrlTemplate, DEFAULT_TILE_URL_TEMPLATE,
    KM_PER_DEGREE, MAX_LON, MAX_MERCATOR_LAT, MAX_ZOOM, MIN_LON, MIN_MERCATOR_LAT, MIN_ZOOM,
};

use std::f64::consts::PI;
use types::validate_lat_lon;

/// Upper bound on the up-front allocation for a tile list.
const MAX_PREALLOCATED_REQUESTS: usize = 4096;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, strictly between -90 and 90
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
///
/// Latitudes beyond the Web Mercator limit are clamped to the first/last row.
#[inline]
pub fn tile_for(lat: f64, lon: f64, zoom: u8) -> Result<TilePoint, CoordError> {
    validate_lat_lon(lat, lon)?;
    validate_zoom(zoom)?;

    let n = 2.0_f64.powi(zoom as i32);

    let x = ((lon + 180.0) / 360.0 * n).floor();

    let lat_rad = lat * PI / 180.0;
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    if !x.is_finite() || !y.is_finite() {
        return Err(CoordError::coordinate(lat, lon, "projection is undefined"));
    }

    Ok(TilePoint {
        x: clamp_index(x, n),
        y: clamp_index(y, n),
        z: zoom,
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TilePoint) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.z as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Enumerates every tile covering `bbox` at each of `zoom_levels`.
///
/// Zoom levels are visited ascending (duplicates ignored), then x ascending
/// in eastward order, then y ascending. A box crossing the antimeridian emits
/// its western span (up to the last column) before the eastern span
/// (from column 0).
pub fn tiles_in_bounding_box(
    bbox: &BoundingBox,
    zoom_levels: &[u8],
    template: &TileUrlTemplate,
) -> Result<Vec<TileRequest>, CoordError> {
    let zooms = normalize_zoom_levels(zoom_levels)?;
    let count = tile_count(bbox, &zooms)?;
    let count = usize::try_from(count).map_err(|_| {
        CoordError::InvalidBoundingBox(format!(
            "{} tiles cannot be addressed on this platform",
            count
        ))
    })?;
    let mut requests = Vec::with_capacity(count.min(MAX_PREALLOCATED_REQUESTS));

    for zoom in zooms {
        let extent = TileExtent::for_box(bbox, zoom)?;
        for (x_min, x_max) in extent.x_spans() {
            for x in x_min..=x_max {
                for y in extent.y_min..=extent.y_max {
                    requests.push(template.request_for(TilePoint { x, y, z: zoom }));
                }
            }
        }
    }

    Ok(requests)
}

/// Counts the tiles [`tiles_in_bounding_box`] would emit without building URLs.
pub fn tile_count(bbox: &BoundingBox, zoom_levels: &[u8]) -> Result<u64, CoordError> {
    let zooms = normalize_zoom_levels(zoom_levels)?;
    let mut total = 0u64;

    for zoom in zooms {
        let extent = TileExtent::for_box(bbox, zoom)?;
        let width: u64 = extent
            .x_spans()
            .map(|(min, max)| (max - min) as u64 + 1)
            .sum();
        let height = (extent.y_max - extent.y_min) as u64 + 1;
        total += width * height;
    }

    Ok(total)
}

/// Builds a box of `radius_km` around a centre point.
///
/// Uses 111 km per degree of latitude and scales the longitude offset by
/// `cos(lat)`. North/south are clamped to the Web Mercator limit; edges that
/// pass ±180° wrap around, giving an antimeridian-crossing box.
pub fn bounding_box_around(
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> Result<BoundingBox, CoordError> {
    validate_lat_lon(center_lat, center_lon)?;
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(CoordError::coordinate(
            center_lat,
            center_lon,
            format!("radius must be a non-negative distance, got {}", radius_km),
        ));
    }

    let cos_lat = (center_lat * PI / 180.0).cos();
    if cos_lat <= f64::EPSILON {
        return Err(CoordError::coordinate(
            center_lat,
            center_lon,
            "longitude offset is unbounded at the pole",
        ));
    }

    let lat_offset = radius_km / KM_PER_DEGREE;
    let lon_offset = radius_km / (KM_PER_DEGREE * cos_lat);

    let north = (center_lat + lat_offset).min(MAX_MERCATOR_LAT);
    let south = (center_lat - lat_offset).max(MIN_MERCATOR_LAT);

    // A box wider than the world covers every column.
    let (west, east) = if lon_offset >= 180.0 {
        (MIN_LON, MAX_LON)
    } else {
        (
            wrap_longitude(center_lon - lon_offset),
            wrap_longitude(center_lon + lon_offset),
        )
    };

    BoundingBox::new(north, south, east, west)
}

/// Sorts and de-duplicates zoom levels, rejecting out-of-range values.
pub fn normalize_zoom_levels(zoom_levels: &[u8]) -> Result<Vec<u8>, CoordError> {
    let mut zooms = zoom_levels.to_vec();
    for &zoom in &zooms {
        validate_zoom(zoom)?;
    }
    zooms.sort_unstable();
    zooms.dedup();
    Ok(zooms)
}

/// Inclusive zoom range as a list, e.g. `zoom_range(12, 14) == [12, 13, 14]`.
pub fn zoom_range(min_zoom: u8, max_zoom: u8) -> Result<Vec<u8>, CoordError> {
    validate_zoom(min_zoom)?;
    validate_zoom(max_zoom)?;
    if min_zoom > max_zoom {
        return Err(CoordError::InvalidZoom(min_zoom));
    }
    Ok((min_zoom..=max_zoom).collect())
}

#[inline]
fn validate_zoom(zoom: u8) -> Result<(), CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(())
}

#[inline]
fn clamp_index(value: f64, n: f64) -> u32 {
    value.clamp(0.0, n - 1.0) as u32
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon < MIN_LON {
        lon + 360.0
    } else if lon > MAX_LON {
        lon - 360.0
    } else {
        lon
    }
}

/// Tile ranges covered by a box at one zoom level.
struct TileExtent {
    west_x: u32,
    east_x: u32,
    y_min: u32,
    y_max: u32,
    last_x: u32,
    wraps: bool,
}

impl TileExtent {
    fn for_box(bbox: &BoundingBox, zoom: u8) -> Result<Self, CoordError> {
        bbox.validate()?;
        let north_west = tile_for(bbox.north, bbox.west, zoom)?;
        let south_east = tile_for(bbox.south, bbox.east, zoom)?;
        let last_x = (1u32 << zoom) - 1;

        // At low zoom both corners of a crossing box can land in one
        // column; the box still spans the whole world in that case.
        let wraps = bbox.crosses_antimeridian();

        Ok(Self {
            west_x: north_west.x,
            east_x: south_east.x,
            y_min: north_west.y,
            y_max: south_east.y,
            last_x,
            wraps,
        })
    }

    fn x_spans(&self) -> impl Iterator<Item = (u32, u32)> {
        let spans = if !self.wraps {
            [Some((self.west_x, self.east_x)), None]
        } else if self.east_x >= self.west_x {
            [Some((0, self.last_x)), None]
        } else {
            [Some((self.west_x, self.last_x)), Some((0, self.east_x))]
        };
        spans.into_iter().flatten()
    }
}
