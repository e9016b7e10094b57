use geo::{Coord, LineString, coord};

use crate::Coordinate;

const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Planar metric space the geometry comparison runs on.
///
/// Observed polylines decode to WGS84 degrees while all comparison thresholds
/// are meters, so both sides of a comparison must pass through the same
/// projection before any distance is computed. Implemented by the caller when
/// a proper CRS transformation is available; [`LocalEquirectangular`] ships as
/// the batteries-included approximation.
pub trait Projection {
    /// Projects a WGS84 coordinate into planar meters.
    fn project(&self, coordinate: Coordinate) -> Coord;

    /// Projects an ordered coordinate sequence into a planar linestring.
    fn project_line(&self, coordinates: &[Coordinate]) -> LineString {
        LineString::from_iter(coordinates.iter().map(|&coordinate| self.project(coordinate)))
    }
}

/// Equirectangular approximation around a fixed origin.
///
/// Accurate to well below the GPS noise floor for the few-kilometer extents
/// road segments live on; not suitable for continent-scale geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEquirectangular {
    origin: Coordinate,
}

impl LocalEquirectangular {
    pub const fn centered_on(origin: Coordinate) -> Self {
        Self { origin }
    }
}

impl Projection for LocalEquirectangular {
    fn project(&self, coordinate: Coordinate) -> Coord {
        let scale = self.origin.lat.to_radians().cos();
        coord! {
            x: (coordinate.lon - self.origin.lon).to_radians() * scale * MEAN_EARTH_RADIUS_M,
            y: (coordinate.lat - self.origin.lat).to_radians() * MEAN_EARTH_RADIUS_M,
        }
    }
}

/// Pass-through for inputs already expressed in a planar metric CRS:
/// `lon` becomes `x` and `lat` becomes `y`, both taken as meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Planar;

impl Projection for Planar {
    fn project(&self, coordinate: Coordinate) -> Coord {
        coord! { x: coordinate.lon, y: coordinate.lat }
    }
}
