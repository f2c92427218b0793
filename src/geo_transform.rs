use geo_types::Coord;

use crate::errors::{BoxError, Result, VectorizeError};

/// An affine transform.
///
/// A six-element array storing the coefficients of an [affine transform]
/// used in mapping coordinates between pixel/line `(P, L)` (raster) space,
/// and `(Xp,Yp)` (projection) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
///
/// ## Note
///
/// Care with coefficient ordering is required when constructing an [affine transform matrix] from
/// a `GeoTransform`. If a 3x3 transform matrix is defined as:
///
/// ```text
/// | a b c |
/// | d e f |
/// | 0 0 1 |
/// ```
///
/// The corresponding `GeoTransform` ordering is:
///
/// ```text
/// [c, a, b, f, d, e]
/// ```
///
/// # Example
///
/// ```rust
/// # fn main() -> polygonize::errors::Result<()> {
/// use polygonize::{GeoTransform, GeoTransformEx};
/// let transform: GeoTransform = [768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0];
/// let (x, y) = transform.apply(0.0, 0.0);
/// assert_eq!((x, y), (768269.0, 4057292.0));
/// let inverse = transform.invert()?;
/// assert_eq!(inverse.apply(x, y), (0.0, 0.0));
/// # Ok(())
/// # }
/// ```
///
/// [affine transform]: https://en.wikipedia.org/wiki/Affine_transformation
/// [affine transform matrix]: https://en.wikipedia.org/wiki/Transformation_matrix#Affine_transformations
pub type GeoTransform = [f64; 6];

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply GeoTransform to x/y coordinate.
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Invert a [`GeoTransform`].
    ///
    /// Fails with [`VectorizeError::BadArgument`] when the transform is degenerate.
    fn invert(&self) -> Result<GeoTransform>;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        (
            self[0] + pixel * self[1] + line * self[2],
            self[3] + pixel * self[4] + line * self[5],
        )
    }

    fn invert(&self) -> Result<GeoTransform> {
        // Fast path for north-up images, which keeps the inverse exact.
        if self[2] == 0.0 && self[4] == 0.0 && self[1] != 0.0 && self[5] != 0.0 {
            return Ok([
                -self[0] / self[1],
                1.0 / self[1],
                0.0,
                -self[3] / self[5],
                0.0,
                1.0 / self[5],
            ]);
        }

        let det = self[1] * self[5] - self[2] * self[4];
        let magnitude = self[1]
            .abs()
            .max(self[2].abs())
            .max(self[4].abs().max(self[5].abs()));
        if det.abs() <= 1e-10 * magnitude * magnitude {
            return Err(VectorizeError::BadArgument(
                "Geo transform is uninvertible".to_string(),
            ));
        }

        let inv_det = 1.0 / det;
        Ok([
            (self[2] * self[3] - self[0] * self[5]) * inv_det,
            self[5] * inv_det,
            -self[2] * inv_det,
            (-self[1] * self[3] + self[0] * self[4]) * inv_det,
            -self[4] * inv_det,
            self[1] * inv_det,
        ])
    }
}

/// Maps pixel-corner grid coordinates into the caller's coordinate space.
///
/// Grid coordinates address pixel corners: `(0, 0)` is the top-left corner of
/// the top-left pixel and `(width, height)` the bottom-right corner of the
/// raster. The transform is applied once per output vertex, after a ring has
/// closed.
pub trait GridToWorld {
    fn grid_to_world(&mut self, x: f64, y: f64) -> std::result::Result<Coord<f64>, BoxError>;
}

impl GridToWorld for GeoTransform {
    fn grid_to_world(&mut self, x: f64, y: f64) -> std::result::Result<Coord<f64>, BoxError> {
        let (x, y) = self.apply(x, y);
        Ok(Coord { x, y })
    }
}

/// Leaves grid coordinates untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl GridToWorld for Identity {
    fn grid_to_world(&mut self, x: f64, y: f64) -> std::result::Result<Coord<f64>, BoxError> {
        Ok(Coord { x, y })
    }
}

/// Adapts a fallible closure into a [`GridToWorld`] transform.
///
/// ```rust
/// use polygonize::{FnTransform, GridToWorld};
///
/// let mut shift = FnTransform(|x: f64, y: f64| -> Result<(f64, f64), std::io::Error> {
///     Ok((x + 10.0, y))
/// });
/// let coord = shift.grid_to_world(1.0, 2.0).unwrap();
/// assert_eq!((coord.x, coord.y), (11.0, 2.0));
/// ```
pub struct FnTransform<F>(pub F);

impl<F, E> GridToWorld for FnTransform<F>
where
    F: FnMut(f64, f64) -> std::result::Result<(f64, f64), E>,
    E: Into<BoxError>,
{
    fn grid_to_world(&mut self, x: f64, y: f64) -> std::result::Result<Coord<f64>, BoxError> {
        let (x, y) = (self.0)(x, y).map_err(Into::into)?;
        Ok(Coord { x, y })
    }
}

impl<T: GridToWorld + ?Sized> GridToWorld for &mut T {
    fn grid_to_world(&mut self, x: f64, y: f64) -> std::result::Result<Coord<f64>, BoxError> {
        (**self).grid_to_world(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;

    #[test]
    fn test_apply_north_up() {
        let gt: GeoTransform = [100.0, 10.0, 0.0, 500.0, 0.0, -10.0];
        assert_eq!(gt.apply(0.0, 0.0), (100.0, 500.0));
        assert_eq!(gt.apply(2.0, 3.0), (120.0, 470.0));
    }

    #[test]
    fn test_invert_round_trip_with_rotation() {
        let gt: GeoTransform = [10.0, 2.0, 0.5, -4.0, 0.25, -3.0];
        let inv = gt.invert().unwrap();
        let (x, y) = gt.apply(7.0, 11.0);
        let (p, l) = inv.apply(x, y);
        assert_near!(p, 7.0, epsilon = 1e-9);
        assert_near!(l, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invert_degenerate() {
        let gt: GeoTransform = [0.0, 1.0, 2.0, 0.0, 2.0, 4.0];
        assert!(matches!(
            gt.invert(),
            Err(VectorizeError::BadArgument(_))
        ));
    }

    #[test]
    fn test_grid_to_world_through_mut_ref() {
        fn corner<T: GridToWorld>(mut transform: T) -> Coord<f64> {
            transform.grid_to_world(4.0, 8.0).unwrap()
        }
        let mut gt: GeoTransform = [-180.0, 0.25, 0.0, 90.0, 0.0, -0.25];
        let coord = corner(&mut gt);
        assert_near!(Coord, coord, Coord { x: -179.0, y: 88.0 }, epsilon = 1e-12);
        assert_eq!(corner(Identity), Coord { x: 4.0, y: 8.0 });
    }

    #[test]
    fn test_fn_transform_propagates_error() {
        let mut failing = FnTransform(|_x: f64, _y: f64| -> std::result::Result<(f64, f64), BoxError> {
            Err("outside projection domain".into())
        });
        let err = failing.grid_to_world(0.0, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "outside projection domain");
    }
}
