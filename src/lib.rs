//! Raster boundary vectorization for Rust.
//!
//! Turns a classified raster band into closed rectilinear rings: one list of
//! rings per value class, describing the 4-connected regions each class
//! occupies. The raster is read one row at a time and rings are emitted as
//! soon as they close, so memory use grows with the raster width and the size
//! of the output, not with the raster height.
//!
//! ## Use
//!
//! ```
//! # fn main() -> polygonize::errors::Result<()> {
//! use polygonize::{vectorize, Buffer, ClassId, ClassTable, GeoTransform, VectorizeOptions};
//!
//! // Elevations of a tiny 4x3 grid.
//! let dem = Buffer::new(
//!     (4, 3),
//!     vec![
//!         12.0f32, 14.0, 31.0, 35.0,
//!         11.0, 25.0, 33.0, 38.0,
//!         10.0, 12.0, 15.0, 36.0,
//!     ],
//! );
//! let classes = ClassTable::from_breaks(&[0.0, 20.0, 40.0])?;
//! let geo_transform: GeoTransform = [440720.0, 60.0, 0.0, 3751320.0, 0.0, -60.0];
//!
//! let rings = vectorize(dem, &classes, geo_transform, &VectorizeOptions::new())?;
//! for (class, class_rings) in rings.iter() {
//!     for ring in class_rings {
//!         println!("{class}: {:?} ring of {} pixels", ring.kind(), ring.grid_area());
//!     }
//! }
//! assert_eq!(rings.get(ClassId(0)).len(), 1);
//! assert_eq!(rings.get(ClassId(1)).len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinates
//!
//! Rings are traced on pixel corners: `(0, 0)` is the top-left corner of the
//! top-left pixel and `(width, height)` the bottom-right corner of the
//! raster. Each vertex is passed through a [`GridToWorld`] transform, such as
//! a [`GeoTransform`], before it is stored.
//!
//! ## Holes
//!
//! Every ring is independent: a region with holes yields its outer ring and
//! one [`RingKind::Inner`] ring per hole, all listed under the region's class.
//! No-data regions are traced like any other class and returned only when
//! asked for with [`VectorizeOptions::with_no_data_rings`].

#![crate_name = "polygonize"]
#![crate_type = "lib"]

pub mod errors;
pub mod raster;

mod classify;
mod geo_transform;
mod options;
mod vectorize;

pub use classify::{Class, ClassId, ClassTable, ValueRange};
pub use geo_transform::{FnTransform, GeoTransform, GeoTransformEx, GridToWorld, Identity};
pub use options::VectorizeOptions;
pub use raster::{Buffer, RasterSource, Sample};
pub use vectorize::{vectorize, vectorize_with_progress, Ring, RingKind, Vectorized};

#[cfg(test)]
pub(crate) mod test_utils;
