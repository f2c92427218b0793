//! Streaming raster-to-ring vectorization.
//!
//! [`vectorize`] reads a [`RasterSource`] one row at a time, classifies each
//! sample against a [`ClassTable`], and traces the outline of every
//! 4-connected region of equal class. Rings are transformed to world
//! coordinates as soon as they close, so only the current frontier and the
//! finished output are ever held in memory.

use std::collections::BTreeMap;

use geo_types::{Coord, LineString};
use log::{debug, trace};

use crate::classify::{Class, ClassId, ClassTable};
use crate::errors::{Result, VectorizeError};
use crate::geo_transform::GridToWorld;
use crate::options::VectorizeOptions;
use crate::raster::RasterSource;

mod boundary;
mod frontier;
mod reconcile;
mod runs;

use boundary::ClosedRing;
use reconcile::Tracer;

/// Orientation of a ring, taken in grid space before transformation.
///
/// Rings are walked with their region on the right-hand side: outer rings run
/// clockwise on screen (y growing downwards), rings around an enclosed hole
/// run the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    Outer,
    Inner,
}

/// One closed ring of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    class: Class,
    kind: RingKind,
    grid_area: f64,
    line: LineString<f64>,
}

impl Ring {
    pub fn class(&self) -> Class {
        self.class
    }

    pub fn kind(&self) -> RingKind {
        self.kind
    }

    /// Signed shoelace area in pixels, negative for [`RingKind::Inner`].
    pub fn grid_area(&self) -> f64 {
        self.grid_area
    }

    /// The ring's vertices in world coordinates; the first vertex is repeated at the end.
    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    pub fn into_line(self) -> LineString<f64> {
        self.line
    }
}

/// The rings of every class, in the order they closed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vectorized {
    classes: BTreeMap<ClassId, Vec<Ring>>,
    no_data: Option<Vec<Ring>>,
}

impl Vectorized {
    fn new(classes: &ClassTable, no_data_rings: bool) -> Self {
        Vectorized {
            classes: classes.ids().map(|id| (id, Vec::new())).collect(),
            no_data: no_data_rings.then(Vec::new),
        }
    }

    /// Rings of class `id`; empty for classes absent from the raster or the table.
    pub fn get(&self, id: ClassId) -> &[Ring] {
        self.classes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rings around no-data regions, when requested with
    /// [`VectorizeOptions::with_no_data_rings`].
    pub fn no_data(&self) -> Option<&[Ring]> {
        self.no_data.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &[Ring])> {
        self.classes.iter().map(|(id, rings)| (*id, rings.as_slice()))
    }

    /// Total number of class rings, not counting no-data rings.
    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> BTreeMap<ClassId, Vec<Ring>> {
        self.classes
    }

    fn collect<T, I>(&mut self, closed: I, transform: &mut T) -> Result<()>
    where
        T: GridToWorld,
        I: IntoIterator<Item = ClosedRing>,
    {
        for ring in closed {
            let target = match ring.class {
                Class::Range(id) => self.classes.get_mut(&id),
                Class::NoData => self.no_data.as_mut(),
            };
            if let Some(target) = target {
                target.push(to_world(ring, transform)?);
            }
        }
        Ok(())
    }
}

fn to_world<T: GridToWorld>(ring: ClosedRing, transform: &mut T) -> Result<Ring> {
    let doubled = ring.doubled_area();
    let kind = if doubled < 0 {
        RingKind::Inner
    } else {
        RingKind::Outer
    };

    let (closing, open) = match ring.corners.split_last() {
        Some(split) => split,
        None => return Err(VectorizeError::EmptyBoundary { row: 0, column: 0 }),
    };
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.corners.len());
    for corner in open {
        let (x, y) = (corner.x as f64, corner.y as f64);
        let coord = transform
            .grid_to_world(x, y)
            .map_err(|source| VectorizeError::Transform { x, y, source })?;
        coords.push(coord);
    }
    let first = match coords.first() {
        Some(&first) if open.first() == Some(closing) => first,
        _ => {
            return Err(VectorizeError::EmptyBoundary {
                row: closing.y,
                column: closing.x,
            })
        }
    };
    coords.push(first);

    Ok(Ring {
        class: ring.class,
        kind,
        grid_area: doubled as f64 / 2.0,
        line: LineString::new(coords),
    })
}

/// Trace the class boundaries of a raster.
///
/// Every caller class gets an entry in the result, empty if the class never
/// occurs. The call is all-or-nothing: a failed row read, a sample outside
/// every class range, or a failed transform aborts it without partial output.
///
/// ```rust
/// # fn main() -> polygonize::errors::Result<()> {
/// use polygonize::{vectorize, Buffer, ClassId, ClassTable, Identity, ValueRange, VectorizeOptions};
///
/// let raster = Buffer::new((3, 2), vec![1u8, 1, 2, 1, 1, 1]);
/// let classes = ClassTable::new(vec![ValueRange::exact(1.0), ValueRange::exact(2.0)]);
/// let rings = vectorize(raster, &classes, Identity, &VectorizeOptions::new())?;
///
/// assert_eq!(rings.get(ClassId(0)).len(), 1);
/// assert_eq!(rings.get(ClassId(1))[0].grid_area(), 1.0);
/// # Ok(())
/// # }
/// ```
pub fn vectorize<S, T>(
    source: S,
    classes: &ClassTable,
    transform: T,
    options: &VectorizeOptions,
) -> Result<Vectorized>
where
    S: RasterSource,
    T: GridToWorld,
{
    vectorize_with_progress(source, classes, transform, options, |_| true)
}

/// Like [`vectorize`], reporting progress after every row.
///
/// `progress` receives the fraction of rows done, in `(0, 1]`. Returning
/// `false` stops before the next row is read, with
/// [`VectorizeError::Cancelled`]. Once the last row has been read there is
/// nothing left to stop, so the final report cannot cancel.
pub fn vectorize_with_progress<S, T, P>(
    mut source: S,
    classes: &ClassTable,
    mut transform: T,
    options: &VectorizeOptions,
    mut progress: P,
) -> Result<Vectorized>
where
    S: RasterSource,
    T: GridToWorld,
    P: FnMut(f64) -> bool,
{
    if options.class_validation() {
        classes.validate()?;
    }
    let (width, height) = source.size();
    let no_data = source.no_data_value();
    debug!(
        "Vectorizing {width}x{height} raster into {} classes (no-data value {no_data:?})",
        classes.len()
    );

    let mut output = Vectorized::new(classes, options.no_data_rings());
    let mut tracer = Tracer::new(width);
    let mut samples = vec![0.0; width];
    let mut row_classes = Vec::with_capacity(width);

    for row in 0..height {
        source
            .read_row(row, &mut samples)
            .map_err(|source| VectorizeError::SourceRead { row, source })?;

        row_classes.clear();
        for &sample in &samples {
            let sample = match no_data {
                Some(value) if sample == value => f64::NAN,
                _ => sample,
            };
            row_classes.push(classes.classify(sample)?);
        }

        tracer.push_row(&row_classes)?;
        output.collect(tracer.drain_closed(), &mut transform)?;
        trace!("Row {row} done, {} rings so far", output.len());

        if !progress((row + 1) as f64 / height as f64) && row + 1 < height {
            debug!("Vectorization cancelled after row {row}");
            return Err(VectorizeError::Cancelled { row });
        }
    }

    tracer.finish()?;
    output.collect(tracer.drain_closed(), &mut transform)?;
    debug!(
        "Vectorized {} rows into {} rings",
        tracer.rows(),
        output.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ValueRange;
    use crate::geo_transform::{GeoTransform, Identity};
    use crate::raster::Buffer;
    use crate::test_utils::{abc_classes, grid};

    fn coords(ring: &Ring) -> Vec<(f64, f64)> {
        ring.line().coords().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn test_every_class_has_an_entry() {
        let classes = abc_classes();
        let out = vectorize(grid(&["aa", "aa"]), &classes, Identity, &VectorizeOptions::new()).unwrap();
        assert_eq!(out.iter().count(), 3);
        assert_eq!(out.get(ClassId(0)).len(), 1);
        assert!(out.get(ClassId(1)).is_empty());
        assert!(out.get(ClassId(7)).is_empty());
        assert_eq!(out.no_data(), None);
    }

    #[test]
    fn test_ring_is_transformed_and_closed() {
        let gt: GeoTransform = [100.0, 2.0, 0.0, 50.0, 0.0, -2.0];
        let out = vectorize(grid(&["ab"]), &abc_classes(), gt, &VectorizeOptions::new()).unwrap();
        let b = &out.get(ClassId(1))[0];
        assert_eq!(
            coords(b),
            vec![(102.0, 50.0), (104.0, 50.0), (104.0, 48.0), (102.0, 48.0), (102.0, 50.0)]
        );
        assert_eq!(b.kind(), RingKind::Outer);
        assert_eq!(b.grid_area(), 1.0);
    }

    #[test]
    fn test_inner_ring_kind() {
        let mut options = VectorizeOptions::new();
        options.with_no_data_rings(true);
        let out = vectorize(grid(&["aaa", "a.a", "aaa"]), &abc_classes(), Identity, &options).unwrap();
        let a = out.get(ClassId(0));
        assert_eq!(a.len(), 2);
        let inner: Vec<_> = a.iter().filter(|r| r.kind() == RingKind::Inner).collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].grid_area(), -1.0);
        let holes = out.no_data().unwrap();
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].class(), Class::NoData);
        assert_eq!(holes[0].kind(), RingKind::Outer);
    }

    #[test]
    fn test_overlapping_classes_rejected() {
        let classes = ClassTable::new(vec![ValueRange::new(0.0, 2.0), ValueRange::new(1.0, 3.0)]);
        let raster = Buffer::new((1, 1), vec![0.5f64]);
        assert!(matches!(
            vectorize(raster.clone(), &classes, Identity, &VectorizeOptions::new()),
            Err(VectorizeError::BadArgument(_))
        ));

        let mut options = VectorizeOptions::new();
        options.with_class_validation(false);
        let out = vectorize(raster, &classes, Identity, &options).unwrap();
        assert_eq!(out.get(ClassId(0)).len(), 1);
    }
}
