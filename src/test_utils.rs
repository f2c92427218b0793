use crate::classify::{ClassTable, ValueRange};
use crate::raster::Buffer;

/// Build a raster from rows of characters: `a`, `b` and `c` become `0.0`,
/// `1.0` and `2.0`, `.` becomes `NaN`.
pub fn grid(rows: &[&str]) -> Buffer<f64> {
    let width = rows.first().map_or(0, |r| r.len());
    let data: Vec<f64> = rows
        .iter()
        .flat_map(|row| {
            assert_eq!(row.len(), width, "ragged grid row {row:?}");
            row.chars().map(|c| match c {
                'a' => 0.0,
                'b' => 1.0,
                'c' => 2.0,
                '.' => f64::NAN,
                other => panic!("unknown grid cell {other:?}"),
            })
        })
        .collect();
    Buffer::new((width, rows.len()), data)
}

/// Classes matching the cells of [`grid`]: `a` is class 0, `b` class 1, `c` class 2.
pub fn abc_classes() -> ClassTable {
    ClassTable::new(vec![
        ValueRange::exact(0.0),
        ValueRange::exact(1.0),
        ValueRange::exact(2.0),
    ])
}

/// Assert that two floats are within `epsilon` of each other.
///
/// # Examples
/// ```rust, ignore
/// use std::f64::consts::{PI, E};
/// assert_near!(PI / E, 1.1557273497909217);
/// // with specified epsilon
/// assert_near!(PI / E, 1.15572734, epsilon = 1e-8);
/// ```
#[macro_export]
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        $crate::assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    ($left:expr, $right:expr, epsilon = $ep:expr, field = $field:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "field {}: |{} - {}| = {} is greater than epsilon {:.4e}",
            $field,
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    // Both coordinates of a `geo_types::Coord`.
    (Coord, $left:expr, $right:expr, epsilon = $ep:expr) => {
        $crate::assert_near!($left.x, $right.x, epsilon = $ep, field = "x");
        $crate::assert_near!($left.y, $right.y, epsilon = $ep, field = "y");
    };
}
