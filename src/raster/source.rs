use crate::errors::BoxError;

#[cfg(feature = "ndarray")]
use crate::raster::Sample;

/// A single raster band that can be read one row at a time.
///
/// Rows are requested top-to-bottom, each exactly once per vectorization run.
/// Implementations may block on I/O; failures abort the run and are reported
/// as [`crate::errors::VectorizeError::SourceRead`].
pub trait RasterSource {
    /// Get dimensions of the band as `(cols, rows)`.
    fn size(&self) -> (usize, usize);

    /// Sample value that marks missing data, if the band declares one.
    ///
    /// Samples equal to this value are classified as no-data, exactly like `NaN`.
    fn no_data_value(&self) -> Option<f64> {
        None
    }

    /// Read row `row` into `samples`, whose length equals the band width.
    fn read_row(&mut self, row: usize, samples: &mut [f64]) -> Result<(), BoxError>;
}

impl<R: RasterSource + ?Sized> RasterSource for &mut R {
    fn size(&self) -> (usize, usize) {
        (**self).size()
    }

    fn no_data_value(&self) -> Option<f64> {
        (**self).no_data_value()
    }

    fn read_row(&mut self, row: usize, samples: &mut [f64]) -> Result<(), BoxError> {
        (**self).read_row(row, samples)
    }
}

#[cfg(feature = "ndarray")]
/// The matrix shape is (rows, cols) and raster shape is (cols in x-axis, rows in y-axis).
impl<S, T> RasterSource for ndarray::ArrayBase<S, ndarray::Ix2>
where
    S: ndarray::Data<Elem = T>,
    T: Sample,
{
    fn size(&self) -> (usize, usize) {
        let (rows, cols) = self.dim();
        (cols, rows)
    }

    fn read_row(&mut self, row: usize, samples: &mut [f64]) -> Result<(), BoxError> {
        let rows = self.nrows();
        if row >= rows {
            return Err(format!("row {row} is outside an array of {rows} rows").into());
        }
        for (out, value) in samples.iter_mut().zip(self.row(row).iter()) {
            *out = value.to_f64();
        }
        Ok(())
    }
}

#[cfg(feature = "ndarray")]
#[cfg(test)]
mod tests {
    use super::RasterSource;
    use ndarray::arr2;

    #[test]
    fn test_array_rows() {
        let mut a = arr2(&[[1u8, 2, 3], [4, 5, 6]]);
        assert_eq!(a.size(), (3, 2));
        let mut row = vec![0.0; 3];
        a.read_row(1, &mut row).unwrap();
        assert_eq!(row, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_array_view_rows() {
        let a = arr2(&[[1.5f32, f32::NAN]]);
        let mut view = a.view();
        let mut row = vec![0.0; 2];
        view.read_row(0, &mut row).unwrap();
        assert_eq!(row[0], 1.5);
        assert!(row[1].is_nan());
    }
}
