use crate::errors::{BoxError, Result, VectorizeError};
use crate::raster::{RasterSource, Sample};

#[cfg(feature = "ndarray")]
use ndarray::Array2;

/// A 2-D array backed by it's `size` (cols, rows) and a row-major `Vec<T>` and it's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T> {
    pub size: (usize, usize),
    pub data: Vec<T>,
    no_data: Option<f64>,
}

impl<T: Sample> Buffer<T> {
    /// Construct a new buffer from `size` (`(cols, rows)`) and `Vec<T>`.
    ///
    /// # Panic
    /// Will panic if `size.0 * size.1 != data.len()`.
    pub fn new(size: (usize, usize), data: Vec<T>) -> Self {
        assert_eq!(
            size.0 * size.1,
            data.len(),
            "size {:?} does not match length {}",
            size,
            data.len()
        );
        Buffer {
            size,
            data,
            no_data: None,
        }
    }

    /// Fallible counterpart of [`Buffer::new`].
    pub fn try_new(size: (usize, usize), data: Vec<T>) -> Result<Self> {
        if size.0 * size.1 != data.len() {
            return Err(VectorizeError::BadArgument(format!(
                "size {:?} does not match length {}",
                size,
                data.len()
            )));
        }
        Ok(Self::new(size, data))
    }

    /// Declare the sample value that marks missing data in this buffer.
    pub fn with_no_data_value(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    /// Samples of row `row`, left to right.
    pub fn row(&self, row: usize) -> &[T] {
        let cols = self.size.0;
        &self.data[row * cols..(row + 1) * cols]
    }

    #[cfg(feature = "ndarray")]
    /// Convert `self` into an [`ndarray::Array2`].
    pub fn to_array(self) -> Result<Array2<T>> {
        // Array2 shape is (rows, cols) and Buffer shape is (cols in x-axis, rows in y-axis)
        Ok(Array2::from_shape_vec(
            (self.size.1, self.size.0),
            self.data,
        )?)
    }
}

impl<T: Sample> RasterSource for Buffer<T> {
    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn no_data_value(&self) -> Option<f64> {
        self.no_data
    }

    fn read_row(&mut self, row: usize, samples: &mut [f64]) -> std::result::Result<(), BoxError> {
        if row >= self.size.1 {
            return Err(format!("row {row} is outside a raster of {} rows", self.size.1).into());
        }
        for (out, value) in samples.iter_mut().zip(self.row(row)) {
            *out = value.to_f64();
        }
        Ok(())
    }
}

#[cfg(feature = "ndarray")]
impl<T: Sample> TryFrom<Buffer<T>> for Array2<T> {
    type Error = VectorizeError;

    fn try_from(value: Buffer<T>) -> std::result::Result<Self, Self::Error> {
        value.to_array()
    }
}

#[cfg(feature = "ndarray")]
impl<T: Sample> From<Array2<T>> for Buffer<T> {
    fn from(value: Array2<T>) -> Self {
        // Array2 shape is (rows, cols) and Buffer shape is (cols in x-axis, rows in y-axis)
        let shape = value.shape();
        let (rows, cols) = (shape[0], shape[1]);
        let data = value
            .as_standard_layout()
            .iter()
            .copied()
            .collect::<Vec<T>>();
        Buffer::new((cols, rows), data)
    }
}
