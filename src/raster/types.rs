/// Type-level constraint for limiting which primitive numeric values can be
/// stored in a raster band and fed to the classifier.
///
/// Every sample is widened to `f64` before classification, so integer bands
/// and floating point bands share a single class table.
pub trait Sample: Copy {
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::Sample;

    #[test]
    fn test_widening() {
        assert_eq!(200u8.to_f64(), 200.0);
        assert_eq!((-3i16).to_f64(), -3.0);
        assert!(f32::NAN.to_f64().is_nan());
        assert_eq!(1.5f32.to_f64(), 1.5);
    }
}
