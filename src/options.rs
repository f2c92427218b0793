/// Configuration options for [`vectorize()`][crate::vectorize()].
///
/// ```rust
/// use polygonize::VectorizeOptions;
///
/// let mut options = VectorizeOptions::new();
/// options.with_no_data_rings(true).with_class_validation(false);
/// assert!(options.no_data_rings());
/// ```
#[derive(Debug, Clone)]
pub struct VectorizeOptions {
    no_data_rings: bool,
    class_validation: bool,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        VectorizeOptions {
            no_data_rings: false,
            class_validation: true,
        }
    }
}

impl VectorizeOptions {
    /// Create an options set with the defaults: no-data rings are dropped and
    /// the class table is validated before the first row is read.
    pub fn new() -> Self {
        Default::default()
    }

    /// Also return the rings traced around no-data regions.
    ///
    /// They are available through [`Vectorized::no_data`][crate::Vectorized::no_data].
    pub fn with_no_data_rings(&mut self, state: bool) -> &mut Self {
        self.no_data_rings = state;
        self
    }

    /// Check that the class ranges are non-empty and pairwise disjoint before
    /// vectorizing.
    ///
    /// When disabled, overlapping ranges resolve to the first matching class.
    pub fn with_class_validation(&mut self, state: bool) -> &mut Self {
        self.class_validation = state;
        self
    }

    pub fn no_data_rings(&self) -> bool {
        self.no_data_rings
    }

    pub fn class_validation(&self) -> bool {
        self.class_validation
    }
}
