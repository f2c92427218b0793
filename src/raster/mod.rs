//! Raster input: sample types, in-memory buffers and the row source trait.

mod buffer;
mod source;
mod types;

pub use buffer::Buffer;
pub use source::RasterSource;
pub use types::Sample;
