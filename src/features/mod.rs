pub mod decode;
pub mod histogram;
pub mod hsv;

pub use decode::decode_image;
pub use histogram::{HistogramConfig, HistogramExtractor};
