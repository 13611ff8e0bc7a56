use serde::{Deserialize, Serialize};

/// Optional annotations attached to a saved Network.
/// All fields are Option<> so models without metadata deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Histogram bins (hue, saturation, value) the network was fit against.
    /// Checked against the extractor configuration at load time.
    pub histogram_bins: Option<[usize; 3]>,
}
