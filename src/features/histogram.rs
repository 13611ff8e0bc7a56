use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LeafError, Result};
use crate::features::hsv::{rgb_to_hsv, HUE_RANGE, SV_RANGE};

/// Bin counts for the hue, saturation and value axes.
///
/// Always holds `1..=range` bins per axis; deserialization goes through
/// [`HistogramConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHistogramConfig")]
pub struct HistogramConfig {
    bins: [usize; 3],
}

#[derive(Deserialize)]
struct RawHistogramConfig {
    bins: [usize; 3],
}

impl TryFrom<RawHistogramConfig> for HistogramConfig {
    type Error = LeafError;

    fn try_from(raw: RawHistogramConfig) -> Result<Self> {
        HistogramConfig::new(raw.bins)
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        HistogramConfig { bins: [8, 8, 8] }
    }
}

impl HistogramConfig {
    pub fn new(bins: [usize; 3]) -> Result<Self> {
        let ranges = [HUE_RANGE, SV_RANGE, SV_RANGE];
        for (axis, (&n, &range)) in bins.iter().zip(ranges.iter()).enumerate() {
            if n == 0 || n > range {
                return Err(LeafError::InvalidConfig { reason: format!(
                    "histogram axis {} needs 1..={} bins, got {}",
                    axis, range, n
                ) });
            }
        }
        Ok(HistogramConfig { bins })
    }

    pub fn bins(&self) -> [usize; 3] {
        self.bins
    }

    /// Length of every feature vector produced with this configuration.
    pub fn feature_len(&self) -> usize {
        self.bins.iter().product()
    }
}

/// Maps decoded images to L2-normalized HSV color histograms.
///
/// The histogram is flattened hue-outermost, value-innermost:
/// `index = (h * bins[1] + s) * bins[2] + v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramExtractor {
    config: HistogramConfig,
}

impl HistogramExtractor {
    pub fn new(config: HistogramConfig) -> Self {
        HistogramExtractor { config }
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    pub fn feature_len(&self) -> usize {
        self.config.feature_len()
    }

    pub fn extract(&self, image: &RgbImage) -> Result<Vec<f64>> {
        self.extract_pixels(image.width(), image.height(), 3, image.as_raw())
    }

    /// Extracts features from a raw interleaved pixel buffer.
    ///
    /// Fails with `InvalidImage` on zero-size images, channel counts other
    /// than 3, or a buffer whose length does not match the dimensions.
    pub fn extract_pixels(&self, width: u32, height: u32, channels: usize, pixels: &[u8]) -> Result<Vec<f64>> {
        if width == 0 || height == 0 {
            return Err(LeafError::invalid_image(format!("image is {}x{}", width, height)));
        }
        if channels != 3 {
            return Err(LeafError::invalid_image(format!("expected 3 channels, got {}", channels)));
        }
        let expected = width as usize * height as usize * channels;
        if pixels.len() != expected {
            return Err(LeafError::invalid_image(format!(
                "{}x{} image needs {} bytes, buffer has {}",
                width, height, expected, pixels.len()
            )));
        }

        let [bh, bs, bv] = self.config.bins;
        let mut hist = vec![0.0f64; self.feature_len()];
        for px in pixels.chunks_exact(3) {
            let [h, s, v] = rgb_to_hsv([px[0], px[1], px[2]]);
            let hi = bin_of(h, bh, HUE_RANGE);
            let si = bin_of(s, bs, SV_RANGE);
            let vi = bin_of(v, bv, SV_RANGE);
            hist[(hi * bs + si) * bv + vi] += 1.0;
        }

        l2_normalize(&mut hist);
        debug!(width, height, len = hist.len(), "extracted color histogram");
        Ok(hist)
    }
}

fn bin_of(value: u8, bins: usize, range: usize) -> usize {
    (value as usize * bins / range).min(bins - 1)
}

/// Scales `v` to unit Euclidean norm; an all-zero vector is left unchanged.
fn l2_normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    #[test]
    fn solid_color_fills_exactly_one_bin() {
        let img = RgbImage::from_pixel(12, 7, Rgb([200, 30, 30]));
        let features = HistogramExtractor::default().extract(&img).unwrap();

        assert_eq!(features.len(), 512);
        let nonzero: Vec<usize> = (0..features.len()).filter(|&i| features[i] != 0.0).collect();
        assert_eq!(nonzero.len(), 1);
        assert!((features[nonzero[0]] - 1.0).abs() < 1e-12);

        // hsv = (0, 217, 200) → bins (0, 6, 6)
        assert_eq!(nonzero[0], 6 * 8 + 6);
    }

    #[test]
    fn two_colors_split_mass_evenly() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        let f = HistogramExtractor::default().extract(&img).unwrap();
        let expected = 1.0 / 2f64.sqrt();
        assert!((f[0] - expected).abs() < 1e-12);
        assert!((f[7] - expected).abs() < 1e-12);
        assert!((f.iter().map(|x| x * x).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_size_image_is_rejected() {
        let img = RgbImage::new(0, 10);
        assert!(matches!(
            HistogramExtractor::default().extract(&img),
            Err(LeafError::InvalidImage { .. })
        ));
    }

    #[test]
    fn wrong_channel_count_and_short_buffer_are_rejected() {
        let ex = HistogramExtractor::default();
        assert!(matches!(ex.extract_pixels(2, 2, 4, &[0; 16]), Err(LeafError::InvalidImage { .. })));
        assert!(matches!(ex.extract_pixels(2, 2, 3, &[0; 11]), Err(LeafError::InvalidImage { .. })));
    }

    #[test]
    fn custom_bins_change_length() {
        let ex = HistogramExtractor::new(HistogramConfig::new([4, 2, 3]).unwrap());
        let img = RgbImage::from_pixel(3, 3, Rgb([10, 200, 90]));
        assert_eq!(ex.extract(&img).unwrap().len(), 24);
        assert!(HistogramConfig::new([181, 8, 8]).is_err());
        assert!(HistogramConfig::new([8, 0, 8]).is_err());
    }

    #[test]
    fn deserialized_config_is_range_checked() {
        let ok: HistogramConfig = serde_json::from_str(r#"{"bins":[4,2,3]}"#).unwrap();
        assert_eq!(ok.bins(), [4, 2, 3]);
        assert!(serde_json::from_str::<HistogramConfig>(r#"{"bins":[0,8,8]}"#).is_err());
        assert!(serde_json::from_str::<HistogramConfig>(r#"{"bins":[8,8,257]}"#).is_err());

        let round_trip = serde_json::to_string(&HistogramConfig::default()).unwrap();
        assert_eq!(serde_json::from_str::<HistogramConfig>(&round_trip).unwrap(), HistogramConfig::default());
    }

    proptest! {
        #[test]
        fn deterministic_and_fixed_length(
            w in 1u32..9,
            h in 1u32..9,
            seed in proptest::collection::vec(any::<u8>(), 3..=3 * 64),
        ) {
            let len = (w * h * 3) as usize;
            let pixels: Vec<u8> = seed.iter().cycle().take(len).cloned().collect();
            let ex = HistogramExtractor::default();

            let a = ex.extract_pixels(w, h, 3, &pixels).unwrap();
            let b = ex.extract_pixels(w, h, 3, &pixels).unwrap();
            prop_assert_eq!(a.len(), 512);
            prop_assert!(a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));
            prop_assert!(a.iter().all(|x| x.is_finite() && *x >= 0.0));
        }
    }
}
