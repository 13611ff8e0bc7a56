//! Writes a self-consistent, untrained artifact set.
//!
//! The network is randomly initialized (nothing is fit), the encoder holds
//! the ten tomato leaf classes, and the test set is built from synthetic
//! noise images run through the real extractor. Useful for exercising the
//! CLI and studio end to end without a trained model.

use std::path::Path;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::activation::activation::ActivationFunction;
use crate::error::{LeafError, Result};
use crate::features::HistogramExtractor;
use crate::model::encoder::LabelEncoder;
use crate::model::repository::{ArtifactNames, TestSet};
use crate::network::{LayerSpec, ModelMetadata, Network};

/// The PlantVillage tomato classes, in encoder order.
pub const TOMATO_CLASSES: [&str; 10] = [
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub seed: u64,
    pub hidden: usize,
    pub samples_per_class: usize,
    /// Side length of the synthetic test images.
    pub image_size: u32,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        ScaffoldOptions { seed: 42, hidden: 32, samples_per_class: 5, image_size: 16 }
    }
}

/// Writes model, encoder and test set files into `dir` (created if needed).
pub fn write_demo_artifacts(
    dir: &Path,
    names: &ArtifactNames,
    extractor: &HistogramExtractor,
    options: &ScaffoldOptions,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    let classes = TOMATO_CLASSES.len();
    let features = extractor.feature_len();
    let network = Network::new(
        &[
            LayerSpec::new(options.hidden, features, ActivationFunction::ReLU),
            LayerSpec::new(classes, options.hidden, ActivationFunction::Softmax),
        ],
        &mut rng,
    )
    .with_metadata(ModelMetadata {
        description: Some("untrained demo network".into()),
        histogram_bins: Some(extractor.config().bins()),
    });
    network.save_json(dir.join(&names.model))?;

    let encoder = LabelEncoder::new(TOMATO_CLASSES.iter().map(|s| s.to_string()).collect())
        .map_err(|reason| LeafError::InvalidConfig { reason })?;
    write_json(&dir.join(&names.encoder), &encoder)?;

    let mut test_set = TestSet::default();
    for class in 0..classes {
        for _ in 0..options.samples_per_class {
            let img = noise_image(&mut rng, options.image_size);
            test_set.features.push(extractor.extract(&img)?);
            test_set.labels.push(class);
        }
    }
    write_json(&dir.join(&names.test_features), &test_set.features)?;
    write_json(&dir.join(&names.test_labels), &test_set.labels)?;

    info!(dir = %dir.display(), classes, rows = test_set.len(), "wrote demo artifacts");
    Ok(())
}

/// Greenish noise: each image gets a random base color, each pixel jitters
/// around it.
fn noise_image<R: Rng>(rng: &mut R, size: u32) -> RgbImage {
    let base: [i32; 3] = [rng.gen_range(20..120), rng.gen_range(80..220), rng.gen_range(10..90)];
    RgbImage::from_fn(size.max(1), size.max(1), |_, _| {
        let mut px = [0u8; 3];
        for (c, b) in px.iter_mut().zip(base.iter()) {
            *c = (*b + rng.gen_range(-20..=20)).clamp(0, 255) as u8;
        }
        Rgb(px)
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::repository::{DirectoryStore, ModelRepository};

    #[test]
    fn scaffold_loads_back_through_repository() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = HistogramExtractor::default();
        let options = ScaffoldOptions { samples_per_class: 2, hidden: 4, ..Default::default() };
        write_demo_artifacts(dir.path(), &ArtifactNames::default(), &extractor, &options).unwrap();

        let repo = ModelRepository::new(DirectoryStore::new(dir.path()), *extractor.config());
        let artifacts = repo.load().unwrap();
        assert_eq!(artifacts.encoder.len(), 10);
        assert_eq!(repo.load_test_set().unwrap().len(), 20);
    }

    #[test]
    fn same_seed_same_artifacts() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let ex = HistogramExtractor::default();
        let opts = ScaffoldOptions { samples_per_class: 1, hidden: 3, ..Default::default() };
        write_demo_artifacts(a.path(), &ArtifactNames::default(), &ex, &opts).unwrap();
        write_demo_artifacts(b.path(), &ArtifactNames::default(), &ex, &opts).unwrap();

        for name in ["model.json", "x_test.json"] {
            assert_eq!(
                std::fs::read(a.path().join(name)).unwrap(),
                std::fs::read(b.path().join(name)).unwrap()
            );
        }
    }
}
