use std::io::Cursor;
use std::sync::Arc;

use image::{ImageOutputFormat, Rgb, RgbImage};

use ferrite_leaf::model::scaffold::{write_demo_artifacts, ScaffoldOptions, TOMATO_CLASSES};
use ferrite_leaf::{
    decode_image, ArtifactNames, DirectoryStore, EvaluationReporter, HistogramExtractor,
    InferenceService, LeafError, ModelRepository,
};

fn scaffolded() -> (tempfile::TempDir, ModelRepository<DirectoryStore>, HistogramExtractor) {
    let dir = tempfile::tempdir().unwrap();
    let extractor = HistogramExtractor::default();
    write_demo_artifacts(dir.path(), &ArtifactNames::default(), &extractor, &ScaffoldOptions::default())
        .unwrap();
    let repository = ModelRepository::new(DirectoryStore::new(dir.path()), *extractor.config());
    (dir, repository, extractor)
}

fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn uploaded_png_is_classified_into_a_known_class() {
    let (_dir, repository, extractor) = scaffolded();
    let artifacts = repository.load().unwrap();

    let leaf = RgbImage::from_pixel(24, 24, Rgb([60, 140, 40]));
    let decoded = decode_image(&png_bytes(&leaf)).unwrap();
    let label = InferenceService::from_artifacts(&artifacts)
        .predict_image(&extractor, &decoded)
        .unwrap();

    assert!(TOMATO_CLASSES.contains(&label.as_str()), "unexpected label {label}");
}

#[test]
fn report_over_scaffolded_test_set() {
    let (_dir, repository, _) = scaffolded();
    let artifacts = repository.load().unwrap();
    let test_set = repository.load_test_set().unwrap();
    assert_eq!(test_set.len(), TOMATO_CLASSES.len() * ScaffoldOptions::default().samples_per_class);

    let reporter = EvaluationReporter::from_artifacts(&artifacts);
    let full = reporter.classification_report(&test_set).unwrap();
    assert_eq!(full.classes.len(), TOMATO_CLASSES.len());
    assert_eq!(full.confusion.total(), test_set.len());

    let report = reporter.report(&test_set).unwrap();
    assert!((0.0..=1.0).contains(&report.accuracy));
    assert!(report.rows.len() <= TOMATO_CLASSES.len());
    for row in &report.rows {
        assert!(row.f1 >= 0.0 && row.f1 <= 1.0);
        assert_eq!(row.f1, (row.f1 * 100.0).round() / 100.0);
    }
}

#[test]
fn repeated_loads_share_one_model() {
    let (_dir, repository, _) = scaffolded();
    let first = repository.load().unwrap();
    let second = repository.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let a = repository.load_test_set().unwrap();
    let b = repository.load_test_set().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn empty_artifact_directory_reports_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let repository = ModelRepository::new(DirectoryStore::new(dir.path()), Default::default());
    match repository.load() {
        Err(LeafError::ArtifactMissing { name }) => assert_eq!(name, "model.json"),
        other => panic!("expected a missing artifact, got {other:?}"),
    }
}
