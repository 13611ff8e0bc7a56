//! Command-line front end for the leaf classifier.
//!
//! ```text
//! ferrite-leaf scaffold --out artifacts
//! ferrite-leaf --artifacts artifacts predict leaf1.jpg leaf2.png
//! ferrite-leaf --artifacts artifacts report
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use ferrite_leaf::model::scaffold::{write_demo_artifacts, ScaffoldOptions};
use ferrite_leaf::utils::init_tracing;
use ferrite_leaf::{
    decode_image, ArtifactNames, DirectoryStore, EvaluationReport, EvaluationReporter,
    HistogramConfig, HistogramExtractor, InferenceService, LeafError, ModelRepository,
};

#[derive(Parser)]
#[command(name = "ferrite-leaf")]
#[command(about = "Tomato leaf disease classification from color histograms")]
struct Cli {
    /// Directory holding model.json, label_encoder.json, x_test.json and y_test.json
    #[arg(long, env = "FERRITE_LEAF_ARTIFACTS", default_value = "artifacts", global = true)]
    artifacts: PathBuf,

    /// Histogram bins for hue, saturation and value
    #[arg(long, value_delimiter = ',', default_value = "8,8,8", global = true)]
    bins: Vec<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the disease class of one or more images
    Predict {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Show per-class performance on the held-out test set
    Report {
        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write an untrained demo artifact set
    Scaffold {
        #[arg(long, default_value = "artifacts")]
        out: PathBuf,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 32)]
        hidden: usize,
        #[arg(long, default_value_t = 5)]
        samples_per_class: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let bins: [usize; 3] = cli.bins.as_slice().try_into().map_err(|_| LeafError::InvalidConfig {
        reason: format!("--bins takes three values, got {}", cli.bins.len()),
    })?;
    let extractor = HistogramExtractor::new(HistogramConfig::new(bins)?);

    match cli.command {
        Command::Scaffold { out, seed, hidden, samples_per_class } => {
            let options = ScaffoldOptions { seed, hidden, samples_per_class, ..Default::default() };
            write_demo_artifacts(&out, &ArtifactNames::default(), &extractor, &options)?;
            println!("Wrote demo artifacts to {}", out.display());
        }
        Command::Predict { images } => {
            let repository = ModelRepository::new(DirectoryStore::new(&cli.artifacts), *extractor.config());
            let artifacts = repository.load()?;
            let service = InferenceService::from_artifacts(&artifacts);

            let mut failures = 0;
            for path in &images {
                let result = std::fs::read(path)
                    .map_err(LeafError::from)
                    .and_then(|bytes| decode_image(&bytes))
                    .and_then(|img| service.predict_image(&extractor, &img));
                match result {
                    Ok(label) => println!("{}: {}", path.display(), label),
                    Err(e) => {
                        error!(path = %path.display(), "prediction failed: {}", e);
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{} of {} images failed", failures, images.len()).into());
            }
        }
        Command::Report { json } => {
            let repository = ModelRepository::new(DirectoryStore::new(&cli.artifacts), *extractor.config());
            let artifacts = repository.load()?;
            let test_set = repository.load_test_set()?;
            let reporter = EvaluationReporter::from_artifacts(&artifacts);

            if json {
                let full = reporter.classification_report(&test_set)?;
                println!("{}", serde_json::to_string_pretty(&full)?);
            } else {
                let report = reporter.report(&test_set)?;
                print_report(&report);
            }
            info!(rows = test_set.len(), "report finished");
        }
    }
    Ok(())
}

fn print_report(report: &EvaluationReport) {
    let width = report.rows.iter().map(|r| r.label.len()).max().unwrap_or(5).max(5);
    println!("{:<width$}  {:>9}  {:>6}  {:>8}  {:>7}", "Class", "Precision", "Recall", "F1-Score", "Support", width = width);
    for row in &report.rows {
        println!(
            "{:<width$}  {:>9.2}  {:>6.2}  {:>8.2}  {:>7}",
            row.label, row.precision, row.recall, row.f1, row.support,
            width = width
        );
    }
    if report.rows.is_empty() {
        println!("(no class has a nonzero F1-score)");
    }
    println!();
    println!("Accuracy: {:.2}%", report.accuracy * 100.0);
}
