pub mod metrics;
pub mod report;

pub use metrics::{AverageMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use report::{EvaluationReport, EvaluationReporter, EvaluationRow};
