use std::io::Cursor;
use tiny_http::Response;
use tracing::warn;

use ferrite_leaf::evaluation::ConfusionMatrix;
use ferrite_leaf::{ClassificationReport, EvaluationReport, EvaluationReporter, LeafError};

use crate::render::{error_card, html_escape, render_flash_html, render_page, Page};
use crate::state::StudioState;

// ---------------------------------------------------------------------------
// GET /performance
// ---------------------------------------------------------------------------

pub fn handle_get(state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    let flash  = render_flash_html(state.take_flash().as_ref());
    let report = build_report_html(state);

    crate::routes::html_response(render_page(Page::Performance, &flash, |tmpl| {
        tmpl.replace("{{REPORT_SECTION}}", &report)
    }))
}

// ---------------------------------------------------------------------------
// GET /performance/export
// ---------------------------------------------------------------------------

pub fn handle_export(state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    match compute(state) {
        Ok(full) => {
            let json = serde_json::to_string_pretty(&full).unwrap_or_else(|_| "{}".into());
            crate::routes::json_download_response(json, "classification_report.json")
        }
        Err(e) => {
            warn!("report export failed: {}", e);
            crate::routes::html_response(render_page(Page::Performance, "", |tmpl| {
                tmpl.replace("{{REPORT_SECTION}}", &error_card(&e.to_string()))
            }))
        }
    }
}

fn compute(state: &StudioState) -> Result<ClassificationReport, LeafError> {
    let artifacts = state.repository.load()?;
    let test_set  = state.repository.load_test_set()?;
    EvaluationReporter::from_artifacts(&artifacts).classification_report(&test_set)
}

// ---------------------------------------------------------------------------
// Report HTML (shared with the classify page)
// ---------------------------------------------------------------------------

/// Filtered metrics table, accuracy and confusion matrix, or an error card.
pub fn build_report_html(state: &StudioState) -> String {
    let full = match compute(state) {
        Ok(r)  => r,
        Err(e) => {
            warn!("performance report failed: {}", e);
            return error_card(&e.to_string());
        }
    };
    let report = EvaluationReport::from(&full);

    let rows: String = report.rows.iter().map(|r| {
        format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            html_escape(&r.label), r.precision, r.recall, r.f1, r.support
        )
    }).collect();
    let body = if rows.is_empty() {
        r#"<tr><td colspan="5" class="hint">No class has a nonzero F1-score.</td></tr>"#.to_owned()
    } else {
        rows
    };

    let labels: Vec<String> = full.classes.iter().map(|c| c.label.clone()).collect();

    format!(
        r#"<div class="card"><h2>Filtered Class-wise Performance Metrics</h2>
<table class="summary-table">
  <thead><tr><th>Class</th><th>Precision</th><th>Recall</th><th>F1-Score</th><th>Support</th></tr></thead>
  <tbody>{body}</tbody>
</table>
<p class="mt"><strong>Accuracy:</strong> {acc:.2}% &nbsp;·&nbsp; <a href="/performance/export">Download full report (JSON)</a></p>
</div>
{confusion}"#,
        body = body,
        acc = report.accuracy * 100.0,
        confusion = build_confusion_matrix_html(&full.confusion, &labels),
    )
}

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

fn build_confusion_matrix_html(matrix: &ConfusionMatrix, labels: &[String]) -> String {
    let n_classes = matrix.n_classes();
    if n_classes < 2 { return String::new(); }

    let max_off_diag = matrix.counts.iter().enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().filter(move |(c, _)| *c != r).map(|(_, &v)| v))
        .max()
        .unwrap_or(1)
        .max(1);

    let header: String = (0..n_classes)
        .map(|c| format!("<th title=\"{}\">P:{}</th>", html_escape(&labels[c]), c))
        .collect();
    let rows: String = matrix.counts.iter().enumerate().map(|(r, row)| {
        let cells: String = row.iter().enumerate().map(|(c, &v)| {
            if r == c {
                format!("<td class=\"conf-diag\">{}</td>", v)
            } else {
                let alpha = (v as f64 / max_off_diag as f64 * 0.4).min(0.4);
                let style = if v > 0 {
                    format!(" style=\"background:rgba(220,38,38,{:.2})\"", alpha)
                } else {
                    String::new()
                };
                format!("<td{}>{}</td>", style, v)
            }
        }).collect();
        format!("<tr><th title=\"{}\">T:{}</th>{}</tr>", html_escape(&labels[r]), r, cells)
    }).collect();

    let legend: String = labels.iter().enumerate()
        .map(|(i, l)| format!("<li><strong>{}</strong> {}</li>", i, html_escape(l)))
        .collect();

    format!(
        r#"<div class="card"><h2>Confusion Matrix (Test Set)</h2>
<p class="hint" style="margin-bottom:10px">Rows = true class, Columns = predicted class. Green diagonal = correct predictions.</p>
<div style="overflow-x:auto">
<table class="conf-matrix">
  <thead><tr><th></th>{header}</tr></thead>
  <tbody>{rows}</tbody>
</table>
</div>
<ul class="legend">{legend}</ul>
</div>"#,
        header = header, rows = rows, legend = legend
    )
}
