use std::io::{Cursor, Read};
use tiny_http::{Request, Response};
use tracing::{info, warn};

use ferrite_leaf::{decode_image, InferenceService, LeafError};

use crate::handlers::performance::build_report_html;
use crate::render::{error_card, html_escape, render_flash_html, render_page, Page};
use crate::state::StudioState;
use crate::util::multipart::{extract_boundary, file_field, text_field};

// ---------------------------------------------------------------------------
// GET /classify
// ---------------------------------------------------------------------------

pub fn handle_get(state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    let flash = render_flash_html(state.take_flash().as_ref());
    crate::routes::html_response(build_classify_page(state, &flash, "", ""))
}

// ---------------------------------------------------------------------------
// POST /classify
// ---------------------------------------------------------------------------

pub fn handle_post(request: &mut Request, state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let boundary = match extract_boundary(&content_type) {
        Some(b) if content_type.starts_with("multipart/form-data") => b,
        _ => {
            let page = build_classify_page(state, "", &error_card("Invalid upload request."), "");
            return crate::routes::html_response(page);
        }
    };

    let mut body: Vec<u8> = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        warn!("failed to read upload body: {}", e);
        let page = build_classify_page(state, "", &error_card("Could not read the upload."), "");
        return crate::routes::html_response(page);
    }

    let show_performance = text_field(&body, &boundary, "show_performance").is_some();

    let result_html = match file_field(&body, &boundary, "image_file") {
        Some(bytes) if !bytes.is_empty() => match classify_bytes(state, &bytes) {
            Ok(label) => result_card(&label),
            Err(e) => {
                warn!("classification failed: {}", e);
                error_card(&e.to_string())
            }
        },
        _ => error_card("No image file was uploaded."),
    };

    let report_html = if show_performance { build_report_html(state) } else { String::new() };

    crate::routes::html_response(build_classify_page(state, "", &result_html, &report_html))
}

/// Decode → extract → predict.
fn classify_bytes(state: &StudioState, bytes: &[u8]) -> Result<String, LeafError> {
    let artifacts = state.repository.load()?;
    let image = decode_image(bytes)?;
    let label = InferenceService::from_artifacts(&artifacts).predict_image(&state.extractor, &image)?;
    info!(bytes = bytes.len(), %label, "studio prediction");
    Ok(label)
}

// ---------------------------------------------------------------------------
// Page builder
// ---------------------------------------------------------------------------

fn build_classify_page(state: &StudioState, flash: &str, result_html: &str, report_html: &str) -> String {
    let bins = state.extractor.config().bins();
    let hint = format!(
        "JPG or PNG. The image is reduced to a {}×{}×{} HSV color histogram before classification.",
        bins[0], bins[1], bins[2]
    );
    let upload_section = format!(
        r#"<form method="POST" action="/classify" enctype="multipart/form-data">
  <label for="image_file">Choose an image…</label>
  <input type="file" id="image_file" name="image_file" accept="image/png,image/jpeg" style="margin-bottom:10px">
  <div id="preview-wrap" style="display:none;margin-bottom:10px">
    <img id="preview" style="max-width:320px;border-radius:6px;border:1.5px solid #dde2ec">
  </div>
  <p class="hint">{hint}</p>
  <label class="check"><input type="checkbox" name="show_performance" value="on"> Show model performance</label>
  <div class="mt"><button type="submit" class="btn btn-primary">Predict</button></div>
</form>
<script>
document.getElementById('image_file').addEventListener('change', function() {{
  var img = document.getElementById('preview');
  img.src = URL.createObjectURL(this.files[0]);
  document.getElementById('preview-wrap').style.display = 'block';
}});
</script>"#,
        hint = html_escape(&hint),
    );

    render_page(Page::Classify, flash, |tmpl| {
        tmpl
            .replace("{{UPLOAD_SECTION}}", &upload_section)
            .replace("{{RESULT_SECTION}}", result_html)
            .replace("{{REPORT_SECTION}}", report_html)
    })
}

fn result_card(label: &str) -> String {
    format!(
        r#"<div class="result-card"><h2>Result</h2>
<div class="prediction-sub">Predicted disease</div>
<div class="prediction-hero">{label}</div>
<div class="mt"><a class="btn" href="/classify">Upload another image</a></div>
</div>"#,
        label = html_escape(label)
    )
}
