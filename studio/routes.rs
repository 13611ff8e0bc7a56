use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::debug;

use crate::state::StudioState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Builds response headers; a pair that is not a valid header is dropped.
fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    pairs
        .iter()
        .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, headers: Vec<Header>, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    Response::new(StatusCode(status), headers, Cursor::new(body), Some(len), None)
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, headers(&[("Content-Type", "text/html; charset=utf-8")]), body.into_bytes())
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        headers(&[("Location", location), ("Content-Length", "0")]),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn json_download_response(body: String, filename: &str) -> Response<Cursor<Vec<u8>>> {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    bytes_response(
        200,
        headers(&[
            ("Content-Type", "application/json"),
            ("Content-Disposition", &disposition),
        ]),
        body.into_bytes(),
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, headers(&[("Content-Type", "text/plain")]), b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches one request and responds to it.
///
/// While the session is closed every page except `/restart` renders the
/// closed notice.
pub fn dispatch(mut request: Request, state: &mut StudioState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    debug!(%method, %path, "request");

    let response = if !state.open && path != "/restart" {
        handlers::session::closed_page()
    } else {
        match (method, path.as_str()) {
            // ── Root redirect ─────────────────────────────────────────────────
            (Method::Get, "/") => redirect("/classify"),

            // ── Classify ─────────────────────────────────────────────────────
            (Method::Get,  "/classify") => handlers::classify::handle_get(state),
            (Method::Post, "/classify") => handlers::classify::handle_post(&mut request, state),

            // ── Performance ──────────────────────────────────────────────────
            (Method::Get, "/performance")        => handlers::performance::handle_get(state),
            (Method::Get, "/performance/export") => handlers::performance::handle_export(state),

            // ── Session ──────────────────────────────────────────────────────
            (Method::Post, "/exit")    => handlers::session::handle_exit(state),
            (Method::Get,  "/restart") => handlers::session::handle_restart(state),

            // ── 404 ──────────────────────────────────────────────────────────
            _ => not_found(),
        }
    };

    let _ = request.respond(response);
}
