use std::io::Cursor;
use tiny_http::Response;
use tracing::info;

use crate::render::{render_page, Page};
use crate::state::{FlashMessage, StudioState};

/// `POST /exit`: closes the session.
pub fn handle_exit(state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    state.open = false;
    info!("session closed by user");
    closed_page()
}

/// `GET /restart`: reopens a closed session.
pub fn handle_restart(state: &mut StudioState) -> Response<Cursor<Vec<u8>>> {
    state.open = true;
    state.flash = Some(FlashMessage::success("Welcome back."));
    info!("session reopened");
    crate::routes::redirect("/classify")
}

pub fn closed_page() -> Response<Cursor<Vec<u8>>> {
    crate::routes::html_response(render_page(Page::Closed, "", |tmpl| {
        tmpl.replace(
            "{{RESULT_SECTION}}",
            r#"<div class="flash flash-warning">The app has been closed. <a href="/restart">Restart</a> to classify more images.</div>"#,
        )
    }))
}
