/// Central template renderer for the ferrite-leaf studio.
///
/// The studio uses a single HTML template (`studio/assets/studio.html`) with
/// placeholder tokens like `{{TOKEN}}`. The template is embedded at compile
/// time; `render_page` resolves the global tokens and hands the rest to a
/// caller-supplied closure. Tokens the closure leaves alone are blanked so
/// raw `{{TOKEN}}` strings never reach the browser.

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which tab is active. Controls the active CSS class in the nav bar.
#[derive(Clone, Copy)]
pub enum Page {
    Classify    = 0,
    Performance = 1,
    Closed      = 2,
}

/// Renders the full studio page.
///
/// # Arguments
/// - `page`: active tab
/// - `flash`: pre-rendered flash HTML (may be empty)
/// - `fill`: closure that fills tab-specific placeholders
pub fn render_page<F>(page: Page, flash: &str, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{ACTIVE_TAB}}", &(page as u8).to_string());
    html = html.replace("{{FLASH}}", flash);
    html = html.replace("{{NAV_HIDDEN}}", if matches!(page, Page::Closed) { "hidden" } else { "" });

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{UPPERCASE_TOKEN}}` that wasn't already substituted with an
/// empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}

pub fn error_card(msg: &str) -> String {
    format!(r#"<div class="result-card"><h2>Error</h2><div class="error-box">{}</div></div>"#, html_escape(msg))
}

pub fn render_flash_html(flash: Option<&crate::state::FlashMessage>) -> String {
    match flash {
        None    => String::new(),
        Some(f) => {
            let cls = match f.kind {
                crate::state::FlashKind::Success => "flash-success",
                crate::state::FlashKind::Warning => "flash-warning",
            };
            format!(r#"<div class="flash {}">{}</div>"#, cls, html_escape(&f.text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leftover_tokens_are_blanked() {
        assert_eq!(blank_remaining("a{{X}}b{{Y_Z}}c".into()), "abc");
        assert_eq!(blank_remaining("open {{ only".into()), "open {{ only");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("<b a=\"1\">&"), "&lt;b a=&quot;1&quot;&gt;&amp;");
    }
}
