/// Minimal multipart/form-data reader for the upload form.
///
/// The body is split on `--boundary`; each piece with a `\r\n\r\n` header
/// terminator becomes a [`Part`]. Only what the studio needs is parsed: the
/// field name, whether the part is a file, and the raw data.

/// One form part.
pub struct Part<'a> {
    headers: String,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// Value of the `name="..."` disposition parameter.
    pub fn name(&self) -> Option<&str> {
        disposition_param(&self.headers, "name")
    }

    pub fn filename(&self) -> Option<&str> {
        disposition_param(&self.headers, "filename")
    }

    pub fn is_file(&self) -> bool {
        self.filename().is_some()
    }
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find_map(|s| s.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Splits a multipart body into its parts, skipping the preamble and the
/// closing `--` marker.
pub fn parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    const HEADER_END: &[u8] = b"\r\n\r\n";
    let delimiter = format!("--{}", boundary);
    let delim = delimiter.as_bytes();

    let mut result = Vec::new();
    let mut rest = body;
    while let Some(pos) = find_subsequence(rest, delim) {
        let chunk = &rest[..pos];
        rest = &rest[pos + delim.len()..];

        if let Some(sep) = find_subsequence(chunk, HEADER_END) {
            let raw = &chunk[sep + HEADER_END.len()..];
            result.push(Part {
                headers: String::from_utf8_lossy(&chunk[..sep]).into_owned(),
                data: raw.strip_suffix(b"\r\n").unwrap_or(raw),
            });
        }
    }
    result
}

/// Text value of the non-file field `field_name`.
pub fn text_field(body: &[u8], boundary: &str, field_name: &str) -> Option<String> {
    parts(body, boundary)
        .into_iter()
        .find(|p| !p.is_file() && p.name() == Some(field_name))
        .and_then(|p| String::from_utf8(p.data.to_vec()).ok())
}

/// Raw bytes of the file field `field_name`.
pub fn file_field(body: &[u8], boundary: &str, field_name: &str) -> Option<Vec<u8>> {
    parts(body, boundary)
        .into_iter()
        .find(|p| p.is_file() && p.name() == Some(field_name))
        .map(|p| p.data.to_vec())
}

/// Finds `key="value"` in a Content-Disposition header block. The match
/// must start a parameter, so `name` does not match inside `filename`.
fn disposition_param<'h>(headers: &'h str, key: &str) -> Option<&'h str> {
    let needle = format!("{}=\"", key);
    let mut search = 0;
    while let Some(found) = headers[search..].find(&needle) {
        let start = search + found;
        let preceded_ok = headers[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c == ';' || c.is_whitespace());
        let value_start = start + needle.len();
        if preceded_ok {
            let end = headers[value_start..].find('"')?;
            return Some(&headers[value_start..value_start + end]);
        }
        search = value_start;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"--XyZ\r\nContent-Disposition: form-data; name=\"image_file\"; filename=\"leaf.png\"\r\n");
        b.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        b.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x00, 0x0d]);
        b.extend_from_slice(b"\r\n--XyZ\r\nContent-Disposition: form-data; name=\"show_performance\"\r\n\r\non\r\n--XyZ--\r\n");
        b
    }

    #[test]
    fn boundary_from_content_type() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=\"XyZ\"").as_deref(),
            Some("XyZ")
        );
        assert_eq!(extract_boundary("text/plain"), None);
    }

    #[test]
    fn file_and_text_parts() {
        let b = body();
        assert_eq!(
            file_field(&b, "XyZ", "image_file").unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x00, 0x0d]
        );
        assert_eq!(text_field(&b, "XyZ", "show_performance").as_deref(), Some("on"));
        assert_eq!(text_field(&b, "XyZ", "missing"), None);
        assert!(file_field(&b, "XyZ", "show_performance").is_none());
    }

    #[test]
    fn name_is_not_matched_inside_filename() {
        let headers = "Content-Disposition: form-data; filename=\"x.png\"; name=\"image_file\"";
        assert_eq!(disposition_param(headers, "name"), Some("image_file"));
        assert_eq!(disposition_param(headers, "filename"), Some("x.png"));
    }
}
