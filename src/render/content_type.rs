//! Content types: the static MIME table and body-based inference.

pub const HTML: &str = "text/html";
pub const JSON: &str = "application/json";
pub const JAVASCRIPT: &str = "application/javascript";
pub const XML: &str = "application/xml";

/// MIME type of a file extension.
pub fn mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "html" => HTML,
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => JSON,
        "csv" => "text/csv",
        "xml" => XML,

        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",

        "mp3" => "audio/mpeg",

        "pdf" => "application/pdf",

        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",

        "zip" => "application/zip",
        "7z" => "application/x-7z-compressed",
        _ => return None,
    };
    Some(mime)
}

/// Extension of the last path segment, if it has one.
pub fn extension(uri: &str) -> Option<&str> {
    let segment = uri.rsplit('/').next()?;
    segment.rsplit_once('.').map(|(_, ext)| ext)
}

/// Infer the content type of a partial response from its first character.
///
/// Markup (and an empty body) is HTML, `{` is JSON, anything else is script.
pub fn infer(body: &str) -> &'static str {
    match body.chars().next() {
        None | Some('<') => HTML,
        Some('{') => JSON,
        Some(_) => JAVASCRIPT,
    }
}
