//! Static assets served from the public root.

use crate::observability::metrics;
use crate::render::{content_type, Rendered};
use crate::store::ResourceStore;

const NOT_FOUND: &str = "Not Found";

/// Serve `uri` from `public`. Unknown extensions and missing files are 404.
pub async fn serve(public: &dyn ResourceStore, uri: &str) -> Rendered {
    let mime = content_type::extension(uri)
        .map(str::to_ascii_lowercase)
        .and_then(|ext| content_type::mime_type(&ext));

    let rendered = match mime {
        None => Rendered::new(404, content_type::HTML, NOT_FOUND),
        Some(mime) => match public.read_bytes(uri).await {
            Ok(Some(bytes)) => Rendered::new(200, mime, bytes),
            Ok(None) => Rendered::new(404, mime, NOT_FOUND),
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "Failed to read static asset");
                Rendered::status_text(500)
            }
        },
    };

    tracing::debug!(uri = %uri, status = rendered.status, "Static asset");
    metrics::record_static(rendered.status);
    rendered
}
