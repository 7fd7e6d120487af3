//! File naming conventions under the application and public roots.
//!
//! Resource keys start with `/` (`/login`, `/blog/index`) and are appended
//! to the directory of each definition kind.

use crate::routing::RequestType;

/// Template engine file extension.
pub const VIEW_EXTENSION: &str = "tera";

/// Critical CSS inlined into every page, relative to the public root.
pub const CRITICAL_CSS: &str = "critical.css";

/// Field names of a resource form.
pub fn form_manifest(resource_key: &str, request_type: RequestType) -> String {
    format!("form{}.{}.form.toml", resource_key, request_type)
}

/// Shared definition of one field.
pub fn field(name: &str) -> String {
    format!("field/{}.field.toml", name)
}

/// Aspect list of a resource.
pub fn aspects(resource_key: &str, request_type: RequestType) -> String {
    format!("aspect{}.{}.aspect.toml", resource_key, request_type)
}

/// Page metadata overrides.
pub fn metadata(resource_key: &str) -> String {
    format!("metadata{}.metadata.toml", resource_key)
}

/// Raw view of a resource for a request type.
pub fn view(request_type: RequestType, resource_key: &str) -> String {
    format!("view/{}{}.{}.{}", request_type, resource_key, request_type, VIEW_EXTENSION)
}

/// Page-specific stylesheet view.
pub fn css_view(resource_key: &str, request_type: RequestType) -> String {
    format!("view/css{}.{}.css.{}", resource_key, request_type, VIEW_EXTENSION)
}

/// Page-specific script view.
pub fn js_view(resource_key: &str, request_type: RequestType) -> String {
    format!("view/js{}.{}.js.{}", resource_key, request_type, VIEW_EXTENSION)
}

/// Page fragment (`header`, `menu`, `footer`) specific to one resource.
pub fn page_fragment(resource_key: &str, kind: &str) -> String {
    format!("view/page{}.{}.{}", resource_key, kind, VIEW_EXTENSION)
}

/// Default page fragment of a directory; `directory` ends with `/`.
pub fn default_page_fragment(directory: &str, kind: &str) -> String {
    format!("view/page{}default.{}.{}", directory, kind, VIEW_EXTENSION)
}

/// Page layout template.
pub fn template(name: &str) -> String {
    format!("template/{}.template.{}", name, VIEW_EXTENSION)
}
