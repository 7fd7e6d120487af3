//! Raw URL to resource resolution.
//!
//! # Responsibilities
//! - Split the request-type suffix (`,event`) off the path
//! - Derive model and action names from the path segments
//! - Parse the query string into request parameters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::case::{to_camel_case, to_pascal_case};

/// Request parameters keyed by name.
///
/// Query values are strings, or lists of strings for repeated keys. Validation
/// may later substitute defaults and numeric coercions.
pub type Parameters = Map<String, Value>;

/// Separator between the resource path and the request type.
const REQUEST_TYPE_SEPARATOR: char = ',';

/// Rendering strategy selected by the URL suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    #[default]
    Page,
    Event,
    Dialog,
    Ws,
}

impl RequestType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page" => Some(RequestType::Page),
            "event" => Some(RequestType::Event),
            "dialog" => Some(RequestType::Dialog),
            "ws" => Some(RequestType::Ws),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Page => "page",
            RequestType::Event => "event",
            RequestType::Dialog => "dialog",
            RequestType::Ws => "ws",
        }
    }

    /// Suffix appended to model names: empty for pages, `Event` for events, ...
    pub fn model_suffix(self) -> &'static str {
        match self {
            RequestType::Page => "",
            RequestType::Event => "Event",
            RequestType::Dialog => "Dialog",
            RequestType::Ws => "Ws",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable result of URL resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoute {
    /// Directory prefix for model lookup, always ending with `/`.
    pub path: String,
    pub resource_name: String,
    /// Normalized path without the request-type suffix.
    pub uri: String,
    pub model_name: String,
    pub action_name: String,
    pub request_type: RequestType,
    pub parameters: Option<Parameters>,
}

impl ResolvedRoute {
    fn index(uri: String, request_type: RequestType, parameters: Option<Parameters>) -> Self {
        Self {
            path: uri.clone(),
            resource_name: "index".to_string(),
            uri,
            model_name: format!("Index{}", request_type.model_suffix()),
            action_name: "index".to_string(),
            request_type,
            parameters,
        }
    }

    /// Key used to locate per-resource files (views, aspects, manifests).
    ///
    /// Index URIs end with `/` and map to the `index` file of that directory.
    pub fn resource_key(&self) -> String {
        if self.uri.ends_with('/') {
            format!("{}index", self.uri)
        } else {
            self.uri.clone()
        }
    }

    /// Registry key of the model: `path` followed by `model_name`.
    pub fn model_key(&self) -> String {
        format!("{}{}", self.path, self.model_name)
    }

    /// URI including the request-type suffix, e.g. `/login,event`.
    pub fn typed_uri(&self) -> String {
        format!("{}{}{}", self.uri, REQUEST_TYPE_SEPARATOR, self.request_type)
    }
}

/// Resolve a raw request URL. Never fails.
pub fn resolve(raw_url: &str) -> ResolvedRoute {
    let (path, query) = split_url(raw_url);
    let parameters = parse_query(query);

    let mut pieces = path.split(REQUEST_TYPE_SEPARATOR);
    let raw_uri = pieces.next().unwrap_or_default();
    let request_type = match pieces.next() {
        None => RequestType::Page,
        Some(suffix) => match RequestType::parse(suffix) {
            Some(t) => t,
            None => return ResolvedRoute::index("/".to_string(), RequestType::Page, parameters),
        },
    };

    let mut segments: Vec<&str> = raw_uri.split('/').filter(|s| !s.is_empty()).collect();

    // Directory-style URL: index of that directory
    if raw_uri.ends_with('/') || segments.is_empty() {
        let uri = if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", segments.join("/"))
        };
        return ResolvedRoute::index(uri, request_type, parameters);
    }

    let uri = format!("/{}", segments.join("/"));
    let resource_name = segments.pop().unwrap_or_default().to_string();
    let action_name = to_camel_case(&resource_name);
    if action_name.is_empty() {
        return ResolvedRoute::index("/".to_string(), request_type, parameters);
    }

    let mut model_name = format!("Index{}", request_type.model_suffix());
    if let Some(source) = segments.pop() {
        let pascal = to_pascal_case(source);
        if !pascal.is_empty() {
            model_name = format!("{}{}", pascal, request_type.model_suffix());
        }
    }

    let path = if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    };

    ResolvedRoute {
        path,
        resource_name,
        uri,
        model_name,
        action_name,
        request_type,
        parameters,
    }
}

/// Split a raw URL into path and query string, dropping scheme, authority and fragment.
fn split_url(raw_url: &str) -> (&str, &str) {
    let mut url = raw_url;
    for scheme in ["http://", "https://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            url = rest.find('/').map(|i| &rest[i..]).unwrap_or("/");
            break;
        }
    }
    let url = url.split('#').next().unwrap_or_default();
    match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    }
}

/// Parse a query string; repeated keys collect into a list.
fn parse_query(query: &str) -> Option<Parameters> {
    let mut parameters = Parameters::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match parameters.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                parameters.insert(key.into_owned(), value);
            }
        }
    }

    if parameters.is_empty() {
        None
    } else {
        Some(parameters)
    }
}
