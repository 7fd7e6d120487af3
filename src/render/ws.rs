//! Web-service responses.
//!
//! The `format` parameter is looked up in the MIME table (`json` when it
//! is absent or unknown). Without a resource view the body is a
//! synthesized payload:
//!
//! ```text
//! { uri, requestType, parameters, duration, data }
//! ```
//!
//! With `format=xml` a rendered view must be JSON; it is converted to XML
//! like the synthesized payload.

use serde_json::{json, Value};

use crate::dispatch::RequestContext;
use crate::exception::{AppResult, Exception};
use crate::routing::RequestType;
use crate::store::layout;

use super::{content_type, error_key, reason_phrase, xml, RenderEnv, Rendered};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Format {
    content_type: &'static str,
    xml: bool,
}

impl Format {
    const JSON: Format = Format {
        content_type: content_type::JSON,
        xml: false,
    };

    fn of(ctx: &RequestContext) -> Self {
        let Some(name) = ctx.parameter_str("format").map(str::to_ascii_lowercase) else {
            return Format::JSON;
        };
        match content_type::mime_type(&name) {
            Some(mime) => Format {
                content_type: mime,
                xml: name == "xml",
            },
            None => Format::JSON,
        }
    }

    fn serialize(self, payload: &Value) -> AppResult<String> {
        if self.xml {
            Ok(xml::to_xml(payload))
        } else {
            Ok(serde_json::to_string(payload)?)
        }
    }

    /// Convert a rendered JSON view for XML requests.
    fn finish(self, body: String) -> AppResult<String> {
        if !self.xml {
            return Ok(body);
        }
        let value: Value = serde_json::from_str(&body)?;
        Ok(xml::to_xml(&value))
    }
}

fn payload(ctx: &RequestContext, data: Value) -> Value {
    json!({
        "uri": ctx.route.uri,
        "requestType": ctx.route.request_type,
        "parameters": ctx.parameters,
        "duration": ctx.duration_ms(),
        "data": data,
    })
}

pub(super) fn success(env: &RenderEnv<'_>, ctx: &RequestContext) -> AppResult<Rendered> {
    let format = Format::of(ctx);
    let body = match &ctx.page_view {
        Some(view) if ctx.view.is_empty() => format.finish(view.clone())?,
        Some(view) => format.finish(env.templates.render(view, &ctx.view)?)?,
        None => format.serialize(&payload(ctx, Value::Object(ctx.view.clone())))?,
    };
    Ok(Rendered::new(200, format.content_type, body))
}

/// `data` carries the status and its reason phrase; `detail` carries the
/// exception message. An error view sees the payload as the JSON string
/// `response` unless a model already set one.
pub(super) async fn error(
    env: &RenderEnv<'_>,
    ctx: &mut RequestContext,
    exception: &Exception,
) -> AppResult<Rendered> {
    let format = Format::of(ctx);
    let status = exception.status();
    let response = payload(
        ctx,
        json!({
            "status": status,
            "message": reason_phrase(status),
            "detail": exception.message(),
        }),
    );

    let path = layout::view(RequestType::Ws, error_key(exception));
    let body = match env.store.read_text(&path).await? {
        Some(view) => {
            if !ctx.view.contains_key("response") {
                ctx.set_view("response", serde_json::to_string(&response)?);
            }
            format.finish(env.templates.render(&view, &ctx.view)?)?
        }
        None => format.serialize(&response)?,
    };
    Ok(Rendered::new(status, format.content_type, body))
}
