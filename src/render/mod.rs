//! Response rendering.
//!
//! # Responsibilities
//! - Turn a finished request context into exactly one [`Rendered`]
//!   response, per request type and outcome
//! - Assemble page chrome (layout template, fragments, metadata)
//! - Convert web-service payloads to JSON or XML
//!
//! # Data Flow
//! ```text
//! dispatcher
//!     → render_success / render_error
//!     → page.rs | event.rs | dialog.rs | ws.rs
//!     → Rendered (status, content type, body, optional Location)
//!     → axum Response
//! ```

pub mod content_type;
mod dialog;
mod event;
mod page;
pub mod template;
mod ws;
pub mod xml;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;

use crate::config::SiteConfig;
use crate::dispatch::RequestContext;
use crate::exception::{AppResult, Exception};
use crate::routing::RequestType;
use crate::store::ResourceStore;

pub use template::{TeraEngine, TemplateEngine};

/// A fully rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Redirect target, sent as `Location`.
    pub location: Option<String>,
}

impl Rendered {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
            location: None,
        }
    }

    /// `301 Moved Permanently` to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::new(301, content_type::HTML, Vec::new())
        }
    }

    /// Bare status-text response, used when an error renderer fails.
    pub fn status_text(status: u16) -> Self {
        Self::new(status, content_type::HTML, reason_phrase(status))
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response();
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(_) => tracing::warn!(location = %location, "Dropping invalid redirect target"),
            }
        }
        response
    }
}

/// Canonical reason phrase of an HTTP status.
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Collaborators needed by the renderers.
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    /// Application root: views, templates, metadata.
    pub store: &'a dyn ResourceStore,
    /// Public root: critical CSS.
    pub public: &'a dyn ResourceStore,
    pub templates: &'a dyn TemplateEngine,
    pub site: &'a SiteConfig,
}

/// Render a successfully executed request.
pub async fn render_success(env: &RenderEnv<'_>, ctx: &mut RequestContext) -> AppResult<Rendered> {
    match ctx.route.request_type {
        RequestType::Page => page::success(env, ctx).await,
        RequestType::Event => event::success(env, ctx),
        RequestType::Dialog => dialog::success(env, ctx),
        RequestType::Ws => ws::success(env, ctx),
    }
}

/// Render a (normalized) exception.
pub async fn render_error(
    env: &RenderEnv<'_>,
    ctx: &mut RequestContext,
    exception: &Exception,
) -> AppResult<Rendered> {
    match ctx.route.request_type {
        RequestType::Page => page::error(env, ctx, exception).await,
        RequestType::Event => Ok(event::error(exception)),
        RequestType::Dialog => dialog::error(env, ctx, exception).await,
        RequestType::Ws => ws::error(env, ctx, exception).await,
    }
}

/// Resource key of the error view for an exception.
fn error_key(exception: &Exception) -> &'static str {
    if exception.is_not_found() {
        "/not-found"
    } else {
        "/internal-server-error"
    }
}
