//! Dialog fragments.

use crate::dispatch::RequestContext;
use crate::exception::{AppResult, Exception};
use crate::routing::RequestType;
use crate::store::layout;

use super::{content_type, error_key, RenderEnv, Rendered};

pub(super) fn success(env: &RenderEnv<'_>, ctx: &RequestContext) -> AppResult<Rendered> {
    let body = env
        .templates
        .render(ctx.page_view.as_deref().unwrap_or_default(), &ctx.view)?;
    Ok(Rendered::new(200, content_type::HTML, body))
}

/// Render the `not-found` or `internal-server-error` dialog, falling back
/// to the exception message when the site defines none.
pub(super) async fn error(
    env: &RenderEnv<'_>,
    ctx: &mut RequestContext,
    exception: &Exception,
) -> AppResult<Rendered> {
    let path = layout::view(RequestType::Dialog, error_key(exception));
    let body = match env.store.read_text(&path).await? {
        Some(view) => {
            ctx.default_view("status", exception.status());
            ctx.default_view("message", exception.message());
            env.templates.render(&view, &ctx.view)?
        }
        None => exception.message().to_string(),
    };
    Ok(Rendered::new(exception.status(), content_type::HTML, body))
}
