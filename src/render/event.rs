//! Partial (`event`) responses: fragments, JSON or script.

use crate::dispatch::RequestContext;
use crate::exception::{AppResult, Exception};

use super::{content_type, RenderEnv, Rendered};

pub(super) fn success(env: &RenderEnv<'_>, ctx: &RequestContext) -> AppResult<Rendered> {
    let body = env
        .templates
        .render(ctx.page_view.as_deref().unwrap_or_default(), &ctx.view)?;
    Ok(Rendered::new(200, content_type::infer(&body), body))
}

/// The message is sent verbatim so form violations reach the client as JSON.
pub(super) fn error(exception: &Exception) -> Rendered {
    let message = exception.message();
    Rendered::new(exception.status(), content_type::infer(message), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::FieldViolation;

    #[test]
    fn test_form_violation_is_json() {
        let e = Exception::form_data(FieldViolation {
            field_id: "email".into(),
            constraint: "required".into(),
            message: "Email is required".into(),
            label: "Email".into(),
        });
        let rendered = error(&e);
        assert_eq!(rendered.status, 412);
        assert_eq!(rendered.content_type, "application/json");
        assert!(rendered.body_text().contains("\"fieldId\":\"email\""));
    }

    #[test]
    fn test_plain_message_is_script() {
        let rendered = error(&Exception::not_found("/missing,event"));
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.content_type, "application/javascript");
    }
}
