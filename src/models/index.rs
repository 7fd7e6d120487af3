//! Home page and sign-in event.

use serde_json::Value;

use crate::dispatch::{ModelBuilder, ModelDefinition, RequestContext};
use crate::exception::AppResult;

/// State shared by the actions of one request.
#[derive(Debug, Default)]
pub struct Index {
    request_id: String,
}

impl Index {
    fn new(ctx: &RequestContext) -> Self {
        Self {
            request_id: ctx.request_id.clone(),
        }
    }
}

/// `Index`: the home page.
pub fn index_page() -> ModelDefinition {
    ModelBuilder::new("Index", Index::new).action("index", index).build()
}

/// `IndexEvent`: partial updates of the home page.
pub fn index_event() -> ModelDefinition {
    ModelBuilder::new("IndexEvent", Index::new).action("login", login).build()
}

fn index(_: &mut Index, ctx: &mut RequestContext, _: &[Value]) -> AppResult<()> {
    ctx.set_view("title", "Welcome");
    Ok(())
}

/// Greet a user whose credentials passed the form checks.
///
/// Parameters are validated by a preceding `checkParameters` aspect.
fn login(model: &mut Index, ctx: &mut RequestContext, _: &[Value]) -> AppResult<()> {
    let email = ctx.parameter_str("email").unwrap_or_default().to_string();
    tracing::info!(request_id = %model.request_id, email = %email, "Login accepted");
    ctx.set_view("email", email);
    ctx.set_view("authenticated", true);
    Ok(())
}
