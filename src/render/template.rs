//! Template rendering collaborator.

use tera::{Context, Tera};

use crate::dispatch::View;
use crate::exception::AppResult;

/// Renders raw template text against view variables.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, view: &View) -> AppResult<String>;
}

/// Tera-backed engine. Templates are compiled per call and never escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn render(&self, template: &str, view: &View) -> AppResult<String> {
        let context = Context::from_value(serde_json::Value::Object(view.clone()))?;
        Ok(Tera::one_off(template, &context, false)?)
    }
}
