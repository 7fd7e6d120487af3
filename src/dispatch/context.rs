//! Per-request state shared by aspects, models and renderers.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::exception::AppResult;
use crate::forms::{validate, FormData};
use crate::routing::{Parameters, ResolvedRoute};

use super::model::ModelInstance;

/// View variables passed to template rendering.
pub type View = Map<String, Value>;

/// Mutable aggregate owned by one in-flight request.
pub struct RequestContext {
    pub route: ResolvedRoute,
    pub parameters: Option<Parameters>,
    pub form_data: Option<Arc<FormData>>,
    /// Per-request model instance, if the route has one.
    pub model: Option<Box<dyn ModelInstance>>,
    /// Raw, unrendered view of the resource.
    pub page_view: Option<String>,
    pub view: View,
    pub request_id: String,
    /// Pending redirect target; no further aspects run once set.
    pub redirect: Option<String>,
    started_at: Instant,
}

impl RequestContext {
    pub fn new(route: ResolvedRoute, request_id: impl Into<String>) -> Self {
        let parameters = route.parameters.clone();
        Self {
            route,
            parameters,
            form_data: None,
            model: None,
            page_view: None,
            view: View::new(),
            request_id: request_id.into(),
            redirect: None,
            started_at: Instant::now(),
        }
    }

    /// Validate the request parameters against the resource form data.
    ///
    /// With a `redirect` target a violation schedules a redirect instead of
    /// failing. Resources without form data always pass.
    pub fn check_parameters(&mut self, redirect: Option<&str>) -> AppResult<()> {
        let Some(form) = self.form_data.clone() else {
            return Ok(());
        };
        let parameters = self.parameters.get_or_insert_with(Parameters::new);

        match (validate(parameters, &form), redirect) {
            (Ok(()), _) => Ok(()),
            (Err(e), Some(target)) => {
                tracing::debug!(
                    request_id = %self.request_id,
                    redirect = %target,
                    error = %e,
                    "Invalid parameters, redirecting"
                );
                self.redirect = Some(target.to_string());
                Ok(())
            }
            (Err(e), None) => Err(e),
        }
    }

    /// Request parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.as_ref().and_then(|p| p.get(name))
    }

    /// Request parameter as a string slice.
    pub fn parameter_str(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(Value::as_str)
    }

    pub fn set_view(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.view.insert(name.into(), value.into());
    }

    /// Set a view variable unless an aspect already did.
    pub fn default_view(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.view.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Milliseconds since the request arrived.
    pub fn duration_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }
}
