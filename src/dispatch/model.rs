//! Models: per-request objects exposing named actions to aspects.
//!
//! # Design Decisions
//! - Actions are plain function pointers registered in a table when the
//!   model is built; aspects are resolved against that table at load time
//! - A fresh model instance is constructed for every request
//! - The registry is keyed by route path + model name (`/IndexEvent`)

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::exception::{AppResult, Exception};

use super::context::RequestContext;

/// Signature of a model action.
pub type ActionFn<M> = fn(&mut M, &mut RequestContext, &[Value]) -> AppResult<()>;

/// A model instance bound to one request.
pub trait ModelInstance: Send {
    /// Run a registered action.
    fn invoke(&mut self, action: &str, ctx: &mut RequestContext, arguments: &[Value]) -> AppResult<()>;
}

type Factory = dyn Fn(&RequestContext) -> Box<dyn ModelInstance> + Send + Sync;

/// Type-erased model: its action names plus a per-request factory.
pub struct ModelDefinition {
    name: String,
    actions: BTreeSet<String>,
    factory: Box<Factory>,
}

impl ModelDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// Construct the model for one request.
    pub fn instantiate(&self, ctx: &RequestContext) -> Box<dyn ModelInstance> {
        (self.factory)(ctx)
    }
}

impl fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("name", &self.name)
            .field("actions", &self.actions)
            .finish()
    }
}

/// Builder collecting the action table of a model type.
pub struct ModelBuilder<M> {
    name: String,
    constructor: fn(&RequestContext) -> M,
    actions: HashMap<String, ActionFn<M>>,
}

impl<M: Send + 'static> ModelBuilder<M> {
    pub fn new(name: impl Into<String>, constructor: fn(&RequestContext) -> M) -> Self {
        Self {
            name: name.into(),
            constructor,
            actions: HashMap::new(),
        }
    }

    pub fn action(mut self, name: impl Into<String>, action: ActionFn<M>) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn build(self) -> ModelDefinition {
        let names = self.actions.keys().cloned().collect();
        let actions = Arc::new(self.actions);
        let constructor = self.constructor;

        ModelDefinition {
            name: self.name,
            actions: names,
            factory: Box::new(move |ctx: &RequestContext| -> Box<dyn ModelInstance> {
                Box::new(BoundModel {
                    model: constructor(ctx),
                    actions: actions.clone(),
                })
            }),
        }
    }
}

struct BoundModel<M> {
    model: M,
    actions: Arc<HashMap<String, ActionFn<M>>>,
}

impl<M: Send> ModelInstance for BoundModel<M> {
    fn invoke(&mut self, action: &str, ctx: &mut RequestContext, arguments: &[Value]) -> AppResult<()> {
        match self.actions.get(action) {
            Some(run) => run(&mut self.model, ctx, arguments),
            None => Err(Exception::internal(format!("Unknown model action: {}", action))),
        }
    }
}

/// Registered models, built once at startup.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelDefinition>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under a directory prefix ending with `/`.
    pub fn register(&mut self, path: &str, model: ModelDefinition) {
        let key = format!("{}{}", path, model.name());
        tracing::debug!(model = %key, actions = model.actions.len(), "Model registered");
        self.models.insert(key, Arc::new(model));
    }

    pub fn with_model(mut self, path: &str, model: ModelDefinition) -> Self {
        self.register(path, model);
        self
    }

    /// Look up a model by `path + name`.
    pub fn get(&self, key: &str) -> Option<Arc<ModelDefinition>> {
        self.models.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
