//! The aspect dispatcher: one request in, exactly one response out.
//!
//! # Responsibilities
//! - Serve static assets for URIs with a file extension
//! - Load form data, aspect list and raw view concurrently
//! - Synthesize the default aspect from the route action
//! - Run aspects in order, honoring pending redirects
//! - Recover every failure into an error response
//!
//! # Design Decisions
//! - Built once at startup and shared behind an `Arc`
//! - A missing view is `NotFound` for every request type but `ws`
//! - Error renderer failures degrade to a bare status-text response

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::{AppConfig, SiteConfig};
use crate::exception::{AppResult, Exception};
use crate::forms::{load_form_data, FormCache};
use crate::observability::{metrics, ErrorLog};
use crate::render::{content_type, render_error, render_success, RenderEnv, Rendered, TemplateEngine, TeraEngine};
use crate::routing::{resolve, RequestType, ResolvedRoute};
use crate::store::{layout, FsStore, ResourceStore};

use super::aspect::{exception_from_arguments, resolve_aspects, Aspect, AspectTarget, DispatcherOp};
use super::assets;
use super::context::RequestContext;
use super::model::ModelRegistry;

/// Process-wide dispatch state.
pub struct Dispatcher {
    store: Arc<dyn ResourceStore>,
    public: Arc<dyn ResourceStore>,
    templates: Arc<dyn TemplateEngine>,
    models: ModelRegistry,
    form_cache: FormCache,
    error_log: ErrorLog,
    site: SiteConfig,
}

impl Dispatcher {
    /// Dispatcher over the given stores with default collaborators.
    pub fn new(store: Arc<dyn ResourceStore>, public: Arc<dyn ResourceStore>, models: ModelRegistry) -> Self {
        Self {
            store,
            public,
            templates: Arc::new(TeraEngine),
            models,
            form_cache: FormCache::new(false),
            error_log: ErrorLog::disabled(),
            site: SiteConfig::default(),
        }
    }

    /// Dispatcher over the filesystem roots of `config`.
    pub fn from_config(config: &AppConfig, models: ModelRegistry) -> Self {
        let error_log = if config.observability.error_log_enabled {
            ErrorLog::new(&config.paths.log)
        } else {
            ErrorLog::disabled()
        };

        Self::new(
            Arc::new(FsStore::new(&config.paths.application)),
            Arc::new(FsStore::new(&config.paths.public)),
            models,
        )
        .with_site(config.site.clone())
        .with_error_log(error_log)
        .with_form_cache(FormCache::new(config.cache.reuse_form_data))
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    pub fn with_form_cache(mut self, form_cache: FormCache) -> Self {
        self.form_cache = form_cache;
        self
    }

    /// Dispatch a raw request URL (path and query string).
    pub async fn run(&self, raw_url: &str, request_id: &str) -> Rendered {
        let start = Instant::now();
        let route = resolve(raw_url);

        if content_type::extension(&route.uri).is_some() {
            return assets::serve(self.public.as_ref(), &route.uri).await;
        }

        let request_type = route.request_type;
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            uri = %route.uri,
            request_type = %request_type
        );
        let rendered = self.dispatch(route, request_id).instrument(span).await;

        tracing::info!(
            request_id = %request_id,
            status = rendered.status,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Request dispatched"
        );
        metrics::record_request(request_type.as_str(), rendered.status, start);
        rendered
    }

    async fn dispatch(&self, route: ResolvedRoute, request_id: &str) -> Rendered {
        let mut ctx = RequestContext::new(route, request_id);

        let outcome = match self.execute(&mut ctx).await {
            Ok(()) => match ctx.redirect.take() {
                Some(location) => {
                    tracing::info!(location = %location, "Redirecting");
                    return Rendered::redirect(location);
                }
                None => render_success(&self.env(), &mut ctx).await,
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(rendered) => rendered,
            Err(e) => self.recover(&mut ctx, e).await,
        }
    }

    async fn execute(&self, ctx: &mut RequestContext) -> AppResult<()> {
        let key = ctx.route.resource_key();
        let request_type = ctx.route.request_type;
        let store = self.store.as_ref();
        let aspects_path = layout::aspects(&key, request_type);
        let view_path = layout::view(request_type, &key);

        let (form_data, aspect_list, page_view) = tokio::join!(
            self.form_cache
                .get_or_load(&key, request_type, || load_form_data(store, &key, request_type)),
            store.read_text(&aspects_path),
            store.read_text(&view_path),
        );
        let model = self.models.get(&ctx.route.model_key());

        ctx.form_data = form_data?;
        ctx.page_view = page_view?;

        let aspect_list = aspect_list?;

        if ctx.page_view.is_none() && request_type != RequestType::Ws {
            let missing = match request_type {
                RequestType::Page => ctx.route.uri.clone(),
                _ => ctx.route.typed_uri(),
            };
            return Err(Exception::not_found(missing));
        }

        let mut aspects = match aspect_list {
            Some(text) => resolve_aspects(&text, model.as_deref())?,
            None => Vec::new(),
        };
        if aspects.is_empty() {
            if let Some(model) = model.as_deref().filter(|m| m.has_action(&ctx.route.action_name)) {
                tracing::debug!(model = %model.name(), action = %ctx.route.action_name, "Using default aspect");
                aspects.push(Aspect::model_action(ctx.route.action_name.clone()));
            }
        }

        let instance = model.map(|m| m.instantiate(ctx));
        ctx.model = instance;

        for aspect in &aspects {
            if ctx.redirect.is_some() {
                break;
            }
            tracing::debug!(aspect = %aspect, "Running aspect");
            self.apply(ctx, aspect).await?;
        }
        Ok(())
    }

    async fn apply(&self, ctx: &mut RequestContext, aspect: &Aspect) -> AppResult<()> {
        match &aspect.target {
            AspectTarget::Model(action) => {
                let mut model = ctx
                    .model
                    .take()
                    .ok_or_else(|| Exception::internal(format!("No model instance for {}", aspect)))?;
                let result = model.invoke(action, ctx, &aspect.arguments);
                ctx.model = Some(model);
                result
            }
            AspectTarget::Dispatcher(DispatcherOp::CheckParameters) => {
                let redirect = aspect.arguments.first().and_then(Value::as_str);
                ctx.check_parameters(redirect)
            }
            AspectTarget::Dispatcher(DispatcherOp::ThrowException) => {
                Err(exception_from_arguments(&aspect.arguments))
            }
            AspectTarget::Dispatcher(DispatcherOp::Log) => {
                let message = aspect
                    .arguments
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                tracing::info!(message = %message, "Aspect log");
                self.error_log.append(&message).await;
                Ok(())
            }
        }
    }

    /// Log, normalize and render an exception.
    async fn recover(&self, ctx: &mut RequestContext, exception: Exception) -> Rendered {
        if exception.should_log() {
            tracing::error!(status = exception.status(), error = %exception, "Request failed");
            self.error_log
                .append(&format!("{} {}", ctx.route.typed_uri(), exception.message()))
                .await;
        } else {
            tracing::debug!(error = %exception, "Parameters rejected");
        }

        let exception = exception.normalize();
        match render_error(&self.env(), ctx, &exception).await {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(error = %e, "Error renderer failed");
                Rendered::status_text(exception.status())
            }
        }
    }

    fn env(&self) -> RenderEnv<'_> {
        RenderEnv {
            store: self.store.as_ref(),
            public: self.public.as_ref(),
            templates: self.templates.as_ref(),
            site: &self.site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::model::ModelBuilder;
    use crate::store::MemoryStore;

    struct Greeter;

    fn greet(_: &mut Greeter, ctx: &mut RequestContext, _: &[Value]) -> AppResult<()> {
        let name = ctx.parameter_str("name").unwrap_or("world").to_string();
        ctx.set_view("name", name);
        Ok(())
    }

    fn fail(_: &mut Greeter, _: &mut RequestContext, _: &[Value]) -> AppResult<()> {
        Err(Exception::unknown("database unavailable"))
    }

    fn count(_: &mut Greeter, ctx: &mut RequestContext, _: &[Value]) -> AppResult<()> {
        ctx.set_view("count", 3);
        Ok(())
    }

    fn hide(_: &mut Greeter, ctx: &mut RequestContext, _: &[Value]) -> AppResult<()> {
        ctx.set_view("message", "Nothing here yet");
        ctx.set_view("error", serde_json::json!({ "message": "moved away" }));
        Err(Exception::not_found("hidden"))
    }

    fn site() -> MemoryStore {
        MemoryStore::new()
            .with_file("template/default.template.tera", "<html>{{ pageBody }}</html>")
            .with_file("view/page/default.header.tera", "")
            .with_file("view/page/default.menu.tera", "")
            .with_file("view/page/default.footer.tera", "")
            .with_file("view/page/not-found.page.tera", "missing {{ error.message }}")
            .with_file("view/page/internal-server-error.page.tera", "oops")
            .with_file("view/event/hello.event.tera", "<p>Hello {{ name }}</p>")
            .with_file("view/event/broken.event.tera", "x")
            .with_file("aspect/broken.event.aspect.toml", "[[aspect]]\nmethod = \"this.model.fail\"\n")
            .with_file("view/event/secret.event.tera", "x")
            .with_file(
                "aspect/secret.event.aspect.toml",
                "[[aspect]]\nmethod = \"this.throwException\"\narguments = [\"NotFoundException\", \"gone\"]\n",
            )
            .with_file("view/event/audit.event.tera", "<p>ok</p>")
            .with_file(
                "aspect/audit.event.aspect.toml",
                "[[aspect]]\nmethod = \"this.log\"\narguments = [\"audit\", 7]\n",
            )
            .with_file("aspect/ghost.event.aspect.toml", "[[aspect]]\nmethod = \"this.nothing\"\n")
            .with_file("view/ws/count.ws.tera", r#"{"count": {{ count }}}"#)
            .with_file("view/ws/raw.ws.tera", r#"{"count": {{ count }}}"#)
            .with_file("view/dialog/hello.dialog.tera", "<div>Hello {{ name }}</div>")
            .with_file("view/dialog/hide.dialog.tera", "x")
            .with_file("view/dialog/not-found.dialog.tera", "{{ status }} {{ message }}")
            .with_file("view/page/hide.page.tera", "x")
    }

    fn dispatcher() -> Dispatcher {
        let models = ModelRegistry::new()
            .with_model(
                "/",
                ModelBuilder::new("IndexEvent", |_| Greeter)
                    .action("hello", greet)
                    .action("fail", fail)
                    .build(),
            )
            .with_model("/", ModelBuilder::new("IndexWs", |_| Greeter).action("count", count).build())
            .with_model(
                "/",
                ModelBuilder::new("IndexDialog", |_| Greeter)
                    .action("hello", greet)
                    .action("hide", hide)
                    .build(),
            )
            .with_model("/", ModelBuilder::new("Index", |_| Greeter).action("hide", hide).build());
        Dispatcher::new(Arc::new(site()), Arc::new(MemoryStore::new()), models)
    }

    #[tokio::test]
    async fn test_default_aspect_runs_route_action() {
        let rendered = dispatcher().run("/hello,event?name=Ann", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.content_type, "text/html");
        assert_eq!(rendered.body_text(), "<p>Hello Ann</p>");
    }

    #[tokio::test]
    async fn test_missing_page_renders_not_found() {
        let rendered = dispatcher().run("/nowhere", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "<html>missing /nowhere</html>");
    }

    #[tokio::test]
    async fn test_missing_event_view_message_has_type() {
        let rendered = dispatcher().run("/nowhere,event", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "/nowhere,event");
    }

    #[tokio::test]
    async fn test_unknown_errors_are_normalized() {
        let rendered = dispatcher().run("/broken,event", "req-1").await;
        assert_eq!(rendered.status, 500);
        assert_eq!(rendered.body_text(), "Internal Server Error");
    }

    #[tokio::test]
    async fn test_throw_exception_aspect() {
        let rendered = dispatcher().run("/secret,event", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "gone");
    }

    #[tokio::test]
    async fn test_error_renderer_failure_is_status_text() {
        // No page template at all
        let dispatcher = Dispatcher::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            ModelRegistry::new(),
        );
        let rendered = dispatcher.run("/anything", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "Not Found");
    }

    #[tokio::test]
    async fn test_ws_without_view_synthesizes_payload() {
        let rendered = dispatcher().run("/api/status,ws?verbose=1", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.content_type, "application/json");

        let payload: Value = serde_json::from_slice(&rendered.body).unwrap();
        assert_eq!(payload["uri"], "/api/status");
        assert_eq!(payload["requestType"], "ws");
        assert_eq!(payload["parameters"]["verbose"], "1");
        assert_eq!(payload["data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_log_aspect_appends_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher().with_error_log(ErrorLog::new(dir.path()));

        let rendered = dispatcher.run("/audit,event", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.body_text(), "<p>ok</p>");

        let mut lines = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let text = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            lines.extend(text.lines().map(str::to_string));
        }
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" audit 7"));
    }

    #[tokio::test]
    async fn test_missing_view_wins_over_bad_aspect() {
        let rendered = dispatcher().run("/ghost,event", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "/ghost,event");
    }

    #[tokio::test]
    async fn test_ws_view_rendered_with_variables() {
        let rendered = dispatcher().run("/count,ws", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.content_type, "application/json");
        assert_eq!(rendered.body_text(), r#"{"count": 3}"#);
    }

    #[tokio::test]
    async fn test_ws_view_verbatim_without_variables() {
        let rendered = dispatcher().run("/raw,ws", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.body_text(), r#"{"count": {{ count }}}"#);
    }

    #[tokio::test]
    async fn test_ws_view_as_xml() {
        let rendered = dispatcher().run("/count,ws?format=xml", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.content_type, "application/xml");
        assert!(rendered.body_text().contains("<count>3</count>"));
    }

    #[tokio::test]
    async fn test_dialog_success_is_html() {
        let rendered = dispatcher().run("/hello,dialog?name=Ann", "req-1").await;
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.content_type, "text/html");
        assert_eq!(rendered.body_text(), "<div>Hello Ann</div>");
    }

    #[tokio::test]
    async fn test_dialog_error_keeps_model_message() {
        let rendered = dispatcher().run("/hide,dialog", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "404 Nothing here yet");
    }

    #[tokio::test]
    async fn test_page_error_keeps_model_error() {
        let rendered = dispatcher().run("/hide", "req-1").await;
        assert_eq!(rendered.status, 404);
        assert_eq!(rendered.body_text(), "<html>missing moved away</html>");
    }
}
