//! Full pages: layout template plus chrome.
//!
//! # Data Flow
//! ```text
//! layout template ─┐
//! critical CSS     │
//! page CSS / JS    ├─ loaded concurrently ─→ view variables ─→ layout rendered
//! header/menu/foot │
//! metadata        ─┘
//! ```
//!
//! Header, menu and footer fall back to the `default` fragment of the
//! nearest enclosing directory; the root default is required.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::SiteConfig;
use crate::dispatch::RequestContext;
use crate::exception::{AppResult, Exception};
use crate::routing::RequestType;
use crate::store::{layout, ResourceStore};

use super::{content_type, error_key, RenderEnv, Rendered};

pub(super) async fn success(env: &RenderEnv<'_>, ctx: &mut RequestContext) -> AppResult<Rendered> {
    let key = ctx.route.resource_key();
    let canonical = ctx.route.uri.clone();
    let body = ctx.page_view.clone();
    let html = assemble(env, ctx, &key, &canonical, body).await?;
    Ok(Rendered::new(200, content_type::HTML, html))
}

pub(super) async fn error(
    env: &RenderEnv<'_>,
    ctx: &mut RequestContext,
    exception: &Exception,
) -> AppResult<Rendered> {
    let key = error_key(exception);
    let body = env.store.read_text(&layout::view(RequestType::Page, key)).await?;
    ctx.default_view(
        "error",
        json!({ "status": exception.status(), "message": exception.message() }),
    );
    let html = assemble(env, ctx, key, key, body).await?;
    Ok(Rendered::new(exception.status(), content_type::HTML, html))
}

async fn assemble(
    env: &RenderEnv<'_>,
    ctx: &mut RequestContext,
    key: &str,
    canonical: &str,
    body: Option<String>,
) -> AppResult<String> {
    let template_path = layout::template(&env.site.template);
    let css_path = layout::css_view(key, RequestType::Page);
    let js_path = layout::js_view(key, RequestType::Page);

    let (template, critical_css, css, js, header, menu, footer, metadata) = tokio::join!(
        env.store.read_text(&template_path),
        env.public.read_text(layout::CRITICAL_CSS),
        env.store.read_text(&css_path),
        env.store.read_text(&js_path),
        page_fragment(env.store, key, "header"),
        page_fragment(env.store, key, "menu"),
        page_fragment(env.store, key, "footer"),
        load_metadata(env.store, env.site, key, canonical),
    );

    let template = template?
        .ok_or_else(|| Exception::internal(format!("Missing page template: {}", template_path)))?;

    let render_optional = |view: Option<String>, ctx: &RequestContext| -> AppResult<String> {
        match view {
            Some(view) => env.templates.render(&view, &ctx.view),
            None => Ok(String::new()),
        }
    };
    let page_css = render_optional(css?, &*ctx)?;
    let page_js = render_optional(js?, &*ctx)?;
    let page_body = render_optional(body, &*ctx)?;

    ctx.set_view("criticalCss", critical_css?.unwrap_or_default());
    ctx.set_view("pageCss", page_css);
    ctx.set_view("pageJs", page_js);
    ctx.set_view("pageHeader", header?);
    ctx.set_view("pageMenu", menu?);
    ctx.set_view("pageFooter", footer?);
    ctx.set_view("pageBody", page_body);
    ctx.set_view("breadcrumb", breadcrumb(canonical));
    ctx.set_view("metadata", metadata?);
    ctx.set_view("site", json!({ "name": env.site.name, "homeUrl": env.site.home_url }));

    env.templates.render(&template, &ctx.view)
}

/// Resource fragment, else the nearest directory default up to the root.
async fn page_fragment(store: &dyn ResourceStore, key: &str, kind: &str) -> AppResult<String> {
    if let Some(fragment) = store.read_text(&layout::page_fragment(key, kind)).await? {
        return Ok(fragment);
    }

    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    for depth in (1..segments.len()).rev() {
        let directory = format!("/{}/", segments[..depth].join("/"));
        if let Some(fragment) = store
            .read_text(&layout::default_page_fragment(&directory, kind))
            .await?
        {
            return Ok(fragment);
        }
    }

    let root = layout::default_page_fragment("/", kind);
    store
        .read_text(&root)
        .await?
        .ok_or_else(|| Exception::internal(format!("Missing default page fragment: {}", root)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata<'a> {
    title: &'a str,
    navigation: &'a str,
    description: &'a str,
    keywords: &'a str,
    author: &'a str,
    compression: bool,
    #[serde(rename = "static")]
    is_static: bool,
    expiry: u64,
    cache: u64,
    canonical: &'a str,
    site_name: &'a str,
    home_url: &'a str,
}

/// Metadata defaults overridden by the resource metadata file.
async fn load_metadata(
    store: &dyn ResourceStore,
    site: &SiteConfig,
    key: &str,
    canonical: &str,
) -> AppResult<Value> {
    let defaults = PageMetadata {
        title: "",
        navigation: "",
        description: "",
        keywords: "",
        author: &site.author,
        compression: true,
        is_static: true,
        expiry: 0,
        cache: 0,
        canonical,
        site_name: &site.name,
        home_url: &site.home_url,
    };
    let mut metadata = serde_json::to_value(defaults)?;

    if let Some(text) = store.read_text(&layout::metadata(key)).await? {
        let overrides: Map<String, Value> = toml::from_str(&text)?;
        if let Value::Object(fields) = &mut metadata {
            fields.extend(overrides);
        }
    }
    Ok(metadata)
}

/// `[{name, uri}]` for every segment of `uri`.
fn breadcrumb(uri: &str) -> Value {
    let mut trail = String::new();
    let items: Vec<Value> = uri
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            trail.push('/');
            trail.push_str(segment);
            json!({ "name": segment, "uri": trail })
        })
        .collect();
    Value::Array(items)
}
