//! End-to-end dispatch through the HTTP router.

mod common;

use axum::http::StatusCode;
use serde_json::Value;

use aspect_dispatch::models;
use common::*;

#[tokio::test]
async fn test_home_page() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_text(response).await;
    assert!(body.contains("<title>Home | Test Site</title>"));
    assert!(body.contains("<h2>Welcome</h2>"));
    assert!(body.contains("<h1><a href=\"/\">Aspect Dispatch</a></h1>"));
    assert!(body.contains("#login label"));
    assert!(body.contains("font-family:sans-serif"));
}

#[tokio::test]
async fn test_undefined_page_renders_not_found() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "text/html");
    let body = body_text(response).await;
    assert!(body.contains("Page not found"));
    assert!(body.contains("<code>/no/such/page</code>"));

    let lines = error_log_lines(log.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("/no/such/page,page /no/such/page"));
}

#[tokio::test]
async fn test_login_rejects_invalid_email() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/login,event?email=nobody&password=longenough").await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(content_type(&response), "application/json");

    let violation: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(violation["fieldId"], "email");
    assert_eq!(violation["type"], "format");
    assert_eq!(violation["label"], "E-mail");
    assert_eq!(violation["message"], "This is not a valid e-mail address");

    // Rejected parameters are not errors
    assert!(error_log_lines(log.path()).is_empty());
}

#[tokio::test]
async fn test_login_requires_password() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/login,event?email=ann@example.com").await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    let violation: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(violation["fieldId"], "password");
    assert_eq!(violation["type"], "required");
}

#[tokio::test]
async fn test_login_accepted() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/login,event?email=ann@example.com&password=longenough").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(
        body_text(response).await.trim(),
        "<p class=\"welcome\">Welcome back, ann@example.com.</p>"
    );
}

#[tokio::test]
async fn test_missing_dialog_uses_error_dialog() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/settings,dialog").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await.trim(),
        "<div class=\"dialog error\">Not found: /settings,dialog</div>"
    );
}

#[tokio::test]
async fn test_ws_xml_payload() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/api/status,ws?format=xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/xml");

    let body = body_text(response).await;
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(body.contains("<uri>/api/status</uri>"));
    assert!(body.contains("<requestType>ws</requestType>"));
    assert!(body.contains("<format>xml</format>"));
    assert!(body.contains("<data/>"));
}

#[tokio::test]
async fn test_ws_error_payload() {
    let fixture = SiteFixture::new().file(
        "application/aspect/api/users.ws.aspect.toml",
        "[[aspect]]\nmethod = \"this.throwException\"\narguments = [\"InternalServerErrorException\", \"db down\"]\n",
    );
    let router = router(&fixture.config(), models::registry());

    let response = get(&router, "/api/users,ws").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type(&response), "application/json");

    let payload: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(payload["uri"], "/api/users");
    assert_eq!(payload["data"]["status"], 500);
    assert_eq!(payload["data"]["message"], "Internal Server Error");
    assert_eq!(payload["data"]["detail"], "db down");
}

#[tokio::test]
async fn test_invalid_parameters_redirect() {
    let fixture = SiteFixture::new()
        .file("application/view/page/signup.page.tera", "signed up")
        .file("application/form/signup.page.form.toml", "fields = [\"nickname\"]\n")
        .file(
            "application/field/nickname.field.toml",
            "required = { value = true, message = \"Pick a nickname\" }\n",
        )
        .file(
            "application/aspect/signup.page.aspect.toml",
            "[[aspect]]\nmethod = \"this.checkParameters\"\narguments = [\"/\"]\n\n\
             [[aspect]]\nmethod = \"this.throwException\"\narguments = [\"InternalServerErrorException\"]\n",
        );
    let router = router(&fixture.config(), models::registry());

    let response = get(&router, "/signup").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()["location"], "/");
    assert!(body_text(response).await.is_empty());

    // Valid input runs the following aspects
    let response = get(&router, "/signup?nickname=ann").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "<main>error</main>");
}

#[tokio::test]
async fn test_unknown_aspect_method_is_internal_error() {
    let fixture = SiteFixture::new()
        .file("application/view/event/poke.event.tera", "{\"ok\":true}")
        .file("application/aspect/poke.event.aspect.toml", "[[aspect]]\nmethod = \"this.model.poke\"\n");
    let router = router(&fixture.config(), models::registry());

    let response = get(&router, "/poke,event").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type(&response), "application/javascript");

    let lines = error_log_lines(&fixture.path().join("log"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("this.model.poke"));
}

#[tokio::test]
async fn test_event_content_type_inference() {
    let fixture = SiteFixture::new()
        .file("application/view/event/state.event.tera", "{\"count\": 3}")
        .file("application/view/event/script.event.tera", "console.log(1)")
        .file("application/view/event/fragment.event.tera", "<li>3</li>");
    let router = router(&fixture.config(), models::registry());

    for (uri, expected) in [
        ("/state,event", "application/json"),
        ("/script,event", "application/javascript"),
        ("/fragment,event", "text/html"),
    ] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(content_type(&response), expected, "{}", uri);
    }
}

#[tokio::test]
async fn test_static_assets() {
    let log = tempfile::tempdir().unwrap();
    let router = router(&sample_config(log.path()), models::registry());

    let response = get(&router, "/js/site.js?v=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/javascript");
    assert!(body_text(response).await.contains("addEventListener"));

    let response = get(&router, "/js/missing.js").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "text/javascript");

    let response = get(&router, "/../config.toml").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&router, "/tool.exe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&response), "text/html");
}
