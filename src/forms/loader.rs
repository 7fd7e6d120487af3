//! Form data loading from the definition store.

use futures_util::future::try_join_all;

use crate::exception::{AppResult, Exception};
use crate::routing::RequestType;
use crate::store::{layout, ResourceStore};

use super::field::{FieldDefinition, FormData, FormManifest};

/// Load the form data of a resource.
///
/// Returns `Ok(None)` when the resource has no manifest. A manifest naming a
/// field without a definition is an error.
pub async fn load_form_data(
    store: &dyn ResourceStore,
    resource_key: &str,
    request_type: RequestType,
) -> AppResult<Option<FormData>> {
    let manifest = match store.read_text(&layout::form_manifest(resource_key, request_type)).await? {
        Some(text) => toml::from_str::<FormManifest>(&text)?,
        None => return Ok(None),
    };

    let fields = try_join_all(manifest.fields.iter().map(|name| load_field(store, name))).await?;

    let mut form = FormData::new();
    for (name, field) in manifest.fields.into_iter().zip(fields) {
        form.insert(name, field);
    }

    tracing::debug!(
        resource = %resource_key,
        request_type = %request_type,
        fields = form.len(),
        "Form data loaded"
    );
    Ok(Some(form))
}

async fn load_field(store: &dyn ResourceStore, name: &str) -> AppResult<FieldDefinition> {
    let text = store
        .read_text(&layout::field(name))
        .await?
        .ok_or_else(|| Exception::internal(format!("Missing field definition: {}", name)))?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_load_in_manifest_order() {
        let store = MemoryStore::new()
            .with_file("form/login.event.form.toml", r#"fields = ["password", "email"]"#)
            .with_file("field/email.field.toml", r#"label = "Email""#)
            .with_file("field/password.field.toml", r#"label = "Password""#);

        let form = load_form_data(&store, "/login", RequestType::Event).await.unwrap().unwrap();
        let names: Vec<_> = form.names().collect();
        assert_eq!(names, vec!["password", "email"]);
        assert_eq!(form.get("email").unwrap().label, "Email");
    }

    #[tokio::test]
    async fn test_missing_manifest_is_none() {
        let store = MemoryStore::new();
        let form = load_form_data(&store, "/login", RequestType::Page).await.unwrap();
        assert!(form.is_none());
    }

    #[tokio::test]
    async fn test_missing_field_is_an_error() {
        let store = MemoryStore::new().with_file("form/login.page.form.toml", r#"fields = ["ghost"]"#);
        let err = load_form_data(&store, "/login", RequestType::Page).await.unwrap_err();
        assert!(err.message().contains("ghost"));
        assert_eq!(err.status(), 500);
    }
}
