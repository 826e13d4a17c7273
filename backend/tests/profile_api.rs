use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use whowe::config::AppConfig;
use whowe::models::profile_models::{Profile, DEMO_MEMBER_ID};
use whowe::repositories::profile_repository::{
    InMemoryProfileRepository, ProfileRepository, RepositoryError,
};
use whowe::{router, AppState};

fn app_with(repository: Arc<dyn ProfileRepository>) -> Router {
    let state = AppState::new(AppConfig::default(), repository).unwrap();
    router(Arc::new(state))
}

fn demo_app() -> (Router, Arc<InMemoryProfileRepository>) {
    let repository = Arc::new(InMemoryProfileRepository::with_demo_profile());
    (app_with(repository.clone()), repository)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-member-id", DEMO_MEMBER_ID);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn profile_requires_member_header() {
    let (app, _) = demo_app();
    let response = app
        .oneshot(Request::get("/api/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_member_is_not_found() {
    let (app, _) = demo_app();
    let response = app
        .oneshot(
            Request::get("/api/profile")
                .header("x-member-id", "M000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_and_save_profile() {
    let (app, repository) = demo_app();

    let (status, view) = call(&app, Method::GET, "/api/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["active_edit"], "none");
    assert_eq!(view["map_link"], "/map?city=New+York&state=NY&country=USA");

    let (status, _) = call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "profile"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, view) = call(
        &app,
        Method::PATCH,
        "/api/profile/field",
        Some(json!({"path": "location.city", "value": "Fenton"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["profile"]["location"]["city"], "Fenton");

    let (status, view) = call(&app, Method::POST, "/api/profile/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["active_edit"], "none");
    assert_eq!(view["error"], Value::Null);

    let stored = repository.get(DEMO_MEMBER_ID).unwrap().unwrap();
    assert_eq!(stored.location.city, "Fenton");

    let (_, link) = call(&app, Method::GET, "/api/profile/map-link", None).await;
    assert_eq!(link["url"], "/map?city=Fenton&state=NY&country=USA");
}

#[tokio::test]
async fn missing_country_keeps_edit_mode() {
    let (app, repository) = demo_app();
    call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "profile"}))).await;
    call(
        &app,
        Method::PATCH,
        "/api/profile/field",
        Some(json!({"path": "location.country", "value": ""})),
    )
    .await;

    let (status, body) = call(&app, Method::POST, "/api/profile/submit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Country is required");

    let (_, view) = call(&app, Method::GET, "/api/profile", None).await;
    assert_eq!(view["active_edit"], "profile");
    assert_eq!(view["error"], "Country is required");
    assert_eq!(repository.get(DEMO_MEMBER_ID).unwrap().unwrap().location.country, "USA");
}

#[tokio::test]
async fn second_tab_edit_is_rejected() {
    let (app, _) = demo_app();
    call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "profile"}))).await;
    let (status, body) = call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "account"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Finish editing the profile tab first");

    let (status, view) = call(&app, Method::POST, "/api/profile/tab", Some(json!({"tab": "account"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["active_tab"], "account");
    assert_eq!(view["active_edit"], "profile");
}

#[tokio::test]
async fn avatar_upload_then_cancel_restores_committed_avatar() {
    let (app, _) = demo_app();
    call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "profile"}))).await;

    let boundary = "XBOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary
    );
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/profile/avatar")
                .header("x-member-id", DEMO_MEMBER_ID)
                .header("content-type", format!("multipart/form-data; boundary={}", boundary))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let view: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(view["avatar_preview"], "data:image/png;base64,UE5HREFUQQ==");
    assert_eq!(view["avatar_pending"], false);

    let (_, view) = call(&app, Method::POST, "/api/profile/cancel", None).await;
    assert_eq!(view["avatar_preview"], "/default-avatar.png");
    assert_eq!(view["active_edit"], "none");
}

#[tokio::test]
async fn account_email_change_is_saved() {
    let (app, repository) = demo_app();
    call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "account"}))).await;
    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/profile/field",
        Some(json!({"path": "subscriptionPlan", "value": "Pro"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(
        &app,
        Method::PATCH,
        "/api/profile/field",
        Some(json!({"path": "email", "value": "john@whowe.io"})),
    )
    .await;
    let (status, view) = call(&app, Method::POST, "/api/profile/account/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["profile"]["email"], "john@whowe.io");
    assert_eq!(repository.get(DEMO_MEMBER_ID).unwrap().unwrap().email, "john@whowe.io");
}

struct FailingRepository;

impl ProfileRepository for FailingRepository {
    fn get(&self, _member_id: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(Some(Profile::demo()))
    }

    fn save(&self, _profile: &Profile) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }
}

#[tokio::test]
async fn failed_save_rolls_back_to_edit_mode() {
    let app = app_with(Arc::new(FailingRepository));
    call(&app, Method::POST, "/api/profile/edit", Some(json!({"tab": "profile"}))).await;
    call(
        &app,
        Method::PATCH,
        "/api/profile/field",
        Some(json!({"path": "nickname", "value": "JD"})),
    )
    .await;

    let (status, _) = call(&app, Method::POST, "/api/profile/submit", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, view) = call(&app, Method::GET, "/api/profile", None).await;
    assert_eq!(view["active_edit"], "profile");
    assert_eq!(view["profile"]["nickname"], "JD");
    assert_eq!(view["error"], "Storage unavailable: disk full");
}

#[tokio::test]
async fn form_describes_country_select() {
    let (app, _) = demo_app();
    let (status, form) = call(&app, Method::GET, "/api/profile/form", None).await;
    assert_eq!(status, StatusCode::OK);
    let country = form["profile"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == "location.country")
        .unwrap();
    assert_eq!(country["kind"]["type"], "select");
    assert_eq!(country["kind"]["options"][0]["value"], "USA");
    assert_eq!(country["disabled"], true);
}
