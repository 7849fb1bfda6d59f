use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use ingest::{Classifier, ClassifierError, ImagePayload};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use storage::dto::category::UpsertCategoryRequest;
use storage::dto::common::PageRequest;
use storage::error::{Result as StorageResult, StorageError};
use storage::memory::InMemoryStore;
use storage::models::{NewWasteScan, RankedProfile, UserProfile, WasteCategory, WasteScan};
use storage::services::resolver::UnknownCategoryPolicy;
use storage::store::{CategoryStore, LedgerStore, ProfileStore, ScanStore};
use tower::ServiceExt;
use uuid::Uuid;
use web::{
    AppState, create_app,
    middleware::{
        auth::ApiKeys,
        session::{Claims, JwtIdentityProvider},
    },
};

const SECRET: &str = "test-secret";
const API_KEY: &str = "operator-key";
const BOUNDARY: &str = "greencity-boundary";

struct StubClassifier(Option<&'static str>);

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _image: &ImagePayload) -> Result<String, ClassifierError> {
        match self.0 {
            Some(label) => Ok(label.to_string()),
            None => Err(ClassifierError::Rejected("cannot identify image file".to_string())),
        }
    }
}

async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .upsert_category(&UpsertCategoryRequest {
            name: "plastic".to_string(),
            description: Some("Bottles and packaging".to_string()),
            disposal_instructions: "Rinse and place in the plastic bin".to_string(),
            environmental_impact: "High".to_string(),
            points_value: 50,
            co2_impact_kg: Decimal::new(12, 1),
            icon_name: "recycle".to_string(),
            color: "#34D399".to_string(),
        })
        .await
        .unwrap();
    store
}

/// Delegates to the in-memory store but cannot update profile totals
struct CreditOutage(Arc<InMemoryStore>);

#[async_trait]
impl CategoryStore for CreditOutage {
    async fn find_category_by_name(&self, name: &str) -> StorageResult<Option<WasteCategory>> {
        self.0.find_category_by_name(name).await
    }

    async fn list_categories(&self) -> StorageResult<Vec<WasteCategory>> {
        self.0.list_categories().await
    }

    async fn upsert_category(
        &self,
        request: &UpsertCategoryRequest,
    ) -> StorageResult<WasteCategory> {
        self.0.upsert_category(request).await
    }
}

#[async_trait]
impl ScanStore for CreditOutage {
    async fn insert_scan(&self, scan: &NewWasteScan) -> StorageResult<WasteScan> {
        self.0.insert_scan(scan).await
    }

    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> StorageResult<(Vec<WasteScan>, i64)> {
        self.0.list_scans_for_user(user_id, page).await
    }
}

#[async_trait]
impl ProfileStore for CreditOutage {
    async fn credit_scan(&self, _user_id: Uuid, _scan_id: Uuid) -> StorageResult<UserProfile> {
        Err(StorageError::Unavailable("profile update timed out".to_string()))
    }

    async fn find_profile(&self, user_id: Uuid) -> StorageResult<Option<UserProfile>> {
        self.0.find_profile(user_id).await
    }

    async fn set_username(&self, user_id: Uuid, username: &str) -> StorageResult<UserProfile> {
        self.0.set_username(user_id, username).await
    }

    async fn top_profiles(&self, limit: i64) -> StorageResult<Vec<RankedProfile>> {
        self.0.top_profiles(limit).await
    }

    async fn rank_of(&self, user_id: Uuid) -> StorageResult<Option<RankedProfile>> {
        self.0.rank_of(user_id).await
    }

    async fn recompute_totals(&self, user_id: Uuid) -> StorageResult<UserProfile> {
        self.0.recompute_totals(user_id).await
    }
}

fn app(store: Arc<InMemoryStore>, label: Option<&'static str>) -> Router {
    app_with(store, label)
}

fn app_with(store: Arc<dyn LedgerStore>, label: Option<&'static str>) -> Router {
    let state = AppState {
        store,
        classifier: Arc::new(StubClassifier(label)),
        identity: Arc::new(JwtIdentityProvider::new(SECRET)),
        policy: UnknownCategoryPolicy::Reject,
    };
    create_app(state, ApiKeys::from_comma_separated(API_KEY))
}

fn token(user_id: Uuid) -> String {
    encode(
        &Header::default(),
        &Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn multipart_body(extra: &[(&str, &str)]) -> Body {
    let mut body = String::new();
    for (name, value) in extra {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bottle.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{BOUNDARY}--\r\n"
    ));
    Body::from(body)
}

fn multipart_request(uri: &str, bearer: Option<&str>, extra: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    builder.body(multipart_body(extra)).unwrap()
}

fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Records one plastic scan (50 points) for the user through the API
async fn record_plastic(store: &Arc<InMemoryStore>, user_id: Uuid) {
    let response = app(store.clone(), None)
        .oneshot(json_request(
            "POST",
            "/api/scans",
            Some(&token(user_id)),
            json!({ "label": "plastic" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = app(seeded_store().await, None)
        .oneshot(get("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_capture_records_scan() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();

    let response = app(store.clone(), Some("plastic"))
        .oneshot(multipart_request(
            "/api/scans/capture",
            Some(&token(user_id)),
            &[("location", "Main St")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["prediction"]["category"], "plastic");
    assert_eq!(body["prediction"]["resolution"], "found");
    assert_eq!(body["receipt"]["scan"]["location"], "Main St");
    assert_eq!(body["receipt"]["profile"]["total_points"], 50);

    let profile = store.find_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.total_co2_saved_kg, Decimal::new(12, 1));
}

#[tokio::test]
async fn test_capture_without_session_is_unauthorized() {
    let store = seeded_store().await;

    let response = app(store.clone(), Some("plastic"))
        .oneshot(multipart_request("/api/scans/capture", None, &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.top_profiles(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() {
    let response = app(seeded_store().await, Some("plastic"))
        .oneshot(multipart_request("/api/scans/capture", Some("forged.token.value"), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_classifier_failure_is_bad_gateway() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();

    let response = app(store.clone(), None)
        .oneshot(multipart_request(
            "/api/scans/capture",
            Some(&token(user_id)),
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(store.scan_count(user_id).await, 0);
}

#[tokio::test]
async fn test_unknown_label_is_unprocessable() {
    let response = app(seeded_store().await, Some("styrofoam"))
        .oneshot(multipart_request("/api/predictions", None, &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["label"], "styrofoam");
}

#[tokio::test]
async fn test_prediction_writes_nothing() {
    let store = seeded_store().await;

    let response = app(store.clone(), Some("plastic"))
        .oneshot(multipart_request("/api/predictions", None, &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["category_details"]["points_value"], 50);
    assert!(store.top_profiles(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_idempotency_key_conflicts() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);
    let payload = json!({ "label": "plastic", "idempotency_key": "scan-001" });

    let first = app(store.clone(), None)
        .oneshot(json_request("POST", "/api/scans", Some(&bearer), payload.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app(store.clone(), None)
        .oneshot(json_request("POST", "/api/scans", Some(&bearer), payload))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    assert_eq!(store.scan_count(user_id).await, 1);
    let profile = store.find_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.total_points, 50);
}

#[tokio::test]
async fn test_failed_credit_returns_pending_scan() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);
    let outage: Arc<dyn LedgerStore> = Arc::new(CreditOutage(store.clone()));

    let response = app_with(outage.clone(), Some("plastic"))
        .oneshot(multipart_request("/api/scans/capture", Some(&bearer), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "partial_commit");
    assert_eq!(body["scan"]["user_id"], user_id.to_string());
    assert_eq!(body["scan"]["points_awarded"], 50);

    let response = app_with(outage, None)
        .oneshot(json_request(
            "POST",
            "/api/scans",
            Some(&bearer),
            json!({ "label": "plastic" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await["status"], "partial_commit");

    assert_eq!(store.scan_count(user_id).await, 2);
    assert!(store.find_profile(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_capture_fields_are_bad_request() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);
    let long_key = "k".repeat(300);

    let response = app(store.clone(), Some("plastic"))
        .oneshot(multipart_request(
            "/api/scans/capture",
            Some(&bearer),
            &[("idempotency_key", &long_key)],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app(store.clone(), Some("plastic"))
        .oneshot(multipart_request(
            "/api/scans/capture",
            Some(&bearer),
            &[("image_url", "not a url")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app(store.clone(), None)
        .oneshot(json_request(
            "POST",
            "/api/scans",
            Some(&bearer),
            json!({ "label": "plastic", "idempotency_key": long_key }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.scan_count(user_id).await, 0);
}

#[tokio::test]
async fn test_blank_capture_key_is_not_a_key() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);

    for _ in 0..2 {
        let response = app(store.clone(), Some("plastic"))
            .oneshot(multipart_request(
                "/api/scans/capture",
                Some(&bearer),
                &[("idempotency_key", ""), ("location", "  ")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(body["receipt"]["scan"]["idempotency_key"].is_null());
        assert!(body["receipt"]["scan"]["location"].is_null());
    }

    assert_eq!(store.scan_count(user_id).await, 2);
    let profile = store.find_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.total_points, 100);
}

#[tokio::test]
async fn test_invalid_scan_payload_is_bad_request() {
    let response = app(seeded_store().await, None)
        .oneshot(json_request(
            "POST",
            "/api/scans",
            Some(&token(Uuid::new_v4())),
            json!({ "label": "plastic", "confidence": 1.7 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_and_standing() {
    let store = seeded_store().await;
    let leader = Uuid::new_v4();
    let runner_up = Uuid::new_v4();
    record_plastic(&store, leader).await;
    record_plastic(&store, leader).await;
    record_plastic(&store, runner_up).await;

    let response = app(store.clone(), None)
        .oneshot(get("/api/leaderboard?limit=5", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["user_id"], leader.to_string());
    assert_eq!(entries[0]["rank"], 1);

    let response = app(store.clone(), None)
        .oneshot(get("/api/leaderboard/me", Some(&token(runner_up))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["rank"], 2);

    let response = app(store.clone(), None)
        .oneshot(get(
            &format!("/api/leaderboard/users/{}", Uuid::new_v4()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app(store, None)
        .oneshot(get("/api/leaderboard?limit=0", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_keeps_totals() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    record_plastic(&store, user_id).await;

    let response = app(store.clone(), None)
        .oneshot(json_request(
            "PUT",
            "/api/profiles/me",
            Some(&token(user_id)),
            json!({ "username": "recycler" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "recycler");
    assert_eq!(body["total_points"], 50);
}

#[tokio::test]
async fn test_operator_routes_need_api_key() {
    let store = seeded_store().await;
    let category = json!({
        "name": "glass",
        "disposal_instructions": "Glass container",
        "environmental_impact": "Medium",
        "points_value": 30,
        "co2_impact_kg": "0.8",
        "icon_name": "wine",
        "color": "#10B981"
    });

    let response = app(store.clone(), None)
        .oneshot(json_request("POST", "/api/categories", None, category.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(store.clone(), None)
        .oneshot(json_request("POST", "/api/categories", Some(API_KEY), category))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(store, None)
        .oneshot(get("/api/categories/glass", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["points_value"], 30);
}

#[tokio::test]
async fn test_reconcile_route() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);

    let response = app(store.clone(), None)
        .oneshot(json_request(
            "POST",
            "/api/scans",
            Some(&bearer),
            json!({ "label": "plastic" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/profiles/{}/reconcile", user_id);
    let response = app(store.clone(), None)
        .oneshot(json_request("POST", &uri, Some(API_KEY), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["total_points"], 50);

    let response = app(store, None)
        .oneshot(json_request("POST", &uri, Some(&bearer), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_scan_history_paginates() {
    let store = seeded_store().await;
    let user_id = Uuid::new_v4();
    let bearer = token(user_id);

    for _ in 0..3 {
        let response = app(store.clone(), None)
            .oneshot(json_request(
                "POST",
                "/api/scans",
                Some(&bearer),
                json!({ "label": "plastic" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app(store, None)
        .oneshot(get("/api/scans?page=1&page_size=2", Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_items"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
}
