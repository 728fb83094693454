//! Integration tests for the JSON API
//!
//! The router runs against in-process datastores, so no PostgreSQL is needed.
//! The PostgreSQL store is only pointed at a closed port.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use stand_capacity::config::{AppConfig, DatabaseConfig};
use stand_capacity::create_router;
use stand_capacity::db::{Datastore, DbError, Listing, PgStore};
use stand_capacity::AppState;

const DRIVER_MESSAGE: &str = "connect ECONNREFUSED 127.0.0.1:5432";

/// Rows are kept in insertion order and sorted on read, like `ORDER BY`.
#[derive(Default)]
struct StubStore {
    down: bool,
    stands: Vec<Value>,
    capacity_plans: Vec<Value>,
    queries: AtomicUsize,
}

impl StubStore {
    fn down() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    fn refused() -> DbError {
        DbError::from(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            DRIVER_MESSAGE,
        )))
    }
}

#[async_trait]
impl Datastore for StubStore {
    async fn probe(&self) -> Result<(), DbError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(Self::refused());
        }
        Ok(())
    }

    async fn list(&self, listing: Listing) -> Result<Vec<Value>, DbError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(Self::refused());
        }
        let mut rows = match listing {
            Listing::Stands => self.stands.clone(),
            Listing::CapacityPlans => self.capacity_plans.clone(),
        };
        let key = listing.sort_key();
        rows.sort_by_key(|row| row[key].as_i64());
        Ok(rows)
    }
}

/// Datastore whose listing panics, to exercise the last-resort boundary.
struct PanickingStore;

#[async_trait]
impl Datastore for PanickingStore {
    async fn probe(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn list(&self, _listing: Listing) -> Result<Vec<Value>, DbError> {
        panic!("row decoding blew up: internal detail");
    }
}

fn app_with(store: Arc<dyn Datastore>) -> Router {
    create_router(AppState::new(AppConfig::default(), store))
}

fn app_with_config(config: AppConfig, store: Arc<dyn Datastore>) -> Router {
    create_router(AppState::new(config, store))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_connected() {
    let (status, json) = get(app_with(Arc::new(StubStore::default())), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");

    let timestamp = json["timestamp"].as_str().unwrap();
    let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp)
        .unwrap()
        .with_timezone(&Utc);
    assert!((Utc::now() - parsed).num_seconds().abs() < 60);
}

#[tokio::test]
async fn test_health_is_200_when_database_down() {
    let (status, json) = get(app_with(Arc::new(StubStore::down())), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], format!("error: {}", DRIVER_MESSAGE));
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_health_reports_refused_postgres_promptly() {
    // Pool options left at the driver defaults
    let config = DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..DatabaseConfig::default()
    };
    let store = PgStore::connect_lazy(&config);
    let app = app_with(Arc::new(store.clone()));

    let started = Instant::now();
    let (status, json) = get(app.clone(), "/api/health").await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(status, StatusCode::OK);
    let database = json["database"].as_str().unwrap();
    assert!(database.starts_with("error: "));
    assert!(database.len() > "error: ".len());
    assert!(!database.contains("pool timed out"));

    let started = Instant::now();
    let (status, json) = get(app, "/api/stands").await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!json["error"].as_str().unwrap().contains("pool timed out"));

    store.close().await;
}

#[tokio::test]
async fn test_descriptor_is_invariant() {
    let store: Arc<dyn Datastore> = Arc::new(StubStore::down());
    let (status, first) = get(app_with(store.clone()), "/api").await;
    let (_, second) = get(app_with(store), "/api").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["message"], "Stand Capacity Planner API");
    assert_eq!(
        first["endpoints"],
        json!({
            "health": "/api/health",
            "stands": "/api/stands",
            "capacity": "/api/capacity",
        })
    );
}

#[tokio::test]
async fn test_descriptor_issues_no_queries() {
    let store = Arc::new(StubStore::default());
    get(app_with(store.clone()), "/api").await;
    assert_eq!(store.queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_stands_table() {
    let (status, json) = get(app_with(Arc::new(StubStore::default())), "/api/stands").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_stands_sorted_by_stand_id() {
    let store = StubStore {
        stands: vec![
            json!({ "stand_id": 2, "name": "B" }),
            json!({ "stand_id": 1, "name": "A" }),
        ],
        ..StubStore::default()
    };
    let (status, json) = get(app_with(Arc::new(store)), "/api/stands").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([
            { "stand_id": 1, "name": "A" },
            { "stand_id": 2, "name": "B" },
        ])
    );
}

#[tokio::test]
async fn test_capacity_sorted_by_id() {
    let store = StubStore {
        capacity_plans: vec![json!({ "id": 3 }), json!({ "id": 1 }), json!({ "id": 2 })],
        ..StubStore::default()
    };
    let (status, json) = get(app_with(Arc::new(store)), "/api/capacity").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
}

#[tokio::test]
async fn test_listing_issues_exactly_one_query() {
    let store = Arc::new(StubStore::default());
    get(app_with(store.clone()), "/api/stands").await;
    assert_eq!(store.queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_listings_fail_with_driver_message() {
    let store: Arc<dyn Datastore> = Arc::new(StubStore::down());

    for uri in ["/api/stands", "/api/capacity"] {
        let (status, json) = get(app_with(store.clone()), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(json["error"], DRIVER_MESSAGE, "{}", uri);
    }

    // service keeps answering after failures
    let (status, _) = get(app_with(store), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_listing_failure_without_verbose_errors() {
    let mut config = AppConfig::default();
    config.errors.verbose = false;
    let (status, json) = get(
        app_with_config(config, Arc::new(StubStore::down())),
        "/api/stands",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Database query failed");
}

#[tokio::test]
async fn test_panic_becomes_generic_error() {
    let app = app_with(Arc::new(PanickingStore));
    let (status, json) = get(app.clone(), "/api/stands").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Something went wrong!" }));

    // the router still serves requests afterwards
    let (status, _) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, json) = get(app_with(Arc::new(StubStore::default())), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn test_responses_are_not_cacheable_and_tagged() {
    let response = app_with(Arc::new(StubStore::default()))
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_frontend_origin_with_credentials() {
    let response = app_with(Arc::new(StubStore::default()))
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_rejects_other_origins() {
    let response = app_with(Arc::new(StubStore::default()))
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "http://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = app_with(Arc::new(StubStore::default()))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/stands")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
