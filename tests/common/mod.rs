#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use ev_sales_api::{
    auth::{roles, Claims},
    config::AppConfig,
    db,
    events::{self, EventSender},
    services::AppServices,
    AppState,
};

const TEST_SECRET: &str = "a_test_secret_key_that_is_long_enough_for_validation";
const TEST_ISSUER: &str = "ev-sales-portal";

/// Test harness: the real router over a fresh file-backed SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("temp dir for test database");
        let db_path = db_dir.path().join("ev_sales_test.db");
        let cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            0,
        );

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };
        let router = ev_sales_api::app_router(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    pub fn dealer_token(&self) -> String {
        mint_token(&[roles::DEALER_STAFF])
    }

    pub fn evm_token(&self) -> String {
        mint_token(&[roles::EVM_STAFF])
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        json_body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match json_body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Seeds a vehicle row and returns its id.
    pub async fn seed_vehicle(&self, model_name: &str, status: &str) -> i32 {
        self.state
            .services
            .inventory
            .create_vehicle(model_name, status)
            .await
            .expect("seed vehicle")
            .id
    }
}

fn mint_token(role_names: &[&str]) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "1001".to_string(),
        name: Some("Integration Test Staff".to_string()),
        roles: role_names.iter().map(|r| r.to_string()).collect(),
        iss: TEST_ISSUER.to_string(),
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("mint test token")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn expect_status(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body = response_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}
