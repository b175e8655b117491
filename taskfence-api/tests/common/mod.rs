/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test app construction against a real database
/// - Request builders and response body helpers
/// - Unique test email generation and cleanup
///
/// Integration tests need a running PostgreSQL instance; when `DATABASE_URL`
/// is not set, [`TestContext::try_new`] returns `None` and each test skips
/// itself.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use sqlx::PgPool;
use taskfence_api::app::{build_router, AppState};
use taskfence_api::config::{ApiConfig, Config, JwtConfig};
use taskfence_shared::auth::password::HashParams;
use taskfence_shared::db::migrations::run_migrations;
use taskfence_shared::db::pool::DatabaseConfig;
use taskfence_shared::models::user::User;
use uuid::Uuid;

/// Signing secret used by the test app
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing the app under test and its database handle
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a test context against the database named by `DATABASE_URL`
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite can run
    /// without a database (the test then skips).
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        dotenvy::dotenv().ok();

        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), test_config(url));
        let app = build_router(state);

        Ok(Some(TestContext { db, app }))
    }

    /// Deletes test users by id; cascades remove their sessions and tasks
    pub async fn cleanup_users(&self, user_ids: &[Uuid]) -> anyhow::Result<()> {
        for id in user_ids {
            User::delete(&self.db, *id).await?;
        }
        Ok(())
    }
}

/// Builds a test configuration by hand
///
/// Not `from_env`: tests should not depend on ambient JWT/argon2 variables,
/// and the low-cost hash keeps the suite fast.
fn test_config(url: String) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url,
            max_connections: 5,
            ..Default::default()
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            ttl_hours: 24,
        },
        hash: HashParams {
            m_cost: 8192,
            t_cost: 1,
            p_cost: 1,
        },
    }
}

/// Builds the app over a lazily-connected pool
///
/// `connect_lazy` opens no connection until a handler touches the store, so
/// tests that only exercise request-rejection paths (which short-circuit
/// before any query) can run without `DATABASE_URL`.
pub fn databaseless_app() -> axum::Router {
    let url = "postgresql://localhost/taskfence_unreachable".to_string();
    let db = PgPool::connect_lazy(&url).expect("lazy pool should build");

    build_router(AppState::new(db, test_config(url)))
}

/// Generates a unique email so test runs never collide
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

/// Builds a JSON request, optionally with a bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    builder.body(body).expect("request should build")
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
