use std::sync::{Mutex, MutexGuard, OnceLock};

use axum::body::{to_bytes, Body};

use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::services::admission;

/// Tests that touch process environment serialize behind this lock.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State over a lazy pool: nothing connects until a handler touches the
/// database, so routing-level tests run without a live Postgres.
pub(crate) fn build_state(settings: Settings) -> AppState {
    let db = sqlx::PgPool::connect_lazy(&settings.database().database_url()).expect("lazy pool");
    AppState::new(settings, db)
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

/// In-memory account row with the same creation invariants the registration
/// path applies.
pub(crate) fn fixture_user(role: UserRole, password: &str) -> User {
    let (approval_status, is_active) = admission::registration_state(role);

    User {
        id: format!("{}-fixture", role.as_str().to_lowercase()),
        email: "fixture@example.com".to_string(),
        full_name: "Fixture User".to_string(),
        password: password.to_string(),
        role,
        is_active,
        approval_status,
        assigned_examiner_id: None,
        created_at: primitive_now_utc(),
    }
}
