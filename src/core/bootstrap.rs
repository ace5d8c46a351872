use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Seed the first admin account so a fresh deployment can approve examiners.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin account creation");
        return Ok(());
    }

    let existing = repositories::users::find_by_email(state.db(), &admin.first_admin_email).await?;
    if existing.is_some() {
        tracing::info!("Default admin account already present");
        return Ok(());
    }

    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &admin.first_admin_email,
            full_name: &admin.first_admin_name,
            password: &admin.first_admin_password,
            role: UserRole::Admin,
            is_active: true,
            approval_status: None,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tracing::info!(email = %admin.first_admin_email, "Created default admin account");
    Ok(())
}
