//! Startup provisioning of the first admin account.

use gatehouse_db::models::user::CreateUser;
use gatehouse_db::{CredentialStore, StoreError};

use crate::auth::password::{hash_password_blocking, PasswordError};
use crate::config::BootstrapAdmin;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Create the configured admin if no user with that identifier exists.
///
/// An existing user is left untouched, including its password and admin flag.
/// Returns `true` if a user was created.
pub async fn ensure_bootstrap_admin(
    store: &dyn CredentialStore,
    admin: &BootstrapAdmin,
) -> Result<bool, ProvisionError> {
    if store.find_user(&admin.user_id).await?.is_some() {
        tracing::debug!(user_id = %admin.user_id, "Bootstrap admin already exists");
        return Ok(false);
    }

    let password_hash = hash_password_blocking(admin.password.clone()).await?;
    match store
        .create_user(&CreateUser {
            user_id: admin.user_id.clone(),
            password_hash,
            is_admin: true,
        })
        .await
    {
        Ok(_) => {
            tracing::info!(user_id = %admin.user_id, "Bootstrap admin created");
            Ok(true)
        }
        // Another instance won the race.
        Err(StoreError::Conflict(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
