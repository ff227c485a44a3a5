//! First-run admin account.
//!
//! On startup the server makes sure the account named by [`AdminConfig`]
//! exists. With `ADMIN_UPDATE=1` an existing account is overwritten with the
//! configured name and password, and an untouched `admin@local` account left
//! by an earlier run is renamed to the configured email instead of creating a
//! second admin.

use renotracker_db::models::user::{CreateUser, User};
use renotracker_db::repositories::UserRepo;
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::config::{AdminConfig, DEFAULT_ADMIN_EMAIL};
use crate::error::{AppError, AppResult};

/// What [`ensure_admin_user`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No admin existed; one was created.
    Created,
    /// The default `admin@local` account was moved to the configured email.
    Migrated,
    /// The configured account existed and was updated.
    Updated,
    /// Nothing to do.
    Unchanged,
}

fn credentials(config: &AdminConfig) -> AppResult<CreateUser> {
    let password_hash = hash_password(&config.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    Ok(CreateUser {
        email: config.email.clone(),
        password_hash,
        display_name: config.display_name.clone(),
    })
}

async fn overwrite(pool: &PgPool, user: &User, config: &AdminConfig) -> AppResult<()> {
    UserRepo::update_credentials(pool, user.id, &credentials(config)?).await?;
    Ok(())
}

/// Create or refresh the bootstrap admin account.
pub async fn ensure_admin_user(pool: &PgPool, config: &AdminConfig) -> AppResult<BootstrapOutcome> {
    if let Some(user) = UserRepo::find_by_email(pool, &config.email).await? {
        if !config.update {
            return Ok(BootstrapOutcome::Unchanged);
        }
        overwrite(pool, &user, config).await?;
        tracing::info!(user_id = user.id, email = %config.email, "Admin account updated");
        return Ok(BootstrapOutcome::Updated);
    }

    let default_user = if config.email == DEFAULT_ADMIN_EMAIL {
        None
    } else {
        UserRepo::find_by_email(pool, DEFAULT_ADMIN_EMAIL).await?
    };

    match default_user {
        Some(user) if config.update => {
            overwrite(pool, &user, config).await?;
            tracing::info!(
                user_id = user.id,
                from = DEFAULT_ADMIN_EMAIL,
                to = %config.email,
                "Default admin account migrated"
            );
            Ok(BootstrapOutcome::Migrated)
        }
        Some(user) => {
            tracing::warn!(
                user_id = user.id,
                email = %config.email,
                "Configured admin does not exist but {DEFAULT_ADMIN_EMAIL} does; set ADMIN_UPDATE=1 to migrate it"
            );
            Ok(BootstrapOutcome::Unchanged)
        }
        None => {
            let user = UserRepo::create(pool, &credentials(config)?).await?;
            tracing::info!(user_id = user.id, email = %user.email, "Admin account created");
            Ok(BootstrapOutcome::Created)
        }
    }
}
