//! User management commands.

use spice_hub_api::db::{RepositoryError, UserRepository};
use spice_hub_core::UserRole;

use super::{DatabaseSetupError, connect};

#[derive(Debug, thiserror::Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Setup(#[from] DatabaseSetupError),

    #[error("Invalid role: {0}. Valid roles: admin, user, guest")]
    InvalidRole(String),

    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Set the role of the account registered under `email`.
///
/// The account must already exist; it is created when the person first
/// signs in to the storefront.
///
/// # Errors
///
/// Returns an error if the role is unknown, no user has the email, or the
/// database fails.
pub async fn promote(email: &str, role: &str) -> Result<(), UserCommandError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| UserCommandError::InvalidRole(role.to_owned()))?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .set_role_by_email(email.trim(), role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserCommandError::UserNotFound(email.to_owned()),
            other => UserCommandError::Repository(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        role = %user.role,
        "User role updated"
    );
    Ok(())
}
