//! Mirror identity-provider users into the backend user table.

use spice_hub_core::models::{NewUser, User};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::identity::IdentityUser;

/// Backend user for `identity`, created on first sign-in.
///
/// Looks the user up by subject id and creates them when missing. A
/// concurrent registration (400 `Email already registered`) is resolved by
/// fetching the user again.
///
/// # Errors
///
/// Returns an error if the lookup or creation fails for any other reason.
pub async fn ensure_backend_user(api: &ApiClient, identity: &IdentityUser) -> Result<User, ClientError> {
    match api.get_user_by_supabase_id(&identity.id).await {
        Ok(user) => return Ok(user),
        Err(ClientError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let new_user = new_user_from_identity(identity);
    match api.create_user(&new_user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, supabase_id = %user.supabase_id, "Backend user created");
            Ok(user)
        }
        Err(ClientError::Api { status: 400, message }) if message.contains("already registered") => {
            tracing::debug!(supabase_id = %identity.id, "User registered concurrently, re-fetching");
            api.get_user_by_supabase_id(&identity.id).await
        }
        Err(e) => Err(e),
    }
}

/// Backend registration payload for an identity-provider user.
#[must_use]
pub fn new_user_from_identity(identity: &IdentityUser) -> NewUser {
    let metadata = &identity.user_metadata;
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    NewUser {
        first_name: non_empty(&metadata.first_name).unwrap_or_else(|| "Unknown".to_string()),
        last_name: non_empty(&metadata.last_name).unwrap_or_else(|| "User".to_string()),
        supabase_id: identity.id.clone(),
        email: identity.email.clone().unwrap_or_default(),
        phone_number: non_empty(&metadata.phone),
        role: metadata
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::UserMetadata;
    use spice_hub_core::UserRole;

    fn identity(metadata: UserMetadata) -> IdentityUser {
        IdentityUser {
            id: "sb-7".to_string(),
            email: Some("achieng@example.com".to_string()),
            user_metadata: metadata,
        }
    }

    #[test]
    fn test_missing_names_fall_back() {
        let user = new_user_from_identity(&identity(UserMetadata {
            first_name: Some("  ".into()),
            ..UserMetadata::default()
        }));
        assert_eq!(user.first_name, "Unknown");
        assert_eq!(user.last_name, "User");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.supabase_id, "sb-7");
    }

    #[test]
    fn test_role_and_phone_from_metadata() {
        let user = new_user_from_identity(&identity(UserMetadata {
            first_name: Some("Achieng".into()),
            last_name: Some("Odhiambo".into()),
            role: Some("Admin".into()),
            phone: Some("0711000111".into()),
        }));
        assert_eq!(user.first_name, "Achieng");
        assert_eq!(user.last_name, "Odhiambo");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.phone_number.as_deref(), Some("0711000111"));
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        let user = new_user_from_identity(&identity(UserMetadata {
            role: Some("superuser".into()),
            ..UserMetadata::default()
        }));
        assert_eq!(user.role, UserRole::User);
    }
}
