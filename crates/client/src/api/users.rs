//! Users and shipping addresses.

use spice_hub_core::models::{
    Detail, NewShippingAddress, NewUser, ShippingAddress, ShippingAddressUpdate, User, UserUpdate,
};
use spice_hub_core::{ShippingAddressId, UserId};

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get("/users/users").await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the user does not exist.
    pub async fn get_user(&self, id: UserId) -> Result<User, ClientError> {
        self.get(&format!("/users/users/{id}")).await
    }

    /// Look a user up by the identity provider's subject id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no user has that id.
    pub async fn get_user_by_supabase_id(&self, supabase_id: &str) -> Result<User, ClientError> {
        self.get(&format!("/users/users/by-supabase/{supabase_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 if the email is registered.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        self.post("/users/users", user).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the user does not exist.
    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, ClientError> {
        self.put(&format!("/users/users/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the user does not exist.
    pub async fn delete_user(&self, id: UserId) -> Result<Detail, ClientError> {
        self.delete(&format!("/users/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 if the user already has an
    /// address.
    pub async fn create_shipping_address(
        &self,
        address: &NewShippingAddress,
    ) -> Result<ShippingAddress, ClientError> {
        self.post("/shippingAddresses/shipping", address).await
    }

    /// The user's address, or `None` if they have not saved one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_user_shipping_address(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShippingAddress>, ClientError> {
        match self
            .get(&format!("/shippingAddresses/shipping/user/{user_id}"))
            .await
        {
            Ok(address) => Ok(Some(address)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the address does not exist.
    pub async fn update_shipping_address(
        &self,
        id: ShippingAddressId,
        update: &ShippingAddressUpdate,
    ) -> Result<ShippingAddress, ClientError> {
        self.put(&format!("/shippingAddresses/shipping/{id}"), update)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the address does not exist.
    pub async fn delete_shipping_address(&self, id: ShippingAddressId) -> Result<Detail, ClientError> {
        self.delete(&format!("/shippingAddresses/shipping/{id}"))
            .await
    }
}
