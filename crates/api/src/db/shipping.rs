//! Shipping address repository. Each user has at most one address.

use sqlx::PgPool;

use spice_hub_core::models::{
    AddressOwner, NewShippingAddress, ShippingAddress, ShippingAddressUpdate,
};
use spice_hub_core::{ShippingAddressId, UserId};

use super::{RepositoryError, conflict_on_unique};

const ADDRESS_SELECT: &str = "SELECT a.id, a.country, a.city, a.area, a.user_id, \
     u.first_name, u.last_name, u.email, u.phone_number \
     FROM shipping_addresses a \
     LEFT JOIN users u ON u.id = a.user_id";

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: ShippingAddressId,
    country: String,
    city: String,
    area: String,
    user_id: UserId,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
}

impl From<AddressRow> for ShippingAddress {
    fn from(row: AddressRow) -> Self {
        let user = row.email.map(|email| AddressOwner {
            id: row.user_id,
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            email,
            phone_number: row.phone_number,
        });
        Self {
            id: row.id,
            country: row.country,
            city: row.city,
            area: row.area,
            user_id: row.user_id,
            user,
        }
    }
}

/// Repository for shipping address database operations.
pub struct ShippingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<ShippingAddress>, RepositoryError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.user_id = $1");
        let row = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(ShippingAddress::from))
    }

    async fn get(&self, id: ShippingAddressId) -> Result<ShippingAddress, RepositoryError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, AddressRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(ShippingAddress::from)
            .ok_or(RepositoryError::NotFound)
    }

    /// Save the user's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has one.
    pub async fn create(&self, address: &NewShippingAddress) -> Result<ShippingAddress, RepositoryError> {
        let id: ShippingAddressId = sqlx::query_scalar(
            "INSERT INTO shipping_addresses (country, city, area, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.area)
        .bind(address.user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Shipping address already exists for this user"))?;
        self.get(id).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn update(
        &self,
        id: ShippingAddressId,
        update: &ShippingAddressUpdate,
    ) -> Result<ShippingAddress, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shipping_addresses SET \
                country = COALESCE($2, country), \
                city = COALESCE($3, city), \
                area = COALESCE($4, area) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.country)
        .bind(&update.city)
        .bind(&update.area)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn delete(&self, id: ShippingAddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shipping_addresses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
