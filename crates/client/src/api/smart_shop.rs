//! Meal kits and health bundles.

use spice_hub_core::models::{
    Detail, HealthCategory, HealthCategoryUpdate, Meal, MealUpdate, NewHealthCategory, NewMeal,
};
use spice_hub_core::{HealthCategoryId, MealId};

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// Active meals.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_meals(&self) -> Result<Vec<Meal>, ClientError> {
        self.get("/meals/meals").await
    }

    /// Every meal, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_all_meals(&self) -> Result<Vec<Meal>, ClientError> {
        self.get("/meals/meals/all").await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the meal does not exist.
    pub async fn get_meal(&self, id: MealId) -> Result<Meal, ClientError> {
        self.get(&format!("/meals/meals/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, ClientError> {
        self.post("/meals/meals", meal).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the meal does not exist.
    pub async fn update_meal(&self, id: MealId, update: &MealUpdate) -> Result<Meal, ClientError> {
        self.put(&format!("/meals/meals/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the meal does not exist.
    pub async fn delete_meal(&self, id: MealId) -> Result<Detail, ClientError> {
        self.delete(&format!("/meals/meals/{id}")).await
    }

    /// Active health categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_health_categories(&self) -> Result<Vec<HealthCategory>, ClientError> {
        self.get("/health/health").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_all_health_categories(&self) -> Result<Vec<HealthCategory>, ClientError> {
        self.get("/health/health/all").await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the category does not exist.
    pub async fn get_health_category(&self, id: HealthCategoryId) -> Result<HealthCategory, ClientError> {
        self.get(&format!("/health/health/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_health_category(
        &self,
        category: &NewHealthCategory,
    ) -> Result<HealthCategory, ClientError> {
        self.post("/health/health", category).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the category does not exist.
    pub async fn update_health_category(
        &self,
        id: HealthCategoryId,
        update: &HealthCategoryUpdate,
    ) -> Result<HealthCategory, ClientError> {
        self.put(&format!("/health/health/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the category does not exist.
    pub async fn delete_health_category(&self, id: HealthCategoryId) -> Result<Detail, ClientError> {
        self.delete(&format!("/health/health/{id}")).await
    }
}
