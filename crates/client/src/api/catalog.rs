//! Categories, products, reviews, and sales.

use reqwest::Method;

use spice_hub_core::models::{
    Category, CategoryUpdate, Detail, NewCategory, NewProduct, NewReview, NewSale, Product,
    ProductQuery, ProductUpdate, Review, ReviewUpdate, Sale, SaleUpdate,
};
use spice_hub_core::{CategoryId, ProductId, ReviewId, SaleId, UserId};

use super::{ApiClient, read_json};
use crate::error::ClientError;

impl ApiClient {
    // -- Categories --

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("/category/categories").await
    }

    /// Category with its product summaries.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the category does not exist.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ClientError> {
        self.get(&format!("/category/categories/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the name is taken.
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ClientError> {
        self.post("/category/categories", category).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, ClientError> {
        self.put(&format!("/category/categories/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the category does not exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<Detail, ClientError> {
        self.delete(&format!("/category/categories/{id}")).await
    }

    // -- Products --

    /// List products, filtered server-side by `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError> {
        let url = self.url_with_query(
            "/products/products",
            &[
                ("category_id", query.category_id.map(|id| id.to_string())),
                ("featured", query.featured.map(|b| b.to_string())),
                ("on_sale", query.on_sale.map(|b| b.to_string())),
                ("search", query.search.clone()),
            ],
        )?;
        read_json(self.request(Method::GET, &url)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product does not exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        self.get(&format!("/products/products/{id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the category does not exist.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ClientError> {
        self.post("/products/products", product).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ClientError> {
        self.put(&format!("/products/products/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<Detail, ClientError> {
        self.delete(&format!("/products/products/{id}")).await
    }

    // -- Reviews --

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_reviews(&self) -> Result<Vec<Review>, ClientError> {
        self.get("/reviews/reviews").await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the review does not exist.
    pub async fn get_review(&self, id: ReviewId) -> Result<Review, ClientError> {
        self.get(&format!("/reviews/reviews/{id}")).await
    }

    /// Reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, ClientError> {
        self.get(&format!("/reviews/reviews/product/{product_id}"))
            .await
    }

    /// Reviews written by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>, ClientError> {
        self.get(&format!("/reviews/reviews/user/{user_id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product or user does not exist.
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ClientError> {
        self.post("/reviews/reviews", review).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the review does not exist.
    pub async fn update_review(
        &self,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Review, ClientError> {
        self.put(&format!("/reviews/reviews/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the review does not exist.
    pub async fn delete_review(&self, id: ReviewId) -> Result<Detail, ClientError> {
        self.delete(&format!("/reviews/reviews/{id}")).await
    }

    // -- Sales --

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_sales(&self) -> Result<Vec<Sale>, ClientError> {
        self.get("/sales/sales").await
    }

    /// The running sale, or `None` when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn active_sale(&self) -> Result<Option<Sale>, ClientError> {
        match self.get("/sales/sales/active").await {
            Ok(sale) => Ok(Some(sale)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the sale does not exist.
    pub async fn get_sale(&self, id: SaleId) -> Result<Sale, ClientError> {
        self.get(&format!("/sales/sales/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the dates are out of order or a product is missing.
    pub async fn create_sale(&self, sale: &NewSale) -> Result<Sale, ClientError> {
        self.post("/sales/sales", sale).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the sale does not exist.
    pub async fn update_sale(&self, id: SaleId, update: &SaleUpdate) -> Result<Sale, ClientError> {
        self.put(&format!("/sales/sales/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the sale does not exist.
    pub async fn delete_sale(&self, id: SaleId) -> Result<Detail, ClientError> {
        self.delete(&format!("/sales/sales/{id}")).await
    }
}
