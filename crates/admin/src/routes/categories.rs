//! Category management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::models::{Category, CategoryUpdate, NewCategory, ProductQuery};
use spice_hub_core::{CategoryId, PublishStatus};

use crate::filters;
use crate::forms::{checked, non_blank};
use crate::middleware::RequireAdmin;
use crate::views::{Layout, SelectOption};

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub featured: bool,
    pub products: usize,
    pub image: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryRow>,
}

/// Category listing with product counts.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin) -> CategoriesIndexTemplate {
    let query = ProductQuery::default();
    let (categories, products) = tokio::join!(
        admin.api.list_categories(),
        admin.api.list_products(&query),
    );
    let categories = admin.or_default(categories, "Failed to load categories.").await;
    let products = admin.or_default(products, "Failed to load products.").await;

    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            status: c.status.as_str().to_string(),
            featured: c.is_featured,
            products: products.iter().filter(|p| p.category_id == c.id).count(),
            image: c.image.clone(),
        })
        .collect();
    CategoriesIndexTemplate {
        categories: rows,
        layout: admin.layout("/categories").await,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: Option<String>,
}

impl CategoryForm {
    fn validated(&self) -> Result<(String, PublishStatus), String> {
        let name = non_blank(Some(&self.name)).ok_or_else(|| "Name is required.".to_string())?;
        let status = match non_blank(self.status.as_deref()) {
            Some(s) => s.parse().map_err(|_| format!("Unknown status \"{s}\"."))?,
            None => PublishStatus::default(),
        };
        Ok((name, status))
    }

    /// # Errors
    ///
    /// Returns a message if the name is blank or the status unknown.
    pub fn into_new(self) -> Result<NewCategory, String> {
        let (name, status) = self.validated()?;
        Ok(NewCategory {
            name,
            status,
            is_featured: checked(self.is_featured.as_deref()),
            image: non_blank(self.image.as_deref()),
            description: non_blank(self.description.as_deref()),
        })
    }

    /// # Errors
    ///
    /// Returns a message if the name is blank or the status unknown.
    pub fn into_update(self) -> Result<CategoryUpdate, String> {
        let (name, status) = self.validated()?;
        Ok(CategoryUpdate {
            name: Some(name),
            status: Some(status),
            is_featured: Some(checked(self.is_featured.as_deref())),
            image: non_blank(self.image.as_deref()),
            description: non_blank(self.description.as_deref()),
        })
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            status: Some(category.status.as_str().to_string()),
            image: category.image.clone(),
            description: category.description.clone(),
            is_featured: category.is_featured.then(|| "on".to_string()),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub form: CategoryForm,
    pub statuses: Vec<SelectOption>,
}

impl CategoryFormTemplate {
    async fn render(admin: &RequireAdmin, title: String, action: String, form: CategoryForm) -> Self {
        let status = form.status.clone().unwrap_or_default();
        Self {
            statuses: PublishStatus::ALL
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.as_str(), &status))
                .collect(),
            title,
            action,
            form,
            layout: admin.layout("/categories").await,
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn new_form(admin: RequireAdmin) -> CategoryFormTemplate {
    let form = CategoryForm {
        status: Some(PublishStatus::default().as_str().to_string()),
        ..CategoryForm::default()
    };
    CategoryFormTemplate::render(&admin, "New category".into(), "/categories".into(), form).await
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn create(admin: RequireAdmin, Form(form): Form<CategoryForm>) -> Redirect {
    let category = match form.into_new() {
        Ok(category) => category,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to("/categories/new");
        }
    };
    match admin.api.create_category(&category).await {
        Ok(created) => {
            admin.flash.success(format!("Created {}.", created.name)).await;
            Redirect::to("/categories")
        }
        Err(e) => {
            admin.report(&e, "Failed to create category.").await;
            Redirect::to("/categories/new")
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn edit_form(admin: RequireAdmin, Path(id): Path<CategoryId>) -> Response {
    match admin.api.get_category(id).await {
        Ok(category) => CategoryFormTemplate::render(
            &admin,
            format!("Edit {}", category.name),
            format!("/categories/{id}"),
            CategoryForm::from(&category),
        )
        .await
        .into_response(),
        Err(e) => {
            admin.report(&e, "Failed to load category.").await;
            Redirect::to("/categories").into_response()
        }
    }
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update(
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let edit = format!("/categories/{id}/edit");
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to(&edit);
        }
    };
    match admin.api.update_category(id, &update).await {
        Ok(category) => {
            admin.flash.success(format!("Saved {}.", category.name)).await;
            Redirect::to("/categories")
        }
        Err(e) => {
            admin.report(&e, "Failed to save category.").await;
            Redirect::to(&edit)
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete(admin: RequireAdmin, Path(id): Path<CategoryId>) -> Redirect {
    match admin.api.delete_category(id).await {
        Ok(_) => admin.flash.success("Category deleted.").await,
        Err(e) => admin.report(&e, "Failed to delete category.").await,
    }
    Redirect::to("/categories")
}
