//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use greenbasket_core::CategoryId;

use crate::commerce::CommerceError;
use crate::commerce::types::{Category, ProductQuery, Subcategory};
use crate::filters;
use crate::routes::products::{PRODUCTS_PER_PAGE, ProductCardView};
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryCardView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&Category> for CategoryCardView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            image: category.image.clone(),
        }
    }
}

/// Subcategory display data for templates.
#[derive(Clone)]
pub struct SubcategoryView {
    pub name: String,
}

impl From<&Subcategory> for SubcategoryView {
    fn from(subcategory: &Subcategory) -> Self {
        Self {
            name: subcategory.name.clone(),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryCardView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub category: CategoryCardView,
    pub subcategories: Vec<SubcategoryView>,
    pub products: Vec<ProductCardView>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more_pages: bool,
}

/// Display category listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Response {
    match state.commerce().get_categories().await {
        Ok(categories) => {
            let categories: Vec<CategoryCardView> =
                categories.iter().map(CategoryCardView::from).collect();

            CategoriesIndexTemplate { categories }.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            CategoriesIndexTemplate {
                categories: Vec::new(),
            }
            .into_response()
        }
    }
}

/// Display category detail page with subcategories and products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Response {
    let category_id = CategoryId::new(id);

    let category = match state.commerce().get_category(&category_id).await {
        Ok(category) => category,
        Err(CommerceError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                CategoryShowTemplate {
                    category: CategoryCardView {
                        id: category_id.to_string(),
                        name: "Category Not Found".to_string(),
                        image: None,
                    },
                    subcategories: Vec::new(),
                    products: Vec::new(),
                    current_page: 1,
                    total_pages: 1,
                    has_more_pages: false,
                },
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch category {category_id}: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                CategoryShowTemplate {
                    category: CategoryCardView {
                        id: category_id.to_string(),
                        name: "Error".to_string(),
                        image: None,
                    },
                    subcategories: Vec::new(),
                    products: Vec::new(),
                    current_page: 1,
                    total_pages: 1,
                    has_more_pages: false,
                },
            )
                .into_response();
        }
    };

    // Subcategories are decoration; a failure must not blank the page
    let subcategories = match state.commerce().get_subcategories(&category_id).await {
        Ok(subcategories) => subcategories.iter().map(SubcategoryView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch subcategories for {category_id}: {e}");
            Vec::new()
        }
    };

    let product_query = ProductQuery {
        page: query.page.unwrap_or(1).max(1),
        limit: PRODUCTS_PER_PAGE,
        category: Some(category_id.clone()),
        ..ProductQuery::default()
    };
    let (products, current_page, total_pages, has_more_pages) =
        match state.commerce().get_products(&product_query).await {
            Ok(page) => (
                page.items.iter().map(ProductCardView::from).collect(),
                page.current_page,
                page.total_pages,
                page.has_more(),
            ),
            Err(e) => {
                tracing::warn!("Failed to fetch products for category {category_id}: {e}");
                (Vec::new(), 1, 1, false)
            }
        };

    CategoryShowTemplate {
        category: CategoryCardView::from(&category),
        subcategories,
        products,
        current_page,
        total_pages,
        has_more_pages,
    }
    .into_response()
}
