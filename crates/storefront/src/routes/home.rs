//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::commerce::types::{ProductQuery, ProductSort};
use crate::filters;
use crate::routes::categories::CategoryCardView;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_PRODUCT_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<CategoryCardView>,
}

/// Display the home page: best sellers plus the category strip.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let query = ProductQuery {
        page: 1,
        limit: FEATURED_PRODUCT_COUNT,
        sort: Some(ProductSort::BestSelling),
        ..ProductQuery::default()
    };

    let featured = match state.commerce().get_products(&query).await {
        Ok(page) => page.items.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch featured products: {e}");
            Vec::new()
        }
    };

    let categories = match state.commerce().get_categories().await {
        Ok(categories) => categories.iter().map(CategoryCardView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        featured,
        categories,
    }
}
