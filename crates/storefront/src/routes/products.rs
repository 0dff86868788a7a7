//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use greenbasket_core::{BrandId, CategoryId, ProductId};

use crate::commerce::CommerceError;
use crate::commerce::types::{Product, ProductQuery, ProductSort};
use crate::filters;
use crate::state::AppState;

/// Products per page for listing views.
pub const PRODUCTS_PER_PAGE: u32 = 24;

/// Number of related products shown on the detail page.
const RELATED_PRODUCT_COUNT: usize = 4;

// =============================================================================
// View Types
// =============================================================================

/// Compact product display data for listing grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub image: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub rating: String,
    pub category: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            image: product.image_cover.clone(),
            price: product.effective_price().to_string(),
            compare_at_price: product
                .has_discount()
                .then(|| product.list_price().to_string()),
            rating: format!("{:.1}", product.ratings_average),
            category: product.category.as_ref().map(|c| c.name.clone()),
            in_stock: product.in_stock(),
        }
    }
}

/// Full product display data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub rating: String,
    pub rating_count: i64,
    pub category: Option<LinkedRefView>,
    pub brand: Option<LinkedRefView>,
    pub in_stock: bool,
}

/// A linked reference to a category or brand.
#[derive(Clone)]
pub struct LinkedRefView {
    pub id: String,
    pub name: String,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            image: product.image_cover.clone(),
            images: product.images.clone(),
            price: product.effective_price().to_string(),
            compare_at_price: product
                .has_discount()
                .then(|| product.list_price().to_string()),
            rating: format!("{:.1}", product.ratings_average),
            rating_count: product.ratings_quantity,
            category: product.category.as_ref().map(|c| LinkedRefView {
                id: c.id.to_string(),
                name: c.name.clone(),
            }),
            brand: product.brand.as_ref().map(|b| LinkedRefView {
                id: b.id.to_string(),
                name: b.name.clone(),
            }),
            in_stock: product.in_stock(),
        }
    }
}

impl ProductDetailView {
    fn placeholder(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            image: String::new(),
            images: Vec::new(),
            price: String::new(),
            compare_at_price: None,
            rating: "0.0".to_string(),
            rating_count: 0,
            category: None,
            brand: None,
            in_stock: false,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub keyword: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub keyword: String,
    pub sort: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCardView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<ListingQuery>) -> Response {
    let sort_param = query.sort.unwrap_or_default();
    let keyword = query
        .keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let product_query = ProductQuery {
        page: query.page.unwrap_or(1).max(1),
        limit: PRODUCTS_PER_PAGE,
        sort: ProductSort::from_param(&sort_param),
        keyword: keyword.clone(),
        category: query.category.map(CategoryId::new),
        brand: query.brand.map(BrandId::new),
    };

    match state.commerce().get_products(&product_query).await {
        Ok(page) => {
            let products: Vec<ProductCardView> =
                page.items.iter().map(ProductCardView::from).collect();
            let keyword = keyword.unwrap_or_default();

            let prev_url = (page.current_page > 1)
                .then(|| listing_url(page.current_page - 1, &keyword, &sort_param));
            let next_url = page
                .has_more()
                .then(|| listing_url(page.current_page + 1, &keyword, &sort_param));

            ProductsIndexTemplate {
                products,
                keyword,
                sort: sort_param,
                current_page: page.current_page,
                total_pages: page.total_pages,
                prev_url,
                next_url,
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            ProductsIndexTemplate {
                products: Vec::new(),
                keyword: keyword.unwrap_or_default(),
                sort: sort_param,
                current_page: 1,
                total_pages: 1,
                prev_url: None,
                next_url: None,
            }
            .into_response()
        }
    }
}

/// Build a listing URL preserving the active keyword and sort.
fn listing_url(page: u32, keyword: &str, sort: &str) -> String {
    let mut url = format!("/products?page={page}");
    if !keyword.is_empty() {
        url.push_str("&keyword=");
        url.push_str(&urlencoding::encode(keyword));
    }
    if !sort.is_empty() {
        url.push_str("&sort=");
        url.push_str(sort);
    }
    url
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let product_id = ProductId::new(id);

    match state.commerce().get_product(&product_id).await {
        Ok(product) => {
            let related_products = related_products(&state, &product).await;

            ProductShowTemplate {
                product: ProductDetailView::from(&product),
                related_products,
            }
            .into_response()
        }
        Err(CommerceError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            ProductShowTemplate {
                product: ProductDetailView::placeholder(
                    product_id.as_str(),
                    "Product Not Found",
                    "This product could not be found.",
                ),
                related_products: Vec::new(),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch product {product_id}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ProductShowTemplate {
                    product: ProductDetailView::placeholder(
                        product_id.as_str(),
                        "Error",
                        "An error occurred loading this product.",
                    ),
                    related_products: Vec::new(),
                },
            )
                .into_response()
        }
    }
}

/// Fetch products from the same category, excluding the product itself.
async fn related_products(state: &AppState, product: &Product) -> Vec<ProductCardView> {
    let Some(category) = &product.category else {
        return Vec::new();
    };

    let query = ProductQuery {
        page: 1,
        limit: PRODUCTS_PER_PAGE,
        category: Some(category.id.clone()),
        ..ProductQuery::default()
    };

    match state.commerce().get_products(&query).await {
        Ok(page) => page
            .items
            .iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_PRODUCT_COUNT)
            .map(ProductCardView::from)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch related products: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_plain_page() {
        assert_eq!(listing_url(2, "", ""), "/products?page=2");
    }

    #[test]
    fn test_listing_url_encodes_keyword() {
        assert_eq!(
            listing_url(1, "olive oil & dates", "price-asc"),
            "/products?page=1&keyword=olive%20oil%20%26%20dates&sort=price-asc"
        );
    }
}
