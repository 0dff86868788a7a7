//! Brand route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use greenbasket_core::BrandId;

use crate::commerce::CommerceError;
use crate::commerce::types::{Brand, ProductQuery};
use crate::filters;
use crate::routes::products::{PRODUCTS_PER_PAGE, ProductCardView};
use crate::state::AppState;

/// Brand display data for templates.
#[derive(Clone)]
pub struct BrandCardView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&Brand> for BrandCardView {
    fn from(brand: &Brand) -> Self {
        Self {
            id: brand.id.to_string(),
            name: brand.name.clone(),
            image: brand.image.clone(),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Brand listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsIndexTemplate {
    pub brands: Vec<BrandCardView>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more_pages: bool,
}

/// Brand detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/show.html")]
pub struct BrandShowTemplate {
    pub brand: BrandCardView,
    pub products: Vec<ProductCardView>,
}

/// Display brand listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<PaginationQuery>) -> Response {
    let page_number = query.page.unwrap_or(1).max(1);

    match state.commerce().get_brands(page_number).await {
        Ok(page) => {
            let brands: Vec<BrandCardView> = page.items.iter().map(BrandCardView::from).collect();

            BrandsIndexTemplate {
                brands,
                current_page: page.current_page,
                total_pages: page.total_pages,
                has_more_pages: page.has_more(),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch brands: {e}");
            BrandsIndexTemplate {
                brands: Vec::new(),
                current_page: 1,
                total_pages: 1,
                has_more_pages: false,
            }
            .into_response()
        }
    }
}

/// Display brand detail page with products.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let brand_id = BrandId::new(id);

    let brand = match state.commerce().get_brand(&brand_id).await {
        Ok(brand) => brand,
        Err(CommerceError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                BrandShowTemplate {
                    brand: BrandCardView {
                        id: brand_id.to_string(),
                        name: "Brand Not Found".to_string(),
                        image: None,
                    },
                    products: Vec::new(),
                },
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch brand {brand_id}: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                BrandShowTemplate {
                    brand: BrandCardView {
                        id: brand_id.to_string(),
                        name: "Error".to_string(),
                        image: None,
                    },
                    products: Vec::new(),
                },
            )
                .into_response();
        }
    };

    let product_query = ProductQuery {
        page: 1,
        limit: PRODUCTS_PER_PAGE,
        brand: Some(brand_id),
        ..ProductQuery::default()
    };
    let products = match state.commerce().get_products(&product_query).await {
        Ok(page) => page.items.iter().map(ProductCardView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch products for brand: {e}");
            Vec::new()
        }
    };

    BrandShowTemplate {
        brand: BrandCardView::from(&brand),
        products,
    }
    .into_response()
}
