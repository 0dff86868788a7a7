//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! gb-cli catalog products --page 2 --keyword shawl
//! gb-cli catalog categories
//! gb-cli catalog brands
//! ```
//!
//! # Environment Variables
//!
//! - `COMMERCE_API_BASE_URL` - Remote commerce API base URL (optional)

use thiserror::Error;

use greenbasket_storefront::commerce::CommerceError;
use greenbasket_storefront::commerce::types::ProductQuery;

use super::client_from_env;

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Remote API call failed.
    #[error("Commerce API error: {0}")]
    Commerce(#[from] CommerceError),
}

/// Page size for CLI listings.
const PAGE_LIMIT: u32 = 20;

/// List a page of products.
#[allow(clippy::print_stdout)]
pub async fn products(page: u32, keyword: Option<String>) -> Result<(), CatalogError> {
    let client = client_from_env();

    let query = ProductQuery {
        page: page.max(1),
        limit: PAGE_LIMIT,
        keyword,
        ..ProductQuery::default()
    };
    let result = client.get_products(&query).await?;

    println!(
        "Products (page {}/{}, {} total)",
        result.current_page, result.total_pages, result.total_results
    );
    for product in &result.items {
        println!(
            "  {}  {:<40}  {}",
            product.id,
            truncate(&product.title, 40),
            product.effective_price()
        );
    }

    Ok(())
}

/// List all categories.
#[allow(clippy::print_stdout)]
pub async fn categories() -> Result<(), CatalogError> {
    let client = client_from_env();

    let categories = client.get_categories().await?;

    println!("Categories ({})", categories.len());
    for category in &categories {
        println!("  {}  {}", category.id, category.name);
    }

    Ok(())
}

/// List a page of brands.
#[allow(clippy::print_stdout)]
pub async fn brands(page: u32) -> Result<(), CatalogError> {
    let client = client_from_env();

    let result = client.get_brands(page.max(1)).await?;

    println!(
        "Brands (page {}/{}, {} total)",
        result.current_page, result.total_pages, result.total_results
    );
    for brand in &result.items {
        println!("  {}  {}", brand.id, brand.name);
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_long_string() {
        let long = "a".repeat(50);
        let out = truncate(&long, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with('\u{2026}'));
    }
}
