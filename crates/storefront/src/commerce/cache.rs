//! Cache types for catalog API responses.

use crate::commerce::types::{Brand, Category, Page, Product, Subcategory};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
    Categories(Vec<Category>),
    Category(Box<Category>),
    Subcategories(Vec<Subcategory>),
    Brands(Page<Brand>),
    Brand(Box<Brand>),
}
