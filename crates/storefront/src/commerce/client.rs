//! Commerce API client implementation.
//!
//! Thin typed wrapper over the hosted e-commerce REST API using `reqwest`.
//! Catalog reads (products, categories, brands) are cached with `moka`
//! (5-minute TTL); everything touching customer state goes straight through.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use greenbasket_core::{AddressId, BrandId, CartId, CategoryId, CustomerId, ProductId};

use crate::commerce::CommerceError;
use crate::commerce::cache::CacheValue;
use crate::commerce::types::{
    Address, AddressInput, AddressListEnvelope, ApiErrorBody, AuthResponse, AuthSession, Brand,
    Cart, CartEnvelope, CartSummary, Category, CheckoutSessionEnvelope, DecodedToken, Enveloped,
    Order, Page, PagedEnvelope, Product, ProductQuery, ResetTokenEnvelope, ShippingAddressInput,
    SignupInput, Subcategory, VerifyTokenEnvelope, WishlistEnvelope, WishlistIdsEnvelope,
};
use crate::config::CommerceApiConfig;

/// Request header the remote API reads the customer token from.
const TOKEN_HEADER: &str = "token";

/// Page size requested when listing the full category set.
const CATEGORY_PAGE_LIMIT: u32 = 100;

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the remote commerce API.
///
/// Provides type-safe access to the catalog, customer auth, cart, wishlist,
/// address, and order endpoints. Catalog responses are cached for 5 minutes.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<T, CommerceError> {
        let mut request = self.inner.client.request(method, self.url(path));

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting before consuming the body
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message.or(body.status_msg))
                .unwrap_or_else(|| format!("HTTP {status}"));

            return Err(match status {
                StatusCode::UNAUTHORIZED => CommerceError::Unauthorized,
                StatusCode::NOT_FOUND => CommerceError::NotFound(message),
                _ => {
                    tracing::error!(
                        status = %status,
                        body = %response_text.chars().take(500).collect::<String>(),
                        "Commerce API returned non-success status"
                    );
                    CommerceError::Api {
                        status: status.as_u16(),
                        message,
                    }
                }
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, CommerceError> {
        self.execute(Method::GET, path, query, token, None).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Result<T, CommerceError> {
        self.execute(Method::POST, path, &[], token, Some(body))
            .await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Result<T, CommerceError> {
        self.execute(Method::PUT, path, &[], token, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, CommerceError> {
        self.execute(Method::DELETE, path, &[], token, None).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a filtered, paginated product listing.
    ///
    /// Responses are cached unless the query carries a keyword search.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>, CommerceError> {
        let cacheable = query.keyword.is_none();
        let cache_key = format!(
            "products:{}:{}:{}:{}:{}",
            query.page,
            query.limit,
            query.sort.map_or("", |s| s.as_query()),
            query.category.as_ref().map_or("", CategoryId::as_str),
            query.brand.as_ref().map_or("", BrandId::as_str),
        );

        if cacheable
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let params = product_query_params(query);
        let envelope: PagedEnvelope<Product> = self.get("/products", &params, None).await?;
        let page: Page<Product> = envelope.into();

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a product by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, CommerceError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let envelope: Enveloped<Product> = self
            .get(&format!("/products/{product_id}"), &[], None)
            .await?;
        let product = envelope.data;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let params = [("limit", CATEGORY_PAGE_LIMIT.to_string())];
        let envelope: PagedEnvelope<Category> = self.get("/categories", &params, None).await?;
        let categories = envelope.data;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get a category by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_category(&self, category_id: &CategoryId) -> Result<Category, CommerceError> {
        let cache_key = format!("category:{category_id}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let envelope: Enveloped<Category> = self
            .get(&format!("/categories/{category_id}"), &[], None)
            .await?;
        let category = envelope.data;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Get the subcategories of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_subcategories(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Subcategory>, CommerceError> {
        let cache_key = format!("subcategories:{category_id}");

        if let Some(CacheValue::Subcategories(subcategories)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for subcategories");
            return Ok(subcategories);
        }

        let envelope: PagedEnvelope<Subcategory> = self
            .get(
                &format!("/categories/{category_id}/subcategories"),
                &[],
                None,
            )
            .await?;
        let subcategories = envelope.data;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Subcategories(subcategories.clone()),
            )
            .await;

        Ok(subcategories)
    }

    /// Get a paginated brand listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self, page: u32) -> Result<Page<Brand>, CommerceError> {
        let cache_key = format!("brands:{page}");

        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let params = [("page", page.max(1).to_string())];
        let envelope: PagedEnvelope<Brand> = self.get("/brands", &params, None).await?;
        let brands: Page<Brand> = envelope.into();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// Get a brand by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the brand is not found or the API request fails.
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_brand(&self, brand_id: &BrandId) -> Result<Brand, CommerceError> {
        let cache_key = format!("brand:{brand_id}");

        if let Some(CacheValue::Brand(brand)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brand");
            return Ok(*brand);
        }

        let envelope: Enveloped<Brand> =
            self.get(&format!("/brands/{brand_id}"), &[], None).await?;
        let brand = envelope.data;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brand(Box::new(brand.clone())))
            .await;

        Ok(brand)
    }

    /// Probe the remote API for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the API does not answer with a success status.
    pub async fn ping(&self) -> Result<(), CommerceError> {
        let params = [("limit", "1".to_string())];
        let _: PagedEnvelope<Category> = self.get("/categories", &params, None).await?;
        Ok(())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created (e.g. the email is
    /// already registered) or the API request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: &SignupInput) -> Result<AuthSession, CommerceError> {
        let body = serde_json::to_value(input)?;
        let response: AuthResponse = self.post("/auth/signup", None, body).await?;
        Ok(response.into())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the API request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CommerceError> {
        let body = json!({ "email": email, "password": password });
        let response: AuthResponse = self.post("/auth/signin", None, body).await?;
        Ok(response.into())
    }

    /// Verify a customer token and return its decoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unauthorized`] for a stale or forged token.
    #[instrument(skip(self, token))]
    pub async fn verify_token(&self, token: &str) -> Result<DecodedToken, CommerceError> {
        let envelope: VerifyTokenEnvelope =
            self.get("/auth/verifyToken", &[], Some(token)).await?;
        Ok(envelope.decoded)
    }

    /// Request a password reset code for an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is unknown or the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), CommerceError> {
        let body = json!({ "email": email });
        let _: ApiErrorBody = self.post("/auth/forgotPasswords", None, body).await?;
        Ok(())
    }

    /// Verify a password reset code previously sent by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<(), CommerceError> {
        let body = json!({ "resetCode": code });
        let _: ApiErrorBody = self.post("/auth/verifyResetCode", None, body).await?;
        Ok(())
    }

    /// Set a new password after code verification. Returns a fresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset is rejected or the API request fails.
    #[instrument(skip(self, new_password), fields(email = %email))]
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<String, CommerceError> {
        let body = json!({ "email": email, "newPassword": new_password });
        let envelope: ResetTokenEnvelope = self.put("/auth/resetPassword", None, body).await?;
        Ok(envelope.token)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the customer's cart with populated product lines.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] when the customer has no cart yet.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &str) -> Result<Cart, CommerceError> {
        let envelope: CartEnvelope = self.get("/cart", &[], Some(token)).await?;
        Ok(envelope.into())
    }

    /// Add one unit of a product to the cart.
    ///
    /// The response carries unpopulated product references; re-fetch the cart
    /// when display data is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be added or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<CartSummary, CommerceError> {
        let body = json!({ "productId": product_id.as_str() });
        let envelope: CartEnvelope = self.post("/cart", Some(token), body).await?;
        Ok(envelope.into())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id, count))]
    pub async fn set_cart_item_count(
        &self,
        token: &str,
        product_id: &ProductId,
        count: u32,
    ) -> Result<CartSummary, CommerceError> {
        let body = json!({ "count": count });
        let envelope: CartEnvelope = self
            .put(&format!("/cart/{product_id}"), Some(token), body)
            .await?;
        Ok(envelope.into())
    }

    /// Remove a product line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<CartSummary, CommerceError> {
        let envelope: CartEnvelope = self
            .delete(&format!("/cart/{product_id}"), Some(token))
            .await?;
        Ok(envelope.into())
    }

    /// Delete the customer's cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &str) -> Result<(), CommerceError> {
        let _: ApiErrorBody = self.delete("/cart", Some(token)).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist Methods (not cached - mutable state)
    // =========================================================================

    /// Get the customer's wishlist with populated products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_wishlist(&self, token: &str) -> Result<Vec<Product>, CommerceError> {
        let envelope: WishlistEnvelope = self.get("/wishlist", &[], Some(token)).await?;
        Ok(envelope.data)
    }

    /// Add a product to the wishlist. Returns the updated id set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<Vec<ProductId>, CommerceError> {
        let body = json!({ "productId": product_id.as_str() });
        let envelope: WishlistIdsEnvelope = self.post("/wishlist", Some(token), body).await?;
        Ok(envelope.data)
    }

    /// Remove a product from the wishlist. Returns the updated id set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<Vec<ProductId>, CommerceError> {
        let envelope: WishlistIdsEnvelope = self
            .delete(&format!("/wishlist/{product_id}"), Some(token))
            .await?;
        Ok(envelope.data)
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// Get the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_addresses(&self, token: &str) -> Result<Vec<Address>, CommerceError> {
        let envelope: AddressListEnvelope = self.get("/addresses", &[], Some(token)).await?;
        Ok(envelope.data)
    }

    /// Get a single saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not found or the request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn get_address(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<Address, CommerceError> {
        let envelope: Enveloped<Address> = self
            .get(&format!("/addresses/{address_id}"), &[], Some(token))
            .await?;
        Ok(envelope.data)
    }

    /// Save a new address. Returns the updated address list.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is rejected or the request fails.
    #[instrument(skip(self, token, input))]
    pub async fn add_address(
        &self,
        token: &str,
        input: &AddressInput,
    ) -> Result<Vec<Address>, CommerceError> {
        let body = serde_json::to_value(input)?;
        let envelope: AddressListEnvelope = self.post("/addresses", Some(token), body).await?;
        Ok(envelope.data)
    }

    /// Delete a saved address. Returns the updated address list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn remove_address(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<Vec<Address>, CommerceError> {
        let envelope: AddressListEnvelope = self
            .delete(&format!("/addresses/{address_id}"), Some(token))
            .await?;
        Ok(envelope.data)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Get a customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_orders(&self, customer_id: &CustomerId) -> Result<Vec<Order>, CommerceError> {
        // This endpoint answers with a bare JSON array, no envelope.
        self.get(&format!("/orders/user/{customer_id}"), &[], None)
            .await
    }

    /// Place a cash-on-delivery order for a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is gone or the request fails.
    #[instrument(skip(self, token, shipping), fields(cart_id = %cart_id))]
    pub async fn create_cash_order(
        &self,
        token: &str,
        cart_id: &CartId,
        shipping: &ShippingAddressInput,
    ) -> Result<Order, CommerceError> {
        let body = json!({ "shippingAddress": shipping });
        let envelope: Enveloped<Order> = self
            .post(&format!("/orders/{cart_id}"), Some(token), body)
            .await?;
        Ok(envelope.data)
    }

    /// Create a hosted card-payment session for a cart.
    ///
    /// The remote payment provider redirects back to `return_url` when the
    /// customer completes or abandons payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    #[instrument(skip(self, token), fields(cart_id = %cart_id))]
    pub async fn create_checkout_session(
        &self,
        token: &str,
        cart_id: &CartId,
        return_url: &str,
    ) -> Result<String, CommerceError> {
        let params = [("url", return_url.to_string())];
        let envelope: CheckoutSessionEnvelope = self
            .get(
                &format!("/orders/checkout-session/{cart_id}"),
                &params,
                Some(token),
            )
            .await?;
        Ok(envelope.session.url)
    }
}

/// Build the query string parameters for a product listing request.
fn product_query_params(query: &ProductQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if query.page > 0 {
        params.push(("page", query.page.to_string()));
    }
    if query.limit > 0 {
        params.push(("limit", query.limit.to_string()));
    }
    if let Some(sort) = query.sort {
        params.push(("sort", sort.as_query().to_string()));
    }
    if let Some(keyword) = &query.keyword {
        params.push(("keyword", keyword.clone()));
    }
    if let Some(category) = &query.category {
        params.push(("category[in]", category.as_str().to_string()));
    }
    if let Some(brand) = &query.brand {
        params.push(("brand", brand.as_str().to_string()));
    }
    params
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commerce::types::ProductSort;

    #[test]
    fn test_product_query_params_default() {
        let params = product_query_params(&ProductQuery::default());
        assert!(params.is_empty());
    }

    #[test]
    fn test_product_query_params_full() {
        let query = ProductQuery {
            page: 2,
            limit: 40,
            sort: Some(ProductSort::PriceDesc),
            keyword: Some("shawl".to_string()),
            category: Some(CategoryId::new("6439d58a0049ad0b52b9003f")),
            brand: Some(BrandId::new("64089bbe24b25627a253158b")),
        };
        let params = product_query_params(&query);
        assert!(params.contains(&("page", "2".to_string())));
        assert!(params.contains(&("limit", "40".to_string())));
        assert!(params.contains(&("sort", "-price".to_string())));
        assert!(params.contains(&("keyword", "shawl".to_string())));
        assert!(params.contains(&("category[in]", "6439d58a0049ad0b52b9003f".to_string())));
        assert!(params.contains(&("brand", "64089bbe24b25627a253158b".to_string())));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = CommerceApiConfig {
            base_url: "https://ecommerce.example.com/api/v1/".to_string(),
        };
        let client = CommerceClient::new(&config);
        assert_eq!(
            client.url("/products"),
            "https://ecommerce.example.com/api/v1/products"
        );
    }
}
