use super::with_query;
use crate::client::ApiClient;
use crate::domain::{Category, CategoryId, Product, ProductId, Shop, ShopId};
use crate::error::RequestError;

/// Narrows a product listing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub shop_id: Option<ShopId>,
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    pub fn for_shop(shop_id: ShopId) -> Self {
        Self {
            shop_id: Some(shop_id),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub(crate) fn path(&self) -> String {
        with_query(
            "/products",
            &[
                ("shop_id", self.shop_id.map(|id| id.to_string())),
                ("category_id", self.category_id.map(|id| id.to_string())),
            ],
        )
    }
}

/// Read-only browsing of shops, categories, and products
#[derive(Clone, Debug)]
pub struct CatalogService {
    client: ApiClient,
}

impl CatalogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn shops(&self, category_id: Option<CategoryId>) -> Result<Vec<Shop>, RequestError> {
        let path = with_query(
            "/shops",
            &[("category_id", category_id.map(|id| id.to_string()))],
        );
        self.client.get(&path).await
    }

    pub async fn featured_shops(&self, limit: usize) -> Result<Vec<Shop>, RequestError> {
        let path = with_query("/shops", &[("limit", Some(limit.to_string()))]);
        self.client.get(&path).await
    }

    pub async fn shop(&self, shop_id: ShopId) -> Result<Shop, RequestError> {
        self.client.get(&format!("/shops/{shop_id}")).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, RequestError> {
        self.client.get("/categories").await
    }

    pub async fn category(&self, category_id: CategoryId) -> Result<Category, RequestError> {
        self.client.get(&format!("/categories/{category_id}")).await
    }

    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RequestError> {
        self.client.get(&filter.path()).await
    }

    pub async fn product(&self, product_id: ProductId) -> Result<Product, RequestError> {
        self.client.get(&format!("/products/{product_id}")).await
    }
}
