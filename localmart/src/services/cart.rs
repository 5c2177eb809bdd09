use crate::client::{ApiClient, RequestConfig};
use crate::domain::{CartItem, CartItemCreate, CartItemId, CartItemUpdate, CartSummary, ProductId};
use crate::error::RequestError;

#[derive(Clone, Debug)]
pub struct CartService {
    client: ApiClient,
}

impl CartService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Always fetched fresh: item writes go to `/cart/items/..` and would not
    /// purge a cached `/cart`
    pub async fn cart(&self) -> Result<CartSummary, RequestError> {
        self.client.get_with("/cart", RequestConfig::no_cache()).await
    }

    pub async fn add_item(&self, product_id: ProductId, quantity: i64) -> Result<CartItem, RequestError> {
        self.client
            .post("/cart/items", &CartItemCreate { product_id, quantity })
            .await
    }

    pub async fn update_item(&self, item_id: CartItemId, quantity: i64) -> Result<CartItem, RequestError> {
        self.client
            .put(&format!("/cart/items/{item_id}"), &CartItemUpdate { quantity })
            .await
    }

    pub async fn remove_item(&self, item_id: CartItemId) -> Result<(), RequestError> {
        self.client.delete(&format!("/cart/items/{item_id}")).await
    }

    pub async fn clear(&self) -> Result<(), RequestError> {
        self.client.delete("/cart").await
    }
}
