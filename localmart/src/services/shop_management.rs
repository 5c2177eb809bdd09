use super::ProductFilter;
use crate::client::ApiClient;
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate, Shop, ShopCreate, ShopId, ShopUpdate};
use crate::error::RequestError;
use serde::Serialize;

#[derive(Serialize)]
struct NewProduct<'a> {
    shop_id: ShopId,
    #[serde(flatten)]
    product: &'a ProductCreate,
}

/// Shop-owner operations on their own shop and its products
#[derive(Clone, Debug)]
pub struct ShopManagementService {
    client: ApiClient,
}

impl ShopManagementService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The caller's shop, or `None` if they have not opened one yet
    pub async fn my_shop(&self) -> Result<Option<Shop>, RequestError> {
        match self.client.get("/shops/my-shop").await {
            Ok(shop) => Ok(Some(shop)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_shop(&self, shop: &ShopCreate) -> Result<Shop, RequestError> {
        self.client.post("/shops", shop).await
    }

    pub async fn update_shop(&self, shop_id: ShopId, update: &ShopUpdate) -> Result<Shop, RequestError> {
        self.client.put(&format!("/shops/{shop_id}"), update).await
    }

    pub async fn shop_products(&self, shop_id: ShopId) -> Result<Vec<Product>, RequestError> {
        self.client.get(&ProductFilter::for_shop(shop_id).path()).await
    }

    pub async fn create_product(
        &self,
        shop_id: ShopId,
        product: &ProductCreate,
    ) -> Result<Product, RequestError> {
        self.client
            .post("/products", &NewProduct { shop_id, product })
            .await
    }

    pub async fn update_product(
        &self,
        product_id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RequestError> {
        self.client.put(&format!("/products/{product_id}"), update).await
    }

    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), RequestError> {
        self.client.delete(&format!("/products/{product_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::testing::MockTransport;
    use crate::transport::{HttpResponse, Method, RequestBody};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use storage_engine::MemoryCache;

    fn service(transport: &Arc<MockTransport>) -> ShopManagementService {
        ShopManagementService::new(ApiClient::new(
            "http://shop.test",
            transport.clone(),
            Arc::new(MemoryCache::<Value>::new()),
            Arc::new(MemoryTokenStore::with_token("owner")),
        ))
    }

    fn product_json(id: i64) -> Value {
        json!({
            "id": id,
            "shop_id": 1,
            "name": "Rye",
            "price": 4.5,
            "category_id": 2,
            "stock_quantity": 3,
            "is_available": true,
            "created_at": "2024-05-01T10:00:00"
        })
    }

    #[tokio::test]
    async fn test_my_shop_absent() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(404, json!({"detail": "Shop not found"}));
        let shops = service(&transport);

        assert_eq!(shops.my_shop().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_my_shop_other_errors_propagate() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(403, json!({"detail": "Not a shop owner"}));
        let shops = service(&transport);

        assert_eq!(shops.my_shop().await.unwrap_err().status, Some(403));
    }

    #[tokio::test]
    async fn test_create_product_sends_shop_id_and_purges_listing() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!([]));
        transport.push_json(201, product_json(9));
        transport.push_json(200, json!([product_json(9)]));
        let shops = service(&transport);

        assert!(shops.shop_products(1).await.unwrap().is_empty());

        let product = ProductCreate {
            name: "Rye".to_string(),
            description: None,
            price: 4.5,
            category_id: 2,
            image_url: None,
            stock_quantity: 3,
            is_available: true,
        };
        shops.create_product(1, &product).await.unwrap();

        // the POST to /products invalidated /products?shop_id=1
        let listing = shops.shop_products(1).await.unwrap();
        assert_eq!(listing[0].id, 9);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[1].body,
            RequestBody::Json(json!({
                "shop_id": 1,
                "name": "Rye",
                "price": 4.5,
                "category_id": 2,
                "stock_quantity": 3,
                "is_available": true
            }))
        );
    }

    #[tokio::test]
    async fn test_delete_product() {
        let transport = Arc::new(MockTransport::new());
        transport.push(Ok(HttpResponse::new(204, "")));
        let shops = service(&transport);

        shops.delete_product(9).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.url, "http://shop.test/products/9");
    }
}
