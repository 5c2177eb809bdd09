use super::with_query;
use crate::client::{ApiClient, RequestConfig};
use crate::domain::{Order, OrderCreate, OrderId, OrderStatus, OrderStatusUpdate, ShopId};
use crate::error::RequestError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub shop_id: Option<ShopId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn path(&self) -> String {
        with_query(
            "/orders",
            &[
                ("shop_id", self.shop_id.map(|id| id.to_string())),
                ("status", self.status.map(|s| s.as_str().to_string())),
            ],
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrderService {
    client: ApiClient,
}

impl OrderService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, RequestError> {
        self.client.get(&filter.path()).await
    }

    /// Pending orders straight from the server, bypassing the cache
    pub async fn pending_orders(&self) -> Result<Vec<Order>, RequestError> {
        let path = OrderFilter::with_status(OrderStatus::Pending).path();
        self.client.get_with(&path, RequestConfig::no_cache()).await
    }

    pub async fn order(&self, order_id: OrderId) -> Result<Order, RequestError> {
        self.client.get(&format!("/orders/{order_id}")).await
    }

    pub async fn place_order(&self, order: &OrderCreate) -> Result<Order, RequestError> {
        self.client.post("/orders", order).await
    }

    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, RequestError> {
        self.client
            .put(&format!("/orders/{order_id}"), &OrderStatusUpdate { status })
            .await
    }
}
