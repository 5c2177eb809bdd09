//! Resources exchanged with the marketplace REST API.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = i64;
pub type ShopId = i64;
pub type CategoryId = i64;
pub type ProductId = i64;
pub type CartItemId = i64;
pub type OrderId = i64;

/// Monetary amounts arrive as JSON numbers or decimal strings depending on the
/// backend's encoder
mod amount {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    ShopOwner,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: String,
}

impl User {
    pub fn is_shop_owner(&self) -> bool {
        self.role == UserRole::ShopOwner
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct UserRegistration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordUpdate {
    pub current_password: String,
    pub new_password: String,
}

/// OAuth2 password-flow response
#[derive(Clone, Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShopCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ShopUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "amount::deserialize")]
    pub price: f64,
    pub category_id: CategoryId,
    #[serde(default)]
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub is_available: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub is_available: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub product_price: f64,
    pub quantity: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total_price: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total_items: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total_amount: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartItemCreate {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartItemUpdate {
    pub quantity: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: i64,
    #[serde(deserialize_with = "amount::deserialize")]
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub shop_id: ShopId,
    #[serde(deserialize_with = "amount::deserialize")]
    pub total_amount: f64,
    pub status: OrderStatus,
    pub delivery_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Places an order for everything in the cart from one shop
#[derive(Clone, Debug, Serialize)]
pub struct OrderCreate {
    pub shop_id: ShopId,
    pub delivery_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_with_decimal_strings() {
        let order: Order = serde_json::from_value(json!({
            "id": 3,
            "customer_id": 9,
            "shop_id": 1,
            "total_amount": "24.50",
            "status": "pending",
            "delivery_address": "1 Main St",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:00:00",
            "items": [
                {"id": 1, "order_id": 3, "product_id": 4, "quantity": 2, "price": "12.25"}
            ]
        }))
        .unwrap();

        assert_eq!(order.total_amount, 24.5);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].price, 12.25);
        assert_eq!(order.notes, None);
    }

    #[test]
    fn test_product_with_numeric_price() {
        let product: Product = serde_json::from_value(json!({
            "id": 4,
            "shop_id": 1,
            "name": "Sourdough",
            "price": 6.0,
            "category_id": 2,
            "stock_quantity": 10,
            "is_available": true,
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(product.price, 6.0);
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let result: Result<CartSummary, _> = serde_json::from_value(json!({
            "items": [],
            "total_items": 0,
            "total_amount": "lots"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_role() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "email": "owner@example.test",
            "username": "owner",
            "role": "shop_owner",
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert!(user.is_shop_owner());
    }

    #[test]
    fn test_partial_updates_skip_unset_fields() {
        let update = ProductUpdate {
            price: Some(4.5),
            ..ProductUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"price": 4.5}));

        let status = OrderStatusUpdate {
            status: OrderStatus::Ready,
        };
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({"status": "ready"}));
    }
}
