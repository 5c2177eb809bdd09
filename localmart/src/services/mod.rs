//! Typed wrappers over [`ApiClient`](crate::ApiClient), one per resource.

mod auth;
mod cart;
mod catalog;
mod orders;
mod shop_management;
mod users;

pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::{CatalogService, ProductFilter};
pub use orders::{OrderFilter, OrderService};
pub use shop_management::ShopManagementService;
pub use users::UserService;

/// Append the set parameters to `path` in the order given.
///
/// Callers always pass parameters in the same order so equal filters produce
/// equal cache keys.
pub(crate) fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}
