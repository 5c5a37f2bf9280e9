use axum::{Router, routing::get};

use crate::state::AppState;

use super::{brands, categories, orders, products, users};

/// Back-office routes. Every handler takes an `AdminUser`, so a caller needs
/// a valid token and the admin role.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/products", products::router())
        .nest("/users", users::router())
        .route("/roles", get(users::list_roles))
        .nest("/orders", orders::router())
}
