pub mod auth_service;
pub mod brand_service;
pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod role_service;
pub mod user_service;
