use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        brands::{BrandList, BrandUpload},
        categories::{CategoryForm, CategoryList},
        orders::OrderList,
        products::{ProductFormOptions, ProductList, ProductUpload},
        users::{UpdateUserRolesRequest, UserList, UserRolesView},
    },
    listing::{
        BrandSortField, CategorySortField, ListingState, OrderSortField, ProductSortField,
        SortDirection, UserSortField,
    },
    models::{
        Brand, Category, CategoryWithParent, OptionItem, Order, OrderItem, OrderWithItems,
        Product, ProductImage, ProductListItem, ProductWithImages, Role, User, UserWithRoles,
    },
    response::{ApiResponse, Meta},
    routes::{auth, brands, categories, health, orders, products, users},
    validation::ValidationErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        categories::list_categories,
        categories::parent_options,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        brands::list_brands,
        brands::get_brand,
        brands::create_brand,
        brands::update_brand,
        brands::delete_brand,
        products::list_products,
        products::form_options,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        users::list_users,
        users::list_roles,
        users::user_roles,
        users::update_user_roles,
        orders::list_orders,
        orders::get_order
    ),
    components(
        schemas(
            User,
            UserWithRoles,
            Role,
            Category,
            CategoryWithParent,
            Brand,
            OptionItem,
            Product,
            ProductListItem,
            ProductImage,
            ProductWithImages,
            Order,
            OrderItem,
            OrderWithItems,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CategoryForm,
            CategoryList,
            BrandUpload,
            BrandList,
            ProductUpload,
            ProductList,
            ProductFormOptions,
            UserList,
            UserRolesView,
            UpdateUserRolesRequest,
            OrderList,
            ListingState,
            SortDirection,
            CategorySortField,
            BrandSortField,
            ProductSortField,
            UserSortField,
            OrderSortField,
            ValidationErrors,
            Meta,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Brand>,
            ApiResponse<BrandList>,
            ApiResponse<ProductWithImages>,
            ApiResponse<ProductList>,
            ApiResponse<UserList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Categories", description = "Category management"),
        (name = "Brands", description = "Brand management"),
        (name = "Products", description = "Product and product image management"),
        (name = "Users", description = "Users and role assignment"),
        (name = "Orders", description = "Read-only order views"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_admin_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/health",
            "/api/auth/login",
            "/api/admin/categories/{id}",
            "/api/admin/brands",
            "/api/admin/products/options",
            "/api/admin/users/{id}/roles",
            "/api/admin/roles",
            "/api/admin/orders/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
