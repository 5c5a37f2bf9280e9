#![allow(async_fn_in_trait)]

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppResult,
    listing::{
        BrandSortField, CategorySortField, ListState, OrderSortField, Page, ProductSortField,
        UserSortField,
    },
    models::{
        Brand, Category, CategoryWithParent, OptionItem, Order, OrderWithItems, Product,
        ProductImage, ProductListItem, Role, User,
    },
};

pub mod brands;
pub mod categories;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod roles;
pub mod users;

#[cfg(test)]
pub mod memory;

/// Validated category fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandDraft {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub sku: Option<String>,
    pub stock: i32,
    pub category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Image rows to drop and files to attach when a product form is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageChanges {
    /// Image ids marked for deletion. Ids of other products are ignored.
    pub remove: Vec<Uuid>,
    /// Stored paths of new uploads; each becomes a non-main image.
    pub add: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A user together with the credential needed to log in.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

pub trait CategoryRepository: Send + Sync {
    async fn list(&self, state: &ListState<CategorySortField>)
    -> AppResult<Page<CategoryWithParent>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn exists(&self, id: Uuid) -> AppResult<bool>;
    /// Whether another category (not `except`) already uses `name`.
    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;
    /// Every category except `exclude`, ordered by name.
    async fn options(&self, exclude: Option<Uuid>) -> AppResult<Vec<OptionItem>>;
    async fn create(&self, draft: &CategoryDraft) -> AppResult<Category>;
    async fn update(&self, id: Uuid, draft: &CategoryDraft) -> AppResult<Category>;
    /// Returns `false` when there was no such row.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub trait BrandRepository: Send + Sync {
    async fn list(&self, state: &ListState<BrandSortField>) -> AppResult<Page<Brand>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Brand>>;
    async fn exists(&self, id: Uuid) -> AppResult<bool>;
    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn options(&self) -> AppResult<Vec<OptionItem>>;
    async fn create(&self, draft: &BrandDraft) -> AppResult<Brand>;
    async fn update(&self, id: Uuid, draft: &BrandDraft) -> AppResult<Brand>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub trait ProductRepository: Send + Sync {
    /// One page of products with their category and brand names.
    async fn list(&self, state: &ListState<ProductSortField>) -> AppResult<Page<ProductListItem>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> AppResult<bool>;
    async fn create(&self, draft: &ProductDraft) -> AppResult<Product>;
    /// Insert (`id` is `None`) or update the product and apply the image
    /// changes, all or nothing. Returns the product and the dropped image
    /// rows, whose files are left to the caller.
    async fn save_with_images(
        &self,
        id: Option<Uuid>,
        draft: &ProductDraft,
        images: &ImageChanges,
    ) -> AppResult<(Product, Vec<ProductImage>)>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub trait ProductImageRepository: Send + Sync {
    async fn for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductImage>>;
    /// Images of every product in the category.
    async fn for_category(&self, category_id: Uuid) -> AppResult<Vec<ProductImage>>;
}

pub trait OrderRepository: Send + Sync {
    async fn list(
        &self,
        state: &ListState<OrderSortField>,
        status: Option<&str>,
    ) -> AppResult<Page<Order>>;
    async fn find_with_items(&self, id: Uuid) -> AppResult<Option<OrderWithItems>>;
}

pub trait UserRepository: Send + Sync {
    async fn list(&self, state: &ListState<UserSortField>) -> AppResult<Page<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;
    async fn email_taken(&self, email: &str) -> AppResult<bool>;
    async fn create(&self, user: &NewUser) -> AppResult<User>;
}

/// Named roles and their assignment to users.
pub trait RoleRepository: Send + Sync {
    /// Every role, ordered by name.
    async fn all(&self) -> AppResult<Vec<Role>>;

    async fn all_names(&self) -> AppResult<Vec<String>> {
        Ok(self.all().await?.into_iter().map(|role| role.name).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;
    async fn names_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>>;
    async fn names_for_users(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>>;
    async fn has_any_role(&self, user_id: Uuid) -> AppResult<bool>;
    /// Give `user_id` the role; a no-op when it already has it.
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;
    /// Replace the user's roles with exactly `names`.
    async fn sync(&self, user_id: Uuid, names: &[String]) -> AppResult<()>;
}
