//! In-memory repositories for service tests. Foreign-key actions of the real
//! schema (cascade, set null) are emulated on delete.

use std::{cmp::Ordering, collections::HashMap, sync::Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    listing::{
        BrandSortField, CategorySortField, ListState, OrderSortField, Page, ProductSortField,
        SortDirection, SortField, UserSortField,
    },
    models::{
        Brand, Category, CategoryWithParent, OptionItem, Order, OrderWithItems, Product,
        ProductImage, ProductListItem, Role, User,
    },
    repository::{
        BrandDraft, BrandRepository, CategoryDraft, CategoryRepository, ImageChanges, NewUser,
        OrderRepository, ProductDraft, ProductImageRepository, ProductRepository, RoleRepository,
        UserAccount, UserRepository,
    },
};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    brands: Vec<Brand>,
    products: Vec<Product>,
    images: Vec<ProductImage>,
    orders: Vec<OrderWithItems>,
    users: Vec<(User, String)>,
    roles: Vec<Role>,
    user_roles: Vec<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose inserts, updates and deletes fail like a dropped
    /// connection.
    pub fn failing() -> Self {
        Self {
            tables: Mutex::default(),
            fail_writes: true,
        }
    }

    pub fn with_roles(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock().unwrap();
            for name in names {
                tables.roles.push(Role {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    guard_name: "web".into(),
                });
            }
        }
        store
    }

    pub fn insert_order(&self, order: OrderWithItems) {
        self.tables.lock().unwrap().orders.push(order);
    }

    pub fn product_count(&self) -> usize {
        self.tables.lock().unwrap().products.len()
    }

    pub fn image_count(&self) -> usize {
        self.tables.lock().unwrap().images.len()
    }

    fn write(&self) -> AppResult<std::sync::MutexGuard<'_, Tables>> {
        if self.fail_writes {
            return Err(AppError::OrmError(sea_orm::DbErr::Custom(
                "connection reset".into(),
            )));
        }
        Ok(self.tables.lock().unwrap())
    }
}

impl Tables {
    fn insert_product(&mut self, draft: &ProductDraft) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            short_description: draft.short_description.clone(),
            price: draft.price,
            old_price: draft.old_price,
            sku: draft.sku.clone(),
            stock: draft.stock,
            category_id: draft.category_id,
            brand_id: draft.brand_id,
            is_active: draft.is_active,
            is_featured: draft.is_featured,
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        product
    }
}

fn apply_draft(product: &mut Product, draft: &ProductDraft) {
    product.name = draft.name.clone();
    product.slug = draft.slug.clone();
    product.description = draft.description.clone();
    product.short_description = draft.short_description.clone();
    product.price = draft.price;
    product.old_price = draft.old_price;
    product.sku = draft.sku.clone();
    product.stock = draft.stock;
    product.category_id = draft.category_id;
    product.brand_id = draft.brand_id;
    product.is_active = draft.is_active;
    product.is_featured = draft.is_featured;
    product.updated_at = Utc::now();
}

fn contains_term(term: &str, values: &[Option<&str>]) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    values
        .iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
}

fn paginate<T, F: SortField>(
    mut rows: Vec<T>,
    state: &ListState<F>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    rows.sort_by(|a, b| match state.sort_direction {
        SortDirection::Asc => cmp(a, b),
        SortDirection::Desc => cmp(b, a),
    });
    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(state.offset() as usize)
        .take(state.per_page as usize)
        .collect();
    Page { items, total }
}

impl CategoryRepository for MemoryStore {
    async fn list(
        &self,
        state: &ListState<CategorySortField>,
    ) -> AppResult<Page<CategoryWithParent>> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<CategoryWithParent> = tables
            .categories
            .iter()
            .filter(|c| {
                contains_term(&state.search, &[Some(c.name.as_str()), c.description.as_deref()])
            })
            .map(|c| CategoryWithParent {
                category: c.clone(),
                parent_name: c.parent_id.and_then(|id| {
                    tables
                        .categories
                        .iter()
                        .find(|p| p.id == id)
                        .map(|p| p.name.clone())
                }),
            })
            .collect();
        Ok(paginate(rows, state, |a, b| {
            let (a, b) = (&a.category, &b.category);
            match state.sort_field {
                CategorySortField::Id => a.id.cmp(&b.id),
                CategorySortField::Name => a.name.cmp(&b.name),
                CategorySortField::Slug => a.slug.cmp(&b.slug),
                CategorySortField::Description => a.description.cmp(&b.description),
                CategorySortField::ParentId => a.parent_id.cmp(&b.parent_id),
                CategorySortField::IsActive => a.is_active.cmp(&b.is_active),
                CategorySortField::CreatedAt => a.created_at.cmp(&b.created_at),
                CategorySortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            }
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().any(|c| c.id == id))
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .categories
            .iter()
            .any(|c| c.name == name && Some(c.id) != except))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .categories
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != except))
    }

    async fn options(&self, exclude: Option<Uuid>) -> AppResult<Vec<OptionItem>> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<OptionItem> = tables
            .categories
            .iter()
            .filter(|c| Some(c.id) != exclude)
            .map(|c| OptionItem {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn create(&self, draft: &CategoryDraft) -> AppResult<Category> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            parent_id: draft.parent_id,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: Uuid, draft: &CategoryDraft) -> AppResult<Category> {
        let mut tables = self.write()?;
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        category.name = draft.name.clone();
        category.slug = draft.slug.clone();
        category.description = draft.description.clone();
        category.parent_id = draft.parent_id;
        category.is_active = draft.is_active;
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Ok(false);
        }
        for child in tables.categories.iter_mut() {
            if child.parent_id == Some(id) {
                child.parent_id = None;
            }
        }
        let doomed: Vec<Uuid> = tables
            .products
            .iter()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        tables.products.retain(|p| p.category_id != id);
        tables.images.retain(|i| !doomed.contains(&i.product_id));
        Ok(true)
    }
}

impl BrandRepository for MemoryStore {
    async fn list(&self, state: &ListState<BrandSortField>) -> AppResult<Page<Brand>> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<Brand> = tables
            .brands
            .iter()
            .filter(|b| {
                contains_term(&state.search, &[Some(b.name.as_str()), b.description.as_deref()])
            })
            .cloned()
            .collect();
        Ok(paginate(rows, state, |a, b| match state.sort_field {
            BrandSortField::Id => a.id.cmp(&b.id),
            BrandSortField::Name => a.name.cmp(&b.name),
            BrandSortField::Slug => a.slug.cmp(&b.slug),
            BrandSortField::IsActive => a.is_active.cmp(&b.is_active),
            BrandSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            BrandSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Brand>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.brands.iter().find(|b| b.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.brands.iter().any(|b| b.id == id))
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .brands
            .iter()
            .any(|b| b.name == name && Some(b.id) != except))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .brands
            .iter()
            .any(|b| b.slug == slug && Some(b.id) != except))
    }

    async fn options(&self) -> AppResult<Vec<OptionItem>> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<OptionItem> = tables
            .brands
            .iter()
            .map(|b| OptionItem {
                id: b.id,
                name: b.name.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn create(&self, draft: &BrandDraft) -> AppResult<Brand> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let brand = Brand {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            logo_path: draft.logo_path.clone(),
            logo_url: None,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.brands.push(brand.clone());
        Ok(brand)
    }

    async fn update(&self, id: Uuid, draft: &BrandDraft) -> AppResult<Brand> {
        let mut tables = self.write()?;
        let brand = tables
            .brands
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(AppError::NotFound)?;
        brand.name = draft.name.clone();
        brand.slug = draft.slug.clone();
        brand.description = draft.description.clone();
        brand.logo_path = draft.logo_path.clone();
        brand.is_active = draft.is_active;
        brand.updated_at = Utc::now();
        Ok(brand.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.brands.len();
        tables.brands.retain(|b| b.id != id);
        if tables.brands.len() == before {
            return Ok(false);
        }
        for product in tables.products.iter_mut() {
            if product.brand_id == Some(id) {
                product.brand_id = None;
            }
        }
        Ok(true)
    }
}

impl ProductRepository for MemoryStore {
    async fn list(&self, state: &ListState<ProductSortField>) -> AppResult<Page<ProductListItem>> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<ProductListItem> = tables
            .products
            .iter()
            .filter(|p| {
                contains_term(
                    &state.search,
                    &[
                        Some(p.name.as_str()),
                        p.short_description.as_deref(),
                        p.sku.as_deref(),
                    ],
                )
            })
            .map(|p| ProductListItem {
                product: p.clone(),
                category_name: tables
                    .categories
                    .iter()
                    .find(|c| c.id == p.category_id)
                    .map(|c| c.name.clone()),
                brand_name: p.brand_id.and_then(|id| {
                    tables
                        .brands
                        .iter()
                        .find(|b| b.id == id)
                        .map(|b| b.name.clone())
                }),
            })
            .collect();
        Ok(paginate(rows, state, |a, b| {
            let (a, b) = (&a.product, &b.product);
            match state.sort_field {
                ProductSortField::Id => a.id.cmp(&b.id),
                ProductSortField::Name => a.name.cmp(&b.name),
                ProductSortField::Slug => a.slug.cmp(&b.slug),
                ProductSortField::Price => a.price.cmp(&b.price),
                ProductSortField::OldPrice => a.old_price.cmp(&b.old_price),
                ProductSortField::Sku => a.sku.cmp(&b.sku),
                ProductSortField::Stock => a.stock.cmp(&b.stock),
                ProductSortField::CategoryId => a.category_id.cmp(&b.category_id),
                ProductSortField::BrandId => a.brand_id.cmp(&b.brand_id),
                ProductSortField::IsActive => a.is_active.cmp(&b.is_active),
                ProductSortField::IsFeatured => a.is_featured.cmp(&b.is_featured),
                ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                ProductSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            }
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .products
            .iter()
            .any(|p| p.name == name && Some(p.id) != except))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .products
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    async fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .products
            .iter()
            .any(|p| p.sku.as_deref() == Some(sku) && Some(p.id) != except))
    }

    async fn create(&self, draft: &ProductDraft) -> AppResult<Product> {
        let mut tables = self.write()?;
        Ok(tables.insert_product(draft))
    }

    async fn save_with_images(
        &self,
        id: Option<Uuid>,
        draft: &ProductDraft,
        images: &ImageChanges,
    ) -> AppResult<(Product, Vec<ProductImage>)> {
        let mut tables = self.write()?;
        let product = match id {
            Some(id) => {
                let product = tables
                    .products
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(AppError::NotFound)?;
                apply_draft(product, draft);
                product.clone()
            }
            None => tables.insert_product(draft),
        };

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.images)
            .into_iter()
            .partition(|i| i.product_id == product.id && images.remove.contains(&i.id));
        tables.images = kept;
        for path in &images.add {
            tables.images.push(ProductImage {
                id: Uuid::new_v4(),
                product_id: product.id,
                image_path: path.clone(),
                thumbnail_path: None,
                image_url: None,
                is_main: false,
                sort_order: 0,
                created_at: Utc::now(),
            });
        }
        Ok((product, removed))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.write()?;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Ok(false);
        }
        tables.images.retain(|i| i.product_id != id);
        Ok(true)
    }
}

impl ProductImageRepository for MemoryStore {
    async fn for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductImage>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn for_category(&self, category_id: Uuid) -> AppResult<Vec<ProductImage>> {
        let tables = self.tables.lock().unwrap();
        let products: Vec<Uuid> = tables
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .map(|p| p.id)
            .collect();
        Ok(tables
            .images
            .iter()
            .filter(|i| products.contains(&i.product_id))
            .cloned()
            .collect())
    }
}

impl OrderRepository for MemoryStore {
    async fn list(
        &self,
        state: &ListState<OrderSortField>,
        status: Option<&str>,
    ) -> AppResult<Page<Order>> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<Order> = tables
            .orders
            .iter()
            .map(|o| &o.order)
            .filter(|o| status.is_none_or(|s| o.status == s))
            .filter(|o| contains_term(&state.search, &[Some(o.order_number.as_str())]))
            .cloned()
            .collect();
        Ok(paginate(rows, state, |a, b| match state.sort_field {
            OrderSortField::Id => a.id.cmp(&b.id),
            OrderSortField::OrderNumber => a.order_number.cmp(&b.order_number),
            OrderSortField::TotalAmount => a.total_amount.cmp(&b.total_amount),
            OrderSortField::Status => a.status.cmp(&b.status),
            OrderSortField::PaymentStatus => a.payment_status.cmp(&b.payment_status),
            OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }))
    }

    async fn find_with_items(&self, id: Uuid) -> AppResult<Option<OrderWithItems>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.orders.iter().find(|o| o.order.id == id).cloned())
    }
}

impl UserRepository for MemoryStore {
    async fn list(&self, state: &ListState<UserSortField>) -> AppResult<Page<User>> {
        let tables = self.tables.lock().unwrap();
        let rows: Vec<User> = tables
            .users
            .iter()
            .map(|(user, _)| user)
            .filter(|u| {
                contains_term(&state.search, &[Some(u.name.as_str()), Some(u.email.as_str())])
            })
            .cloned()
            .collect();
        Ok(paginate(rows, state, |a, b| match state.sort_field {
            UserSortField::Id => a.id.cmp(&b.id),
            UserSortField::Name => a.name.cmp(&b.name),
            UserSortField::Email => a.email.cmp(&b.email),
            UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(user, hash)| UserAccount {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().any(|(u, _)| u.email == email))
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut tables = self.write()?;
        let row = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        tables.users.push((row.clone(), user.password_hash.clone()));
        Ok(row)
    }
}

impl RoleRepository for MemoryStore {
    async fn all(&self) -> AppResult<Vec<Role>> {
        let tables = self.tables.lock().unwrap();
        let mut roles = tables.roles.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn names_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let tables = self.tables.lock().unwrap();
        let mut names: Vec<String> = tables
            .user_roles
            .iter()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, role)| tables.roles.iter().find(|r| r.id == *role))
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn names_for_users(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
        let mut by_user = HashMap::new();
        for id in user_ids {
            let names = self.names_for_user(*id).await?;
            if !names.is_empty() {
                by_user.insert(*id, names);
            }
        }
        Ok(by_user)
    }

    async fn has_any_role(&self, user_id: Uuid) -> AppResult<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.user_roles.iter().any(|(user, _)| *user == user_id))
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let mut tables = self.write()?;
        if !tables.user_roles.contains(&(user_id, role_id)) {
            tables.user_roles.push((user_id, role_id));
        }
        Ok(())
    }

    async fn sync(&self, user_id: Uuid, names: &[String]) -> AppResult<()> {
        let mut tables = self.write()?;
        let role_ids: Vec<Uuid> = tables
            .roles
            .iter()
            .filter(|r| names.contains(&r.name))
            .map(|r| r.id)
            .collect();
        tables.user_roles.retain(|(user, _)| *user != user_id);
        for role_id in role_ids {
            tables.user_roles.push((user_id, role_id));
        }
        Ok(())
    }
}
