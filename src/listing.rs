//! Search, sort and pagination state shared by the admin list endpoints.
//!
//! A list request carries the state the client last saw plus optional
//! commands (`sort_by`, `new_search`, `new_per_page`). The commands are
//! applied to the state and the result is echoed back in the response.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Page sizes a caller may pick from.
pub const PAGE_SIZES: [u64; 4] = [10, 25, 50, 100];
pub const DEFAULT_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn order(self) -> sea_orm::Order {
        match self {
            SortDirection::Asc => sea_orm::Order::Asc,
            SortDirection::Desc => sea_orm::Order::Desc,
        }
    }
}

/// A column a list can be ordered by.
pub trait SortField: Copy + PartialEq + Default {
    fn as_str(&self) -> &'static str;
}

macro_rules! sort_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $column:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl SortField for $name {
            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $column),+
                }
            }
        }
    };
}

sort_fields!(CategorySortField {
    Id => "id",
    Name => "name",
    Slug => "slug",
    Description => "description",
    ParentId => "parent_id",
    IsActive => "is_active",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
});

sort_fields!(BrandSortField {
    Id => "id",
    Name => "name",
    Slug => "slug",
    IsActive => "is_active",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
});

sort_fields!(ProductSortField {
    Id => "id",
    Name => "name",
    Slug => "slug",
    Price => "price",
    OldPrice => "old_price",
    Sku => "sku",
    Stock => "stock",
    CategoryId => "category_id",
    BrandId => "brand_id",
    IsActive => "is_active",
    IsFeatured => "is_featured",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
});

sort_fields!(UserSortField {
    Id => "id",
    Name => "name",
    Email => "email",
    CreatedAt => "created_at",
});

sort_fields!(OrderSortField {
    Id => "id",
    OrderNumber => "order_number",
    TotalAmount => "total_amount",
    Status => "status",
    PaymentStatus => "payment_status",
    CreatedAt => "created_at",
});

/// How a list decides its page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// Always this many rows; requested sizes are ignored.
    Fixed(u64),
    /// One of [`PAGE_SIZES`], [`DEFAULT_PER_PAGE`] when not given.
    Choice,
}

impl PageSize {
    pub fn resolve(self, requested: Option<u64>) -> AppResult<u64> {
        match (self, requested) {
            (PageSize::Fixed(size), _) => Ok(size),
            (PageSize::Choice, None) => Ok(DEFAULT_PER_PAGE),
            (PageSize::Choice, Some(size)) if PAGE_SIZES.contains(&size) => Ok(size),
            (PageSize::Choice, Some(size)) => Err(AppError::BadRequest(format!(
                "per_page must be one of 10, 25, 50, 100 (got {size})"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F> {
    pub search: String,
    pub sort_field: F,
    pub sort_direction: SortDirection,
    pub per_page: u64,
    pub page: u64,
}

impl<F: SortField> ListState<F> {
    pub fn new(per_page: u64) -> Self {
        Self {
            search: String::new(),
            sort_field: F::default(),
            sort_direction: SortDirection::Asc,
            per_page,
            page: 1,
        }
    }

    /// Clicking the current sort column flips the direction; any other
    /// column sorts ascending.
    pub fn sort_by(&mut self, field: F) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_direction = SortDirection::Asc;
        }
        self.sort_field = field;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn set_per_page(&mut self, per_page: u64) {
        self.per_page = per_page;
        self.page = 1;
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    /// ILIKE pattern matching the search term anywhere, or `None` when there
    /// is nothing to filter on.
    pub fn like_pattern(&self) -> Option<String> {
        if self.search.is_empty() {
            None
        } else {
            Some(format!("%{}%", escape_like(&self.search)))
        }
    }
}

/// Escape the LIKE wildcards so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Query string of a list endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct ListQuery<F> {
    pub search: Option<String>,
    pub sort_field: Option<F>,
    pub sort_direction: Option<SortDirection>,
    pub per_page: Option<u64>,
    pub page: Option<u64>,
    /// Column the user clicked.
    pub sort_by: Option<F>,
    /// Replacement search term; resets the page.
    pub new_search: Option<String>,
    /// Replacement page size; resets the page.
    pub new_per_page: Option<u64>,
}

impl<F> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            search: None,
            sort_field: None,
            sort_direction: None,
            per_page: None,
            page: None,
            sort_by: None,
            new_search: None,
            new_per_page: None,
        }
    }
}

impl<F: SortField> ListQuery<F> {
    pub fn into_state(self, page_size: PageSize) -> AppResult<ListState<F>> {
        let mut state = ListState {
            search: self.search.unwrap_or_default(),
            sort_field: self.sort_field.unwrap_or_default(),
            sort_direction: self.sort_direction.unwrap_or_default(),
            per_page: page_size.resolve(self.per_page)?,
            page: self.page.unwrap_or(1).max(1),
        };
        if let Some(field) = self.sort_by {
            state.sort_by(field);
        }
        if let Some(term) = self.new_search {
            state.set_search(term);
        }
        if let Some(per_page) = self.new_per_page {
            state.set_per_page(page_size.resolve(Some(per_page))?);
        }
        // Postgres takes the offset as a signed bigint.
        let in_range = (state.page - 1)
            .checked_mul(state.per_page)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !in_range {
            return Err(AppError::BadRequest(format!(
                "Page {} is out of range",
                state.page
            )));
        }
        Ok(state)
    }
}

/// One page of rows plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// List state as echoed back to the client.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct ListingState {
    pub search: String,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub per_page: u64,
    pub page: u64,
}

impl<F: SortField> From<&ListState<F>> for ListingState {
    fn from(state: &ListState<F>) -> Self {
        Self {
            search: state.search.clone(),
            sort_field: state.sort_field.as_str().to_string(),
            sort_direction: state.sort_direction,
            per_page: state.per_page,
            page: state.page,
        }
    }
}
