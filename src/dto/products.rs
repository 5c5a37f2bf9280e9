use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    listing::ListingState,
    models::{OptionItem, ProductListItem},
    upload::{MultipartForm, UploadedFile},
};

/// Images of a product queued for removal on the next save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDeletionSet(Vec<Uuid>);

impl ImageDeletionSet {
    /// Mark `id`, or un-mark it when it is already marked. Returns whether the
    /// image is marked afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        match self.0.iter().position(|marked| *marked == id) {
            Some(index) => {
                self.0.remove(index);
                false
            }
            None => {
                self.0.push(id);
                true
            }
        }
    }

    pub fn is_marked(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Product create/edit form as submitted. Values stay raw until the service
/// validates them.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<String>,
    pub old_price: Option<String>,
    pub sku: Option<String>,
    pub stock: Option<String>,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    pub is_active: Option<String>,
    pub is_featured: Option<String>,
    pub images: Vec<UploadedFile>,
    pub delete_images: ImageDeletionSet,
}

impl ProductForm {
    /// Every `toggle_image` value flips that image's mark, so an id sent
    /// twice ends up unmarked.
    pub fn from_multipart(form: &MultipartForm) -> AppResult<Self> {
        let mut delete_images = ImageDeletionSet::default();
        for raw in form.texts("toggle_image") {
            let id = Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid image id: {raw}")))?;
            delete_images.toggle(id);
        }

        Ok(Self {
            name: form.text("name"),
            description: form.text("description"),
            short_description: form.text("short_description"),
            price: form.text("price"),
            old_price: form.text("old_price"),
            sku: form.text("sku"),
            stock: form.text("stock"),
            category_id: form.text("category_id"),
            brand_id: form.text("brand_id"),
            is_active: form.text("is_active"),
            is_featured: form.text("is_featured"),
            images: form.files("images"),
            delete_images,
        })
    }
}

/// `multipart/form-data` body of the product create/update endpoints.
#[derive(ToSchema)]
pub struct ProductUpload {
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    #[schema(example = "100.00")]
    pub price: String,
    pub old_price: Option<String>,
    pub sku: Option<String>,
    pub stock: i32,
    pub category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// New images; each at most 2048 KiB.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<String>,
    /// Existing image ids to remove. Repeating an id cancels it.
    pub toggle_image: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductListItem>,
    pub listing: ListingState,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFormOptions {
    pub categories: Vec<OptionItem>,
    pub brands: Vec<OptionItem>,
}
