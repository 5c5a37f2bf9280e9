use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    listing::ListingState,
    models::Brand,
    upload::{MultipartForm, UploadedFile},
};

/// Brand create/edit form as submitted.
#[derive(Debug, Clone, Default)]
pub struct BrandForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<String>,
    pub logo: Option<UploadedFile>,
    /// Drop the current logo without uploading a new one.
    pub remove_logo: Option<String>,
}

impl BrandForm {
    pub fn from_multipart(form: &MultipartForm) -> Self {
        Self {
            name: form.text("name"),
            description: form.text("description"),
            is_active: form.text("is_active"),
            logo: form.files("logo").into_iter().last(),
            remove_logo: form.text("remove_logo"),
        }
    }
}

/// `multipart/form-data` body of the brand create/update endpoints.
#[derive(ToSchema)]
pub struct BrandUpload {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub logo: Option<String>,
    pub remove_logo: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandList {
    pub items: Vec<Brand>,
    pub listing: ListingState,
}
