use uuid::Uuid;

use crate::{
    dto::brands::{BrandForm, BrandList},
    error::{AppError, AppResult},
    listing::{BrandSortField, ListQuery, ListingState, PageSize},
    models::Brand,
    repository::{BrandDraft, BrandRepository},
    response::{ApiResponse, Meta},
    slug::slugify,
    storage::{FileStorage, remove_files},
    upload::{ImageKind, check_image},
    validation::{ValidationErrors, boolean, non_blank, required_text},
};

pub const BRAND_LOGO_DIR: &str = "brands";

pub async fn list_brands<B: BrandRepository, S: FileStorage>(
    brands: &B,
    storage: &S,
    query: ListQuery<BrandSortField>,
) -> AppResult<ApiResponse<BrandList>> {
    let state = query.into_state(PageSize::Choice)?;
    let page = brands.list(&state).await?;
    let meta = Meta::new(state.page, state.per_page, page.total);
    let data = BrandList {
        items: page
            .items
            .into_iter()
            .map(|brand| with_logo_url(storage, brand))
            .collect(),
        listing: ListingState::from(&state),
    };
    Ok(ApiResponse::success("Brands", data, Some(meta)))
}

pub async fn get_brand<B: BrandRepository, S: FileStorage>(
    brands: &B,
    storage: &S,
    id: Uuid,
) -> AppResult<ApiResponse<Brand>> {
    let brand = brands.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Brand",
        with_logo_url(storage, brand),
        None,
    ))
}

struct ValidatedBrand {
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    remove_logo: bool,
    logo: Option<ImageKind>,
}

async fn validate_brand<B: BrandRepository>(
    brands: &B,
    id: Option<Uuid>,
    form: &BrandForm,
) -> AppResult<ValidatedBrand> {
    let mut errors = ValidationErrors::new();

    let name = form.name.as_deref().map(str::trim).unwrap_or_default();
    if let Some(name) = required_text(&mut errors, "name", name, 255, "The brand name is required.")
    {
        if brands.name_taken(name, id).await? {
            errors.add("name", "A brand with this name already exists.");
        }
    }

    let slug = slugify(name);
    if let Some(slug) = required_text(&mut errors, "slug", &slug, 255, "The slug is required.") {
        if brands.slug_taken(slug, id).await? {
            errors.add(
                "slug",
                "An identical slug already exists. Try changing the brand name.",
            );
        }
    }

    let is_active = boolean(&mut errors, "is_active", form.is_active.as_deref(), true);
    let remove_logo = boolean(&mut errors, "remove_logo", form.remove_logo.as_deref(), false);

    let logo = match form.logo.as_ref().map(check_image) {
        None => None,
        Some(Ok(kind)) => Some(kind),
        Some(Err(rejections)) => {
            for rejection in rejections {
                errors.add("logo", rejection.message("The logo"));
            }
            None
        }
    };

    errors.into_result()?;
    Ok(ValidatedBrand {
        name: name.to_string(),
        slug,
        description: non_blank(form.description.as_deref()),
        is_active,
        remove_logo,
        logo,
    })
}

/// Create or update a brand. A new logo replaces the old one, whose file is
/// removed once the row points at the new path.
pub async fn save_brand<B: BrandRepository, S: FileStorage>(
    brands: &B,
    storage: &S,
    id: Option<Uuid>,
    form: BrandForm,
) -> AppResult<ApiResponse<Brand>> {
    let existing = match id {
        Some(id) => Some(brands.find_by_id(id).await?.ok_or(AppError::NotFound)?),
        None => None,
    };

    let valid = validate_brand(brands, id, &form).await?;

    let new_logo = match (valid.logo, form.logo.as_ref()) {
        (Some(kind), Some(file)) => Some(
            storage
                .store(BRAND_LOGO_DIR, kind.extension(), &file.bytes)
                .await
                .map_err(|e| AppError::failed("Error saving the brand", e.into()))?,
        ),
        _ => None,
    };
    let old_logo = existing.and_then(|brand| brand.logo_path);
    let logo_path = match &new_logo {
        Some(path) => Some(path.clone()),
        None if valid.remove_logo => None,
        None => old_logo.clone(),
    };

    let draft = BrandDraft {
        name: valid.name,
        slug: valid.slug,
        description: valid.description,
        logo_path,
        is_active: valid.is_active,
    };
    let (result, message) = match id {
        Some(id) => (brands.update(id, &draft).await, "Brand updated successfully."),
        None => (brands.create(&draft).await, "Brand created successfully."),
    };
    let brand = match result {
        Ok(brand) => brand,
        Err(err) => {
            if let Some(path) = new_logo {
                remove_files(storage, &[path]).await;
            }
            return Err(AppError::failed("Error saving the brand", err));
        }
    };

    if let Some(old) = old_logo {
        if brand.logo_path.as_ref() != Some(&old) {
            remove_files(storage, &[old]).await;
        }
    }

    tracing::info!(brand_id = %brand.id, slug = %brand.slug, "brand saved");
    Ok(ApiResponse::success(
        message,
        with_logo_url(storage, brand),
        Some(Meta::empty()),
    ))
}

/// Delete a brand. Its products stay, with `brand_id` cleared by the schema.
pub async fn delete_brand<B: BrandRepository, S: FileStorage>(
    brands: &B,
    storage: &S,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let brand = brands.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let deleted = brands
        .delete(id)
        .await
        .map_err(|e| AppError::failed("Error deleting the brand", e))?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    if let Some(logo) = brand.logo_path {
        remove_files(storage, &[logo]).await;
    }
    tracing::info!(brand_id = %id, "brand deleted");
    Ok(ApiResponse::success(
        "Brand deleted successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn with_logo_url<S: FileStorage>(storage: &S, mut brand: Brand) -> Brand {
    brand.logo_url = brand.logo_path.as_deref().map(|path| storage.url(path));
    brand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::categories::CategoryForm,
        repository::{ProductDraft, ProductRepository, memory::MemoryStore},
        services::category_service::save_category,
        storage::LocalStorage,
        upload::UploadedFile,
    };
    use rust_decimal::Decimal;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    fn form(name: &str) -> BrandForm {
        BrandForm {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn replacing_logo_removes_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage");
        let store = MemoryStore::new();

        let mut create = form("Acme");
        create.logo = Some(UploadedFile::new("logo.gif", GIF.to_vec()));
        let brand = save_brand(&store, &storage, None, create)
            .await
            .unwrap()
            .data
            .unwrap();
        let first = brand.logo_path.clone().unwrap();
        assert!(first.starts_with("brands/") && first.ends_with(".gif"));
        assert_eq!(brand.logo_url, Some(format!("/storage/{first}")));

        let mut replace = form("Acme");
        replace.logo = Some(UploadedFile::new("logo2.gif", GIF.to_vec()));
        let updated = save_brand(&store, &storage, Some(brand.id), replace)
            .await
            .unwrap()
            .data
            .unwrap();
        let second = updated.logo_path.unwrap();
        assert_ne!(first, second);
        assert!(!dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());

        let kept = save_brand(&store, &storage, Some(brand.id), form("Acme Corp"))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(kept.logo_path.as_deref(), Some(second.as_str()));
        assert_eq!(kept.slug, "acme-corp");

        let mut drop_logo = form("Acme Corp");
        drop_logo.remove_logo = Some("1".into());
        let cleared = save_brand(&store, &storage, Some(brand.id), drop_logo)
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(cleared.logo_path, None);
        assert!(!dir.path().join(&second).exists());
    }

    #[tokio::test]
    async fn invalid_logo_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage");
        let store = MemoryStore::new();
        let mut create = form("Acme");
        create.logo = Some(UploadedFile::new("logo.gif", b"plain text".to_vec()));
        let err = save_brand(&store, &storage, None, create).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.messages("logo"), ["The logo must be an image."]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleting_brand_keeps_products() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage");
        let store = MemoryStore::new();
        let brand = save_brand(&store, &storage, None, form("Acme"))
            .await
            .unwrap()
            .data
            .unwrap();
        let category = save_category(
            &store,
            None,
            CategoryForm {
                name: "Tools".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
        let product = ProductRepository::create(
            &store,
            &ProductDraft {
                name: "Hammer".into(),
                slug: "hammer".into(),
                description: "Hits nails".into(),
                short_description: None,
                price: Decimal::new(999, 2),
                old_price: None,
                sku: None,
                stock: 3,
                category_id: category.id,
                brand_id: Some(brand.id),
                is_active: true,
                is_featured: false,
            },
        )
        .await
        .unwrap();

        delete_brand(&store, &storage, brand.id).await.unwrap();
        let product = ProductRepository::find_by_id(&store, product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.brand_id, None);
        assert!(matches!(
            delete_brand(&store, &storage, brand.id).await,
            Err(AppError::NotFound)
        ));
    }
}
