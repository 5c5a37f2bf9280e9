use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::products::{ProductForm, ProductFormOptions, ProductList},
    error::{AppError, AppResult},
    listing::{ListQuery, ListingState, PageSize, ProductSortField},
    models::{ProductImage, ProductWithImages},
    repository::{
        BrandRepository, CategoryRepository, ImageChanges, ProductDraft, ProductImageRepository,
        ProductRepository,
    },
    response::{ApiResponse, Meta},
    slug::slugify,
    storage::{FileStorage, remove_files},
    upload::{ImageKind, check_image},
    validation::{ValidationErrors, boolean, non_blank, optional_text, required_text},
};

/// Directory new product images are stored under.
pub const PRODUCT_IMAGE_DIR: &str = "products";

// 0.01
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
// 99999999.99, the largest value a NUMERIC(10,2) column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub async fn list_products<P: ProductRepository>(
    products: &P,
    query: ListQuery<ProductSortField>,
) -> AppResult<ApiResponse<ProductList>> {
    let state = query.into_state(PageSize::Choice)?;
    let page = products.list(&state).await?;
    let meta = Meta::new(state.page, state.per_page, page.total);
    let data = ProductList {
        items: page.items,
        listing: ListingState::from(&state),
    };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product<P, I, S>(
    products: &P,
    images: &I,
    storage: &S,
    id: Uuid,
) -> AppResult<ApiResponse<ProductWithImages>>
where
    P: ProductRepository,
    I: ProductImageRepository,
    S: FileStorage,
{
    let product = match products.find_by_id(id).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    let images = with_urls(storage, images.for_product(id).await?);
    Ok(ApiResponse::success(
        "Product",
        ProductWithImages { product, images },
        None,
    ))
}

/// Category and brand choices for the product form, both ordered by name.
pub async fn form_options<C: CategoryRepository, B: BrandRepository>(
    categories: &C,
    brands: &B,
) -> AppResult<ApiResponse<ProductFormOptions>> {
    let data = ProductFormOptions {
        categories: categories.options(None).await?,
        brands: brands.options().await?,
    };
    Ok(ApiResponse::success("Product form options", data, None))
}

/// Plain decimals or exponent notation such as `1e2`.
fn parse_money(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Run the form rules. Returns the draft plus the detected format of each
/// uploaded image, in upload order.
pub async fn validate_product<P, C, B>(
    products: &P,
    categories: &C,
    brands: &B,
    id: Option<Uuid>,
    form: &ProductForm,
) -> AppResult<(ProductDraft, Vec<ImageKind>)>
where
    P: ProductRepository,
    C: CategoryRepository,
    B: BrandRepository,
{
    let mut errors = ValidationErrors::new();

    let name = form.name.as_deref().unwrap_or_default();
    if let Some(name) = required_text(
        &mut errors,
        "name",
        name,
        255,
        "The product name is required.",
    ) {
        if products.name_taken(name, id).await? {
            errors.add("name", "A product with this name already exists.");
        }
    }

    let slug = slugify(name);
    if let Some(slug) = required_text(
        &mut errors,
        "slug",
        &slug,
        255,
        "The product slug is required.",
    ) {
        if products.slug_taken(slug, id).await? {
            errors.add(
                "slug",
                "An identical slug already exists. Try changing the product name.",
            );
        }
    }

    let description = form.description.as_deref().unwrap_or_default();
    if description.is_empty() {
        errors.add("description", "The description is required.");
    }
    optional_text(
        &mut errors,
        "short_description",
        form.short_description.as_deref(),
        500,
    );

    let price = match form.price.as_deref().map(parse_money) {
        None => {
            errors.add("price", "The price is required.");
            None
        }
        Some(None) => {
            errors.add("price", "The price must be a number.");
            None
        }
        Some(Some(price)) if price < MIN_PRICE => {
            errors.add("price", "The price must be at least 0.01.");
            None
        }
        Some(Some(price)) if price > MAX_PRICE => {
            errors.add("price", "The price may not be greater than 99999999.99.");
            None
        }
        Some(Some(price)) => Some(price.round_dp(2)),
    };

    let old_price = match form.old_price.as_deref().map(parse_money) {
        None => None,
        Some(None) => {
            errors.add("old_price", "The old price must be a number.");
            None
        }
        Some(Some(old)) if old < MIN_PRICE => {
            errors.add("old_price", "The old price must be at least 0.01.");
            None
        }
        Some(Some(old)) if old > MAX_PRICE => {
            errors.add("old_price", "The old price may not be greater than 99999999.99.");
            None
        }
        Some(Some(old)) => {
            let old = old.round_dp(2);
            if price.is_some_and(|price| old <= price) {
                errors.add(
                    "old_price",
                    "The old price must be greater than the current price.",
                );
            }
            Some(old)
        }
    };

    let sku = non_blank(form.sku.as_deref());
    optional_text(&mut errors, "sku", sku.as_deref(), 255);
    if let Some(sku) = sku.as_deref() {
        if products.sku_taken(sku, id).await? {
            errors.add("sku", "An identical SKU already exists.");
        }
    }

    let stock = match form.stock.as_deref().map(|raw| raw.parse::<i32>()) {
        None => {
            errors.add("stock", "The stock is required.");
            0
        }
        Some(Err(_)) => {
            errors.add("stock", "The stock must be an integer.");
            0
        }
        Some(Ok(stock)) if stock < 0 => {
            errors.add("stock", "The stock cannot be negative.");
            0
        }
        Some(Ok(stock)) => stock,
    };

    let category_id = match form.category_id.as_deref() {
        None => {
            errors.add("category_id", "The category is required.");
            None
        }
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(category_id) if categories.exists(category_id).await? => Some(category_id),
            _ => {
                errors.add("category_id", "The selected category is invalid.");
                None
            }
        },
    };

    let brand_id = match form.brand_id.as_deref() {
        None => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(brand_id) if brands.exists(brand_id).await? => Some(brand_id),
            _ => {
                errors.add("brand_id", "The selected brand is invalid.");
                None
            }
        },
    };

    let is_active = boolean(&mut errors, "is_active", form.is_active.as_deref(), true);
    let is_featured = boolean(&mut errors, "is_featured", form.is_featured.as_deref(), false);

    let mut kinds = Vec::with_capacity(form.images.len());
    for (index, file) in form.images.iter().enumerate() {
        match check_image(file) {
            Ok(kind) => kinds.push(kind),
            Err(rejections) => {
                for rejection in rejections {
                    errors.add(format!("images.{index}"), rejection.message("Each file"));
                }
            }
        }
    }

    errors.into_result()?;

    let (Some(price), Some(category_id)) = (price, category_id) else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "validated product is missing price or category"
        )));
    };
    let draft = ProductDraft {
        name: name.to_string(),
        slug,
        description: description.to_string(),
        short_description: non_blank(form.short_description.as_deref()),
        price,
        old_price,
        sku,
        stock,
        category_id,
        brand_id,
        is_active,
        is_featured,
    };
    Ok((draft, kinds))
}

/// Create or update a product, then apply its image changes: marked images
/// of this product are removed (row and files) and every upload is stored
/// as a new, non-main image.
#[allow(clippy::too_many_arguments)]
pub async fn save_product<P, I, C, B, S>(
    products: &P,
    images: &I,
    categories: &C,
    brands: &B,
    storage: &S,
    id: Option<Uuid>,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductWithImages>>
where
    P: ProductRepository,
    I: ProductImageRepository,
    C: CategoryRepository,
    B: BrandRepository,
    S: FileStorage,
{
    if let Some(id) = id {
        if products.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let (draft, kinds) = validate_product(products, categories, brands, id, &form).await?;

    let saved = persist_product(products, images, storage, id, &draft, &form, &kinds)
        .await
        .map_err(|e| AppError::failed("Error saving the product", e))?;

    let message = if id.is_some() {
        "Product updated successfully."
    } else {
        "Product created successfully."
    };
    tracing::info!(
        product_id = %saved.product.id,
        images = saved.images.len(),
        "product saved"
    );
    Ok(ApiResponse::success(message, saved, Some(Meta::empty())))
}

/// Store the uploads, then write the product and its image rows in one
/// transaction. Files of dropped images are removed only after the commit;
/// new files are removed again when any step fails.
async fn persist_product<P, I, S>(
    products: &P,
    images: &I,
    storage: &S,
    id: Option<Uuid>,
    draft: &ProductDraft,
    form: &ProductForm,
    kinds: &[ImageKind],
) -> AppResult<ProductWithImages>
where
    P: ProductRepository,
    I: ProductImageRepository,
    S: FileStorage,
{
    let mut changes = ImageChanges {
        remove: form.delete_images.ids().to_vec(),
        add: Vec::with_capacity(kinds.len()),
    };
    for (file, kind) in form.images.iter().zip(kinds) {
        match storage
            .store(PRODUCT_IMAGE_DIR, kind.extension(), &file.bytes)
            .await
        {
            Ok(path) => changes.add.push(path),
            Err(err) => {
                remove_files(storage, &changes.add).await;
                return Err(err.into());
            }
        }
    }

    let (product, removed) = match products.save_with_images(id, draft, &changes).await {
        Ok(saved) => saved,
        Err(err) => {
            remove_files(storage, &changes.add).await;
            return Err(err);
        }
    };

    for image in &removed {
        let paths: Vec<String> = image.file_paths().cloned().collect();
        remove_files(storage, &paths).await;
        tracing::debug!(image_id = %image.id, "removed product image");
    }

    let stored = with_urls(storage, images.for_product(product.id).await?);
    Ok(ProductWithImages {
        product,
        images: stored,
    })
}

/// Delete a product. Image rows cascade; their files are removed here.
pub async fn delete_product<P, I, S>(
    products: &P,
    images: &I,
    storage: &S,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>>
where
    P: ProductRepository,
    I: ProductImageRepository,
    S: FileStorage,
{
    if products.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let doomed = images.for_product(id).await?;
    let deleted = products
        .delete(id)
        .await
        .map_err(|e| AppError::failed("Error deleting the product", e))?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    let paths: Vec<String> = doomed
        .iter()
        .flat_map(|image| image.file_paths().cloned())
        .collect();
    let removed = remove_files(storage, &paths).await;
    tracing::info!(product_id = %id, files_removed = removed, "product deleted");

    Ok(ApiResponse::success(
        "Product deleted successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn with_urls<S: FileStorage>(storage: &S, images: Vec<ProductImage>) -> Vec<ProductImage> {
    images
        .into_iter()
        .map(|mut image| {
            image.image_url = Some(storage.url(&image.image_path));
            image
        })
        .collect()
}
