use uuid::Uuid;

use crate::{
    dto::categories::{CategoryForm, CategoryList},
    error::{AppError, AppResult},
    listing::{CategorySortField, ListQuery, ListingState, PageSize},
    models::{Category, OptionItem},
    repository::{CategoryDraft, CategoryRepository, ProductImageRepository},
    response::{ApiResponse, Meta},
    slug::slugify,
    storage::{FileStorage, remove_files},
    validation::{ValidationErrors, non_blank, required_text},
};

/// Categories are always listed ten per page.
pub const CATEGORY_PAGE_SIZE: PageSize = PageSize::Fixed(10);

pub async fn list_categories<C: CategoryRepository>(
    categories: &C,
    query: ListQuery<CategorySortField>,
) -> AppResult<ApiResponse<CategoryList>> {
    let state = query.into_state(CATEGORY_PAGE_SIZE)?;
    let page = categories.list(&state).await?;
    let meta = Meta::new(state.page, state.per_page, page.total);
    let data = CategoryList {
        items: page.items,
        listing: ListingState::from(&state),
    };
    Ok(ApiResponse::success("Categories", data, Some(meta)))
}

pub async fn get_category<C: CategoryRepository>(
    categories: &C,
    id: Uuid,
) -> AppResult<ApiResponse<Category>> {
    let category = match categories.find_by_id(id).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Category", category, None))
}

/// Categories a category may be placed under: all of them except itself.
pub async fn parent_options<C: CategoryRepository>(
    categories: &C,
    exclude: Option<Uuid>,
) -> AppResult<ApiResponse<Vec<OptionItem>>> {
    let options = categories.options(exclude).await?;
    Ok(ApiResponse::success("Parent categories", options, None))
}

/// Run the form rules. `id` is the row being edited, if any.
pub async fn validate_category<C: CategoryRepository>(
    categories: &C,
    id: Option<Uuid>,
    form: &CategoryForm,
) -> AppResult<CategoryDraft> {
    let mut errors = ValidationErrors::new();

    let name = form.name.trim();
    if let Some(name) = required_text(
        &mut errors,
        "name",
        name,
        255,
        "The category name is required.",
    ) {
        if categories.name_taken(name, id).await? {
            errors.add("name", "A category with this name already exists.");
        }
    }

    let slug = slugify(name);
    if let Some(slug) = required_text(&mut errors, "slug", &slug, 255, "The slug is required.") {
        if categories.slug_taken(slug, id).await? {
            errors.add(
                "slug",
                "An identical slug already exists. Try changing the category name.",
            );
        }
    }

    if let Some(parent_id) = form.parent_id {
        // Only direct self-parenting is rejected; deeper cycles are not walked.
        if Some(parent_id) == id || !categories.exists(parent_id).await? {
            errors.add("parent_id", "The selected parent category is invalid.");
        }
    }

    errors.into_result()?;
    Ok(CategoryDraft {
        name: name.to_string(),
        slug,
        description: non_blank(form.description.as_deref()),
        parent_id: form.parent_id,
        is_active: form.is_active,
    })
}

pub async fn save_category<C: CategoryRepository>(
    categories: &C,
    id: Option<Uuid>,
    form: CategoryForm,
) -> AppResult<ApiResponse<Category>> {
    if let Some(id) = id {
        if !categories.exists(id).await? {
            return Err(AppError::NotFound);
        }
    }

    let draft = validate_category(categories, id, &form).await?;

    let (result, message) = match id {
        Some(id) => (
            categories.update(id, &draft).await,
            "Category updated successfully.",
        ),
        None => (
            categories.create(&draft).await,
            "Category created successfully.",
        ),
    };
    let category = result.map_err(|e| AppError::failed("Error saving the category", e))?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category saved");
    Ok(ApiResponse::success(message, category, Some(Meta::empty())))
}

/// Delete a category. Its products go with it at the schema level, so their
/// image files are collected first and removed once the row is gone.
pub async fn delete_category<C, I, S>(
    categories: &C,
    images: &I,
    storage: &S,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>>
where
    C: CategoryRepository,
    I: ProductImageRepository,
    S: FileStorage,
{
    if !categories.exists(id).await? {
        return Err(AppError::NotFound);
    }

    let doomed = images.for_category(id).await?;
    let deleted = categories
        .delete(id)
        .await
        .map_err(|e| AppError::failed("Error deleting the category", e))?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    let paths: Vec<String> = doomed
        .iter()
        .flat_map(|image| image.file_paths().cloned())
        .collect();
    let removed = remove_files(storage, &paths).await;
    tracing::info!(category_id = %id, files_removed = removed, "category deleted");

    Ok(ApiResponse::success(
        "Category deleted successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
