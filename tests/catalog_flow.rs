use catalog_admin::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::RegisterRequest, categories::CategoryForm, products::ProductForm,
        users::UpdateUserRolesRequest,
    },
    entity::roles::{ActiveModel as RoleActive, DEFAULT_GUARD},
    error::AppError,
    listing::{ListQuery, ProductSortField, SortDirection},
    repository::RoleRepository,
    services::{auth_service, category_service, product_service, role_service},
    state::AppState,
    upload::UploadedFile,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// Registration hook, role editor, category and product forms against a real database.
#[tokio::test]
async fn catalog_admin_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let files = tempfile::tempdir()?;
    let state = setup_state(&database_url, files.path().to_string_lossy().as_ref()).await?;

    // No roles yet: registration succeeds and assigns nothing.
    let early = register(&state, "early@example.com").await?;
    assert!(state.roles().names_for_user(early).await?.is_empty());

    for name in ["admin", "seller", "client"] {
        create_role(&state, name).await?;
    }
    let ann = register(&state, "ann@example.com").await?;
    assert_eq!(state.roles().names_for_user(ann).await?, ["client"]);

    let resp = role_service::save_user_roles(
        &state.users(),
        &state.roles(),
        ann,
        UpdateUserRolesRequest {
            roles: vec!["seller".into(), "admin".into()],
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap(), ["admin", "seller"]);

    // Category name uniqueness
    let electronics = category_service::save_category(
        &state.categories(),
        None,
        CategoryForm {
            name: "Electronics".into(),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(electronics.slug, "electronics");
    let duplicate = category_service::save_category(
        &state.categories(),
        None,
        CategoryForm {
            name: "Electronics".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Validation(_))));

    // Products with an uploaded image
    let mut image_paths = Vec::new();
    for (name, sku, price) in [
        ("Cable A", "SKU123-A", "12.50"),
        ("Cable B", "SKU123-B", "99.00"),
        ("Charger", "CHG-1", "30.00"),
    ] {
        let form = ProductForm {
            name: Some(name.into()),
            description: Some(format!("{name} description")),
            price: Some(price.into()),
            sku: Some(sku.into()),
            stock: Some("5".into()),
            category_id: Some(electronics.id.to_string()),
            images: vec![UploadedFile::new("photo.png", PNG.to_vec())],
            ..Default::default()
        };
        let saved = save_product(&state, form).await?;
        assert_eq!(saved.images.len(), 1);
        image_paths.push(saved.images[0].image_path.clone());
    }

    let rejected = save_product(
        &state,
        ProductForm {
            name: Some("Phone X".into()),
            description: Some("A phone".into()),
            price: Some("100.00".into()),
            old_price: Some("80.00".into()),
            stock: Some("1".into()),
            category_id: Some(electronics.id.to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let listed = product_service::list_products(
        &state.products(),
        ListQuery {
            search: Some("sku123".into()),
            sort_field: Some(ProductSortField::Price),
            sort_direction: Some(SortDirection::Desc),
            per_page: Some(25),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    let prices: Vec<Decimal> = listed.items.iter().map(|p| p.product.price).collect();
    assert_eq!(prices, [Decimal::new(9900, 2), Decimal::new(1250, 2)]);
    assert_eq!(listed.items[0].category_name.as_deref(), Some("Electronics"));

    // Deleting the category takes its products and their files with it.
    category_service::delete_category(
        &state.categories(),
        &state.product_images(),
        &state.storage,
        electronics.id,
    )
    .await?;
    let after = product_service::list_products(&state.products(), ListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(after.items.is_empty());
    for path in image_paths {
        assert!(!files.path().join(path).exists());
    }

    Ok(())
}

async fn setup_state(database_url: &str, storage_root: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, product_images, products, brands, categories, user_roles, roles, users CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "integration-secret".into(),
        storage_root: storage_root.to_string(),
        storage_url: "/storage".into(),
        body_limit_bytes: 16 * 1024 * 1024,
        default_role: "client".into(),
        admin_role: "admin".into(),
    };
    Ok(AppState::new(orm, config))
}

async fn create_role(state: &AppState, name: &str) -> anyhow::Result<()> {
    RoleActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        guard_name: Set(DEFAULT_GUARD.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

async fn register(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = auth_service::register_user(
        &state.users(),
        &state.roles(),
        &state.config.default_role,
        RegisterRequest {
            name: "Test User".into(),
            email: email.into(),
            password: "password123".into(),
        },
    )
    .await?
    .data
    .unwrap();
    Ok(user.id)
}

async fn save_product(
    state: &AppState,
    form: ProductForm,
) -> Result<catalog_admin::models::ProductWithImages, AppError> {
    let resp = product_service::save_product(
        &state.products(),
        &state.product_images(),
        &state.categories(),
        &state.brands(),
        &state.storage,
        None,
        form,
    )
    .await?;
    Ok(resp.data.unwrap())
}
