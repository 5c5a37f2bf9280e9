use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use catalog_admin::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::roles::{self, DEFAULT_GUARD, Entity as Roles},
    repository::{
        BrandDraft, BrandRepository, CategoryDraft, CategoryRepository, NewUser, ProductDraft,
        ProductRepository, RoleRepository, UserRepository,
    },
    slug::slugify,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, EntityTrait, Set, sea_query::OnConflict};
use uuid::Uuid;

const ROLES: [&str; 3] = ["admin", "seller", "client"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config);

    seed_roles(&state).await?;
    let admin_id = ensure_user(&state, "Admin", "admin@example.com", "admin123", "admin").await?;
    let client_id =
        ensure_user(&state, "Client", "client@example.com", "client123", "client").await?;
    seed_catalog(&state).await?;

    println!("Seed completed. Admin ID: {admin_id}, Client ID: {client_id}");
    Ok(())
}

async fn seed_roles(state: &AppState) -> anyhow::Result<()> {
    let rows = ROLES.iter().map(|name| roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        guard_name: Set(DEFAULT_GUARD.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    });
    Roles::insert_many(rows)
        .on_conflict(
            OnConflict::columns([roles::Column::Name, roles::Column::GuardName])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;
    println!("Ensured roles {}", ROLES.join(", "));
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let users = state.users();
    let user_id = match users.find_account_by_email(email).await? {
        Some(account) => account.user.id,
        None => {
            let salt = SaltString::generate(&mut OsRng);
            let password_hash = Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?
                .to_string();
            let user = users
                .create(&NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                })
                .await?;
            user.id
        }
    };

    state.roles().sync(user_id, &[role.to_string()]).await?;
    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(state: &AppState) -> anyhow::Result<()> {
    let categories = state.categories();
    let brands = state.brands();
    let products = state.products();

    let mut category_ids = Vec::new();
    for (name, description) in [
        ("Electronics", "Phones, laptops and accessories"),
        ("Home & Garden", "Everything for the house"),
    ] {
        let slug = slugify(name);
        if categories.slug_taken(&slug, None).await? {
            continue;
        }
        let category = categories
            .create(&CategoryDraft {
                name: name.to_string(),
                slug,
                description: Some(description.to_string()),
                parent_id: None,
                is_active: true,
            })
            .await?;
        category_ids.push(category.id);
    }

    let Some(&electronics) = category_ids.first() else {
        println!("Catalog already seeded");
        return Ok(());
    };

    let brand = brands
        .create(&BrandDraft {
            name: "Ferris Devices".to_string(),
            slug: slugify("Ferris Devices"),
            description: Some("Gadgets for Rustaceans".to_string()),
            logo_path: None,
            is_active: true,
        })
        .await?;

    let sample = [
        ("Phone X", "SKU-PHX-001", Decimal::new(49_900, 2), Some(Decimal::new(59_900, 2)), 25),
        ("Laptop Pro 14", "SKU-LP14-001", Decimal::new(129_900, 2), None, 10),
        ("USB-C Cable", "SKU123", Decimal::new(1_299, 2), None, 200),
    ];
    for (name, sku, price, old_price, stock) in sample {
        products
            .create(&ProductDraft {
                name: name.to_string(),
                slug: slugify(name),
                description: format!("{name} from the sample catalog."),
                short_description: None,
                price,
                old_price,
                sku: Some(sku.to_string()),
                stock,
                category_id: electronics,
                brand_id: Some(brand.id),
                is_active: true,
                is_featured: false,
            })
            .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
