use sea_orm_migration::prelude::*;

mod m20250603_000001_create_users;
mod m20250603_000002_create_roles;
mod m20250603_000003_create_categories;
mod m20250603_000004_create_brands;
mod m20250603_000005_create_products;
mod m20250603_000006_create_product_images;
mod m20250603_000007_create_orders;
mod m20250603_000008_create_order_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250603_000001_create_users::Migration),
            Box::new(m20250603_000002_create_roles::Migration),
            Box::new(m20250603_000003_create_categories::Migration),
            Box::new(m20250603_000004_create_brands::Migration),
            Box::new(m20250603_000005_create_products::Migration),
            Box::new(m20250603_000006_create_product_images::Migration),
            Box::new(m20250603_000007_create_orders::Migration),
            Box::new(m20250603_000008_create_order_items::Migration),
        ]
    }
}

/// `timestamptz NOT NULL DEFAULT now()`.
fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}
