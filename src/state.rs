use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    repository::{
        brands::DbBrandRepository, categories::DbCategoryRepository,
        orders::DbOrderRepository, product_images::DbProductImageRepository,
        products::DbProductRepository, roles::DbRoleRepository, users::DbUserRepository,
    },
    storage::LocalStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub storage: LocalStorage,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let storage = LocalStorage::new(&config.storage_root, &config.storage_url);
        Self {
            orm,
            storage,
            config: Arc::new(config),
        }
    }

    pub fn categories(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.orm.clone(),
        }
    }

    pub fn brands(&self) -> DbBrandRepository {
        DbBrandRepository {
            db: self.orm.clone(),
        }
    }

    pub fn products(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.orm.clone(),
        }
    }

    pub fn product_images(&self) -> DbProductImageRepository {
        DbProductImageRepository {
            db: self.orm.clone(),
        }
    }

    pub fn orders(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.orm.clone(),
        }
    }

    pub fn users(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.orm.clone(),
        }
    }

    pub fn roles(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.orm.clone(),
        }
    }
}
