use std::env;

const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Directory backing the public file area.
    pub storage_root: String,
    /// URL prefix the public file area is served under.
    pub storage_url: String,
    pub body_limit_bytes: usize,
    /// Role handed to newly registered users.
    pub default_role: String,
    /// Role required for every `/api/admin` route.
    pub admin_role: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let storage_root =
            env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage/public".to_string());
        let storage_url = env::var("STORAGE_URL").unwrap_or_else(|_| "/storage".to_string());
        let body_limit_bytes = env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT);
        let default_role = env::var("DEFAULT_ROLE").unwrap_or_else(|_| "client".to_string());
        let admin_role = env::var("ADMIN_ROLE").unwrap_or_else(|_| "admin".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            storage_root,
            storage_url,
            body_limit_bytes,
            default_role,
            admin_role,
        })
    }
}
