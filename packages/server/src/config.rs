use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Administrator account created on startup when it does not exist yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub fullname: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Registration only accepts addresses ending with this suffix.
    pub email_domain: String,
    /// Password a student account is reset to by an administrator.
    pub default_password: String,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("auth.email_domain", "@plpasig.edu.ph")?
            .set_default("auth.default_password", "plpasig123")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SMARTGRADE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SMARTGRADE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
