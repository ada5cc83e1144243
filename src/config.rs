use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Détecte l'environnement via APP_ENV
    pub fn detect() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub database_pool_size: u32,
    pub media_root: PathBuf,
    pub media_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub log_retention_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            database_url: "crud_lab.sqlite3".to_string(),
            database_pool_size: 5,
            media_root: PathBuf::from("media"),
            media_url: "/media/".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            session_ttl_hours: 24 * 14,
            max_upload_bytes: 10 * 1024 * 1024,
            log_retention_days: 90,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    /// avec détection automatique de l'environnement
    pub fn from_env() -> Result<Self> {
        let environment = Environment::detect();

        tracing::info!(
            "🌍 Environment detected: {}",
            environment.as_str().to_uppercase()
        );

        // Charger le fichier .env approprié
        Self::load_env_file(&environment);

        let defaults = Self::default();
        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_pool_size: parse_var("DATABASE_POOL_SIZE", defaults.database_pool_size)?,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            media_url: normalize_media_url(
                &env::var("MEDIA_URL").unwrap_or(defaults.media_url),
            ),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            log_retention_days: parse_var("LOG_RETENTION_DAYS", defaults.log_retention_days)?,
            environment,
        };

        if config.database_pool_size == 0 {
            anyhow::bail!("DATABASE_POOL_SIZE must be at least 1");
        }

        tracing::info!("✅ Configuration loaded successfully");
        tracing::debug!("   Database: {}", config.database_url);
        tracing::debug!("   Media: {} -> {}", config.media_url, config.media_root.display());
        tracing::debug!("   Server: {}:{}", config.server_host, config.server_port);

        Ok(config)
    }

    /// En développement, charge `.env` s'il existe
    fn load_env_file(environment: &Environment) {
        if environment.is_production() {
            tracing::info!("📦 Production mode: using injected environment variables");
            return;
        }

        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("   Loaded: {}", path.display()),
            Err(_) => tracing::warn!("   .env file not found, using environment variables"),
        }
    }

    /// Les cookies de session ne sont `Secure` qu'en production
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Garantit un `/` initial et final: "media" -> "/media/"
fn normalize_media_url(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    format!("/{trimmed}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_respects_app_env_variable() {
        unsafe {
            env::set_var("APP_ENV", "production");
        }
        assert_eq!(Environment::detect(), Environment::Production);
        unsafe {
            env::set_var("APP_ENV", "development");
        }
        assert_eq!(Environment::detect(), Environment::Development);
        unsafe {
            env::remove_var("APP_ENV");
        }
        assert_eq!(Environment::detect(), Environment::Development);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.database_pool_size, 5);
        assert_eq!(config.media_url, "/media/");
        assert_eq!(config.session_ttl_hours, 336);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.log_retention_days, 90);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn parse_var_rejects_garbage() {
        unsafe {
            env::set_var("CRUD_LAB_TEST_PORT", "not-a-port");
        }
        assert!(parse_var::<u16>("CRUD_LAB_TEST_PORT", 1).is_err());
        unsafe {
            env::remove_var("CRUD_LAB_TEST_PORT");
        }
        assert_eq!(parse_var::<u16>("CRUD_LAB_TEST_PORT", 1).unwrap(), 1);
    }

    #[test]
    fn media_url_is_normalized() {
        assert_eq!(normalize_media_url("media"), "/media/");
        assert_eq!(normalize_media_url("/uploads"), "/uploads/");
        assert_eq!(normalize_media_url("/"), "/");
    }
}
