use std::env;
use std::time::Duration;

use crate::utils::AppError;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8081,http://localhost:19006,\
http://127.0.0.1:3000,http://127.0.0.1:8081,http://127.0.0.1:19006";

/// Service configuration, read from the environment (after `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub users_collection: String,
    pub centers_collection: String,
    pub memberships_collection: String,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// `None` disables the per-center timeout.
    pub membership_fetch_timeout: Option<Duration>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("DATABASE_URL must be set".to_string()))?;

        let port = parse_number::<u16>("PORT", &get("PORT", "3002"))?;
        let default_page_size = parse_number::<usize>("DEFAULT_PAGE_SIZE", &get("DEFAULT_PAGE_SIZE", "10"))?;
        let max_page_size = parse_number::<usize>("MAX_PAGE_SIZE", &get("MAX_PAGE_SIZE", "100"))?;
        let timeout_secs = parse_number::<u64>(
            "MEMBERSHIP_FETCH_TIMEOUT_SECS",
            &get("MEMBERSHIP_FETCH_TIMEOUT_SECS", "10"),
        )?;

        if default_page_size == 0 || max_page_size < default_page_size {
            return Err(AppError::ConfigError(format!(
                "page sizes must satisfy 0 < DEFAULT_PAGE_SIZE ({}) <= MAX_PAGE_SIZE ({})",
                default_page_size, max_page_size
            )));
        }

        let cors_origins = get("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port,
            database_url,
            users_collection: get("USERS_COLLECTION", "users"),
            centers_collection: get("CENTERS_COLLECTION", "centers"),
            memberships_collection: get("MEMBERSHIPS_COLLECTION", "center_memberships"),
            default_page_size,
            max_page_size,
            membership_fetch_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            cors_origins,
        })
    }

    /// Requested page size, defaulted and capped.
    pub fn effective_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|size| *size > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw)))
}
