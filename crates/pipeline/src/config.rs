use stepdish_core::image::{NormalizeOptions, DEFAULT_QUALITY, MAX_DIMENSION, MAX_ENCODED_BYTES};

/// Default bucket for step images.
pub const DEFAULT_IMAGE_BUCKET: &str = "recipe-images";

/// Errors while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string of the hosted backend.
    pub database_url: String,
    /// Maximum pooled database connections (default: `10`).
    pub db_max_connections: u32,
    /// Apply embedded migrations on connect (default: `false`).
    pub run_migrations: bool,
    /// Base URL of the storage API.
    pub supabase_url: String,
    /// Key sent with storage requests.
    pub supabase_key: String,
    /// Bucket receiving step images (default: `recipe-images`).
    pub image_bucket: String,
    /// Bounds applied to every uploaded photo.
    pub image: NormalizeOptions,
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default         |
    /// |-----------------------|-----------------|
    /// | `DATABASE_URL`        | (required)      |
    /// | `DB_MAX_CONNECTIONS`  | `10`            |
    /// | `RUN_MIGRATIONS`      | `false`         |
    /// | `SUPABASE_URL`        | (required)      |
    /// | `SUPABASE_ANON_KEY`   | (required)      |
    /// | `IMAGE_BUCKET`        | `recipe-images` |
    /// | `IMAGE_MAX_DIMENSION` | `1200`          |
    /// | `IMAGE_MAX_BYTES`     | `1048576`       |
    /// | `IMAGE_QUALITY`       | `80`            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let supabase_url = required("SUPABASE_URL")?;
        let supabase_key = required("SUPABASE_ANON_KEY")?;

        let image_bucket = lookup("IMAGE_BUCKET")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_BUCKET.into());

        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32, "u32")?;
        let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", false, "bool")?;
        let max_dimension = parse_or(&lookup, "IMAGE_MAX_DIMENSION", MAX_DIMENSION, "u32")?;
        let max_bytes = parse_or(&lookup, "IMAGE_MAX_BYTES", MAX_ENCODED_BYTES, "usize")?;
        let quality = parse_or(&lookup, "IMAGE_QUALITY", DEFAULT_QUALITY, "u8")?;

        if !(1..=100).contains(&quality) {
            return Err(ConfigError::Invalid {
                name: "IMAGE_QUALITY",
                expected: "quality between 1 and 100",
                value: quality.to_string(),
            });
        }

        Ok(Self {
            database_url,
            db_max_connections,
            run_migrations,
            supabase_url,
            supabase_key,
            image_bucket,
            image: NormalizeOptions {
                max_dimension,
                max_bytes,
                quality,
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}
