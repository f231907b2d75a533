use std::sync::Arc;

use stepdish_core::image::ImageNormalizer;
use stepdish_db::{PgStore, RecordStore, StoreResult};
use stepdish_storage::{BlobStore, SupabaseStorage};

use crate::config::{AppConfig, DEFAULT_IMAGE_BUCKET};

/// Shared collaborators of every service.
///
/// Cheap to clone; services each hold their own copy.
#[derive(Clone)]
pub struct AppContext {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub normalizer: ImageNormalizer,
    /// Bucket receiving step images.
    pub bucket: String,
}

impl AppContext {
    /// A context with default image bounds and bucket.
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            records,
            blobs,
            normalizer: ImageNormalizer::default(),
            bucket: DEFAULT_IMAGE_BUCKET.to_string(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ImageNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Connect to the hosted backend described by `config`.
    pub async fn connect(config: &AppConfig) -> StoreResult<Self> {
        let pool = stepdish_db::create_pool(&config.database_url, config.db_max_connections).await?;
        tracing::info!("Database connection pool created");

        stepdish_db::health_check(&pool).await?;
        tracing::info!("Database health check passed");

        if config.run_migrations {
            stepdish_db::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");
        }

        let storage = SupabaseStorage::new(&config.supabase_url, &config.supabase_key);

        Ok(Self::new(Arc::new(PgStore::new(pool)), Arc::new(storage))
            .with_normalizer(ImageNormalizer::new(config.image))
            .with_bucket(&config.image_bucket))
    }
}
