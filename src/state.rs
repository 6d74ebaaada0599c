use std::sync::Arc;

use mongodb::Database;

use crate::config::Config;
use crate::db;
use crate::upload::{DiskStore, FileStore};
use crate::Error;

/// Shared per-request context: database handle, configuration and the
/// upload store. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, Error> {
        let db = db::init_db(&config.mongodb_uri, &config.database_name).await?;
        let files = DiskStore::new(&config.upload_dir)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            files: Arc::new(files),
        })
    }
}
