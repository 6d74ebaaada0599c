use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use thiserror::Error;

pub mod models;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Connects to MongoDB, verifies the connection and ensures the unique
/// indexes the registration flow relies on.
pub async fn init_db(uri: &str, db_name: &str) -> Result<Database, DatabaseError> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(db_name);

    db.run_command(doc! { "ping": 1 }).await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Unique email indexes on the account collections. The first-admin
/// promotion check is read-then-write; these indexes backstop the race by
/// rejecting a concurrent duplicate insert at the database.
async fn ensure_indexes(db: &Database) -> Result<(), DatabaseError> {
    for name in ["admins", "customers"] {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        db.collection::<Document>(name).create_index(index).await?;
    }
    Ok(())
}

/// True when a write failed because a unique index rejected a duplicate.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000
    )
}
