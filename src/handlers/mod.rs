use std::collections::HashMap;

use axum::extract::multipart::Multipart;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod order;

/// A multipart form reduced to its text fields plus at most one file.
pub(crate) struct FormData {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

pub(crate) struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Drains a multipart request, treating the part named `file_field` as the
/// upload and everything else as text.
pub(crate) async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<FormData, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            if let Some(filename) = field.file_name().map(str::to_string) {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?;
                file = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
                continue;
            }
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?;
        fields.insert(name, value);
    }

    Ok(FormData { fields, file })
}

/// Parses a path id, mapping garbage to the same 404 an unknown id gets.
pub(crate) fn parse_object_id(id: &str, not_found: &'static str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::NotFound(not_found))
}
