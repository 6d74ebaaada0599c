use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::options::ReturnDocument;
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{datetime_string, Medicine};
use crate::error::AppError;
use crate::handlers::{parse_object_id, read_form};
use crate::services;
use crate::state::AppState;
use crate::utils::escape_regex;
use crate::validation::{parse_medicine, parse_medicine_update};

#[derive(Deserialize, Debug)]
pub struct MedicineQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Case-insensitive substring search on name, exact category filter.
/// "All" (or an empty value) disables the category filter.
fn medicine_filter(search: Option<String>, category: Option<String>) -> Document {
    let mut filter = Document::new();
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        filter.insert(
            "name",
            doc! { "$regex": escape_regex(&search), "$options": "i" },
        );
    }
    if let Some(category) = category.filter(|c| !c.is_empty() && c != "All") {
        filter.insert("category", category);
    }
    filter
}

/// GET /api/medicines?search=&category=: filtered list, newest first.
pub async fn list_medicines(
    State(state): State<AppState>,
    Query(query): Query<MedicineQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = medicine_filter(query.search, query.category);
    let medicines: Vec<Medicine> = state
        .db
        .collection::<Medicine>("medicines")
        .find(filter)
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(Json(medicines))
}

pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Medicine not found")?;
    let medicine = state
        .db
        .collection::<Medicine>("medicines")
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Medicine not found"))?;

    Ok(Json(medicine))
}

/// POST /api/medicines: multipart form with an optional `image` file.
pub async fn create_medicine(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart, "image").await?;
    let input = parse_medicine(&form.fields)?;

    let image = match form.file {
        Some(file) => state.files.store(&file.filename, &file.bytes)?,
        None => String::new(),
    };

    let now = Utc::now();
    let mut medicine = Medicine {
        id: None,
        name: input.name,
        category: input.category,
        price: input.price,
        quantity: input.quantity,
        expiry: input.expiry,
        manufacturer: input.manufacturer,
        description: input.description,
        image,
        prescription_required: input.prescription_required,
        created_at: now,
        updated_at: now,
    };

    let result = state
        .db
        .collection::<Medicine>("medicines")
        .insert_one(&medicine)
        .await?;
    medicine.id = result.inserted_id.as_object_id();

    log::info!("Added medicine {}", medicine.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Medicine added successfully",
            "medicine": medicine,
        })),
    ))
}

/// PUT /api/medicines/:id: partial update, only supplied fields change.
pub async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Medicine not found")?;
    let form = read_form(multipart, "image").await?;
    let update = parse_medicine_update(&form.fields)?;

    if update.is_empty() && form.file.is_none() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let mut set = Document::new();
    if let Some(name) = update.name {
        set.insert("name", name);
    }
    if let Some(category) = update.category {
        set.insert("category", category);
    }
    if let Some(manufacturer) = update.manufacturer {
        set.insert("manufacturer", manufacturer);
    }
    if let Some(price) = update.price {
        set.insert("price", price);
    }
    if let Some(quantity) = update.quantity {
        set.insert("quantity", quantity);
    }
    if let Some(expiry) = update.expiry {
        set.insert("expiry", to_bson(&expiry)?);
    }
    if let Some(description) = update.description {
        set.insert("description", description);
    }
    if let Some(prescription_required) = update.prescription_required {
        set.insert("prescriptionRequired", prescription_required);
    }
    if let Some(file) = form.file {
        set.insert("image", state.files.store(&file.filename, &file.bytes)?);
    }
    set.insert("updatedAt", datetime_string::format(Utc::now()));

    let medicine = state
        .db
        .collection::<Medicine>("medicines")
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::NotFound("Medicine not found"))?;

    Ok(Json(json!({
        "message": "Medicine updated successfully",
        "medicine": medicine,
    })))
}

pub async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Medicine not found")?;
    let result = state
        .db
        .collection::<Medicine>("medicines")
        .delete_one(doc! { "_id": oid })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Medicine not found"));
    }
    Ok(Json(json!({ "message": "Medicine deleted successfully" })))
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let medicines: Vec<Medicine> = state
        .db
        .collection::<Medicine>("medicines")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    Ok(Json(services::dashboard_stats(&medicines, Utc::now())))
}

/// GET /api/dashboard/activity
pub async fn dashboard_activity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let medicines: Vec<Medicine> = state
        .db
        .collection::<Medicine>("medicines")
        .find(doc! {})
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(Json(services::activity_feed(&medicines, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_category_and_blank_search_match_everything() {
        assert!(medicine_filter(None, None).is_empty());
        assert!(medicine_filter(Some(String::new()), Some("All".to_string())).is_empty());
    }

    #[test]
    fn category_filter_is_exact() {
        let filter = medicine_filter(None, Some("Pain Relief".to_string()));
        assert_eq!(filter.get_str("category").unwrap(), "Pain Relief");
        assert!(!filter.contains_key("name"));
    }

    #[test]
    fn search_builds_escaped_case_insensitive_regex() {
        let filter = medicine_filter(Some("asp(irin".to_string()), None);
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "asp\\(irin");
        assert_eq!(name.get_str("$options").unwrap(), "i");
        assert!(!filter.contains_key("category"));
    }
}
