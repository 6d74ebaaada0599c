use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::models::{Admin, AdminPublic, Customer};
use crate::error::AppError;
use crate::handlers::parse_object_id;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Applies a profile edit to the stored name/email/phone/password values,
/// verifying the current password before accepting a new one.
fn apply_profile_update(
    req: UpdateProfileRequest,
    name: &mut String,
    email: &mut String,
    phone: &mut String,
    password: &mut String,
) -> Result<(), AppError> {
    if let Some(new_name) = req.name.filter(|s| !s.trim().is_empty()) {
        *name = new_name;
    }
    if let Some(new_email) = req.email.filter(|s| !s.trim().is_empty()) {
        *email = new_email;
    }
    if let Some(new_phone) = req.phone {
        *phone = new_phone;
    }

    if let Some(new_password) = req.new_password.filter(|s| !s.is_empty()) {
        let current = req.current_password.ok_or_else(|| {
            AppError::Validation("Current password is required".to_string())
        })?;
        if !verify_password(&current, password) {
            return Err(AppError::Validation(
                "Incorrect current password".to_string(),
            ));
        }
        *password = hash_password(&new_password)?;
    }

    Ok(())
}

/// GET /api/admins (Super Admin only), password hashes excluded.
pub async fn list_admins(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let admins: Vec<Admin> = state
        .db
        .collection::<Admin>("admins")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let admins: Vec<AdminPublic> = admins.into_iter().map(AdminPublic::from).collect();
    Ok(Json(admins))
}

/// DELETE /api/admins/:id (Super Admin only). The Super Admin account
/// itself can never be deleted.
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Admin not found")?;
    let admins = state.db.collection::<Admin>("admins");

    let admin = admins
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Admin not found"))?;

    if !admin.role.can_be_deleted() {
        return Err(AppError::Validation("Cannot delete Super Admin".to_string()));
    }

    admins.delete_one(doc! { "_id": oid }).await?;
    log::info!("Deleted admin {}", admin.email);
    Ok(Json(json!({ "message": "Admin deleted successfully" })))
}

pub async fn get_admin_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&user.id, "Admin profile not found")?;
    let admin = state
        .db
        .collection::<Admin>("admins")
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Admin profile not found"))?;

    Ok(Json(AdminPublic::from(admin)))
}

pub async fn update_admin_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&user.id, "Admin not found")?;
    let admins = state.db.collection::<Admin>("admins");

    let mut admin = admins
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Admin not found"))?;

    apply_profile_update(
        req,
        &mut admin.name,
        &mut admin.email,
        &mut admin.phone,
        &mut admin.password,
    )?;

    let update: Document = doc! { "$set": {
        "name": &admin.name,
        "email": &admin.email,
        "phone": &admin.phone,
        "password": &admin.password,
    }};
    admins.update_one(doc! { "_id": oid }, update).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "admin": AdminPublic::from(admin),
    })))
}

pub async fn update_customer_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&user.id, "Customer not found")?;
    let customers = state.db.collection::<Customer>("customers");

    let mut customer = customers
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Customer not found"))?;

    apply_profile_update(
        req,
        &mut customer.name,
        &mut customer.email,
        &mut customer.phone,
        &mut customer.password,
    )?;

    let update: Document = doc! { "$set": {
        "name": &customer.name,
        "email": &customer.email,
        "phone": &customer.phone,
        "password": &customer.password,
    }};
    customers.update_one(doc! { "_id": oid }, update).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "customer": {
            "name": customer.name,
            "email": customer.email,
            "phone": customer.phone,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: None,
            email: None,
            phone: None,
            current_password: None,
            new_password: None,
        }
    }

    fn stored() -> (String, String, String, String) {
        (
            "Jane".to_string(),
            "jane@rx.com".to_string(),
            "555-0100".to_string(),
            hash_password("old-pass").unwrap(),
        )
    }

    #[test]
    fn updates_basic_fields_only_when_present() {
        let (mut name, mut email, mut phone, mut password) = stored();
        let before_hash = password.clone();
        let req = UpdateProfileRequest {
            name: Some("Janet".to_string()),
            phone: Some("555-0199".to_string()),
            ..base_request()
        };

        apply_profile_update(req, &mut name, &mut email, &mut phone, &mut password).unwrap();
        assert_eq!(name, "Janet");
        assert_eq!(email, "jane@rx.com");
        assert_eq!(phone, "555-0199");
        assert_eq!(password, before_hash);
    }

    #[test]
    fn password_change_requires_current_password() {
        let (mut name, mut email, mut phone, mut password) = stored();
        let req = UpdateProfileRequest {
            new_password: Some("new-pass".to_string()),
            ..base_request()
        };
        let err =
            apply_profile_update(req, &mut name, &mut email, &mut phone, &mut password)
                .unwrap_err();
        assert!(err.to_string().contains("Current password is required"));
    }

    #[test]
    fn password_change_rejects_wrong_current_password() {
        let (mut name, mut email, mut phone, mut password) = stored();
        let req = UpdateProfileRequest {
            current_password: Some("guess".to_string()),
            new_password: Some("new-pass".to_string()),
            ..base_request()
        };
        let err =
            apply_profile_update(req, &mut name, &mut email, &mut phone, &mut password)
                .unwrap_err();
        assert!(err.to_string().contains("Incorrect current password"));
    }

    #[test]
    fn password_change_rehashes_with_correct_current_password() {
        let (mut name, mut email, mut phone, mut password) = stored();
        let req = UpdateProfileRequest {
            current_password: Some("old-pass".to_string()),
            new_password: Some("new-pass".to_string()),
            ..base_request()
        };
        apply_profile_update(req, &mut name, &mut email, &mut phone, &mut password).unwrap();
        assert!(verify_password("new-pass", &password));
        assert!(!verify_password("old-pass", &password));
    }
}
