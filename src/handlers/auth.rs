use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{create_token, hash_password, verify_password};
use crate::db::is_duplicate_key;
use crate::db::models::{Admin, AdminPublic, Customer, Role};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn check_credentials_present(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn admin_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_credentials_present(&req.email, &req.password)?;
    let admins = state.db.collection::<Admin>("admins");

    // First admin bootstrap: the unique email index backstops this
    // read-then-write check against concurrent registration.
    let count = admins.count_documents(doc! {}).await?;
    let role = Role::for_existing_count(count);

    if admins
        .find_one(doc! { "email": &req.email })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Account already exists"));
    }

    let mut admin = Admin {
        id: None,
        name: req.name.unwrap_or_else(|| "Admin".to_string()),
        email: req.email,
        password: hash_password(&req.password)?,
        phone: req.phone.unwrap_or_default(),
        role,
    };

    let result = admins.insert_one(&admin).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::Conflict("Account already exists")
        } else {
            AppError::Database(e)
        }
    })?;
    admin.id = result.inserted_id.as_object_id();

    log::info!("Registered admin {} with role {}", admin.email, role.as_str());
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Admin Registered Successfully",
            "admin": AdminPublic::from(admin),
        })),
    ))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state
        .db
        .collection::<Admin>("admins")
        .find_one(doc! { "email": &req.email })
        .await?;

    match admin {
        Some(admin) if verify_password(&req.password, &admin.password) => {
            let id = admin.id.map(|oid| oid.to_hex()).unwrap_or_default();
            let token = create_token(
                &id,
                &admin.email,
                admin.role.as_str(),
                &state.config.jwt_secret,
            )?;
            Ok(Json(json!({
                "message": "Login Successful",
                "token": token,
                "user": {
                    "id": id,
                    "name": admin.name,
                    "email": admin.email,
                    "role": admin.role,
                },
            })))
        }
        _ => Err(AppError::InvalidCredentials),
    }
}

pub async fn customer_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_credentials_present(&req.email, &req.password)?;
    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

    let customers = state.db.collection::<Customer>("customers");
    if customers
        .find_one(doc! { "email": &req.email })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Account already exists"));
    }

    let customer = Customer {
        id: None,
        name,
        email: req.email,
        phone: req.phone.unwrap_or_default(),
        password: hash_password(&req.password)?,
    };

    customers.insert_one(&customer).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::Conflict("Account already exists")
        } else {
            AppError::Database(e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Customer Registered Successfully" })),
    ))
}

pub async fn customer_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .db
        .collection::<Customer>("customers")
        .find_one(doc! { "email": &req.email })
        .await?;

    match customer {
        Some(customer) if verify_password(&req.password, &customer.password) => {
            let id = customer.id.map(|oid| oid.to_hex()).unwrap_or_default();
            let token = create_token(&id, &customer.email, "customer", &state.config.jwt_secret)?;
            Ok(Json(json!({
                "message": "Login Successful",
                "token": token,
                "customer": {
                    "name": customer.name,
                    "email": customer.email,
                },
            })))
        }
        _ => Err(AppError::InvalidCredentials),
    }
}
