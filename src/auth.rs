use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::models::{Admin, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Sessions expire a day after login.
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// Identity attached to the request by `verify_token`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub role: String,
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn create_token(
    id: &str,
    email: &str,
    role: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Rejects requests without a token (403) or with an invalid or expired one
/// (401); otherwise attaches the caller's id and role to the request.
///
/// The original clients send the raw token in the `Authorization` header; a
/// "Bearer " prefix is tolerated as well.
pub async fn verify_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::MissingToken)?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    let claims =
        decode_token(token, &state.config.jwt_secret).map_err(|_| AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(req).await)
}

/// Loads the authenticated admin and permits only role "Super Admin".
pub async fn require_super_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = ObjectId::parse_str(&user.id)
        .map_err(|_| AppError::Forbidden("Require Super Admin Role"))?;

    let admin = state
        .db
        .collection::<Admin>("admins")
        .find_one(doc! { "_id": id })
        .await?;

    match admin {
        Some(admin) if admin.role == Role::SuperAdmin => Ok(next.run(req).await),
        _ => Err(AppError::Forbidden("Require Super Admin Role")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let token = create_token("65a1b2c3d4e5f60718293a4b", "admin@rx.com", "Super Admin", "key")
            .unwrap();
        let claims = decode_token(&token, "key").unwrap();
        assert_eq!(claims.sub, "65a1b2c3d4e5f60718293a4b");
        assert_eq!(claims.email, "admin@rx.com");
        assert_eq!(claims.role, "Super Admin");
    }

    #[test]
    fn token_fails_with_wrong_secret() {
        let token = create_token("id", "a@b.c", "Admin", "key").unwrap();
        assert!(decode_token(&token, "other-key").is_err());
    }
}
