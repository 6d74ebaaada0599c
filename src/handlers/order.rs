use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{datetime_string, Order, OrderStatus};
use crate::error::AppError;
use crate::handlers::{parse_object_id, read_form};
use crate::state::AppState;
use crate::utils::escape_regex;
use crate::validation::parse_order;

#[derive(Deserialize, Debug)]
pub struct MyOrdersQuery {
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

/// POST /api/orders: multipart form with an optional `prescription` file.
/// Every order starts out Pending.
pub async fn create_order(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart, "prescription").await?;
    let input = parse_order(&form.fields)?;

    let prescription_image = match form.file {
        Some(file) => Some(state.files.store(&file.filename, &file.bytes)?),
        None => None,
    };

    let now = Utc::now();
    let mut order = Order {
        id: None,
        customer: input.customer,
        items: input.items,
        total: input.total,
        status: OrderStatus::Pending,
        notes: String::new(),
        date: now,
        address: input.address,
        payment_method: input.payment_method,
        prescription_image,
        created_at: now,
        updated_at: now,
    };

    let result = state
        .db
        .collection::<Order>("orders")
        .insert_one(&order)
        .await?;
    order.id = result.inserted_id.as_object_id();

    log::info!("Order placed by {}", order.customer);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order": order,
        })),
    ))
}

/// GET /api/orders: all orders, newest first.
pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders: Vec<Order> = state
        .db
        .collection::<Order>("orders")
        .find(doc! {})
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(Json(orders))
}

/// GET /api/my-orders?email=: case-insensitive exact email match, newest
/// order date first.
pub async fn my_orders(
    State(state): State<AppState>,
    Query(query): Query<MyOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let filter = doc! { "customer": {
        "$regex": format!("^{}$", escape_regex(email)),
        "$options": "i",
    }};
    let orders: Vec<Order> = state
        .db
        .collection::<Order>("orders")
        .find(filter)
        .sort(doc! { "date": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(Json(orders))
}

/// PUT /api/orders/:id: overwrite status and/or notes.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Order not found")?;

    let mut set = Document::new();
    if let Some(status) = req.status {
        set.insert("status", status.as_str());
    }
    if let Some(notes) = req.notes {
        set.insert("notes", notes);
    }
    set.insert("updatedAt", datetime_string::format(Utc::now()));

    let order = state
        .db
        .collection::<Order>("orders")
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::NotFound("Order not found"))?;

    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

/// PUT /api/orders/:id/cancel: guarded by the terminal-state invariant.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = parse_object_id(&id, "Order not found")?;
    let orders = state.db.collection::<Order>("orders");

    let order = orders
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Order not found"))?;

    if !order.status.can_cancel() {
        return Err(AppError::Validation(
            "Cannot cancel order at this stage".to_string(),
        ));
    }

    let order = orders
        .find_one_and_update(
            doc! { "_id": oid },
            doc! { "$set": {
                "status": OrderStatus::Cancelled.as_str(),
                "updatedAt": datetime_string::format(Utc::now()),
            }},
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::NotFound("Order not found"))?;

    log::info!("Order {} cancelled", id);
    Ok(Json(json!({
        "message": "Order cancelled successfully",
        "order": order,
    })))
}
