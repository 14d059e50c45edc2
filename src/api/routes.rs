//! API route handlers

use axum::{
    extract::{FromRequest, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::server::SharedState;
use crate::auth::models::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use crate::auth::{hash_password, Identity, User, UserRole};
use crate::error::{Error, Result};
use crate::store::{BookUpdate, NewBook, NewOrder, OrderStatusUpdate};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// JSON body extractor whose rejections use the `{"error": ...}` shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Run a bcrypt operation off the async executor
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("Background task failed: {}", e)))?
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Account routes

pub async fn register(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let username = req.username.trim().to_string();

    if state.store.find_user_by_username(&username).await.is_some() {
        return Err(Error::UserAlreadyExists(username));
    }

    let password = req.password;
    let hash = blocking(move || hash_password(&password)).await?;
    let user = state
        .store
        .insert_user(User::new(username, hash, UserRole::User))
        .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserInfo::from(user))),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .store
        .find_user_by_username(req.username.trim())
        .await
        .ok_or(Error::InvalidCredentials)?;

    let password = req.password;
    let candidate = user.clone();
    let valid = blocking(move || candidate.verify_password(&password)).await?;
    if !valid {
        tracing::debug!("Failed login for {}", user.username);
        return Err(Error::InvalidCredentials);
    }

    let token = state.tokens.issue(&user.id, user.role)?;
    Ok(Json(ApiResponse::ok(LoginResponse {
        token,
        user: user.into(),
    })))
}

// Catalogue routes

pub async fn list_books(State(state): State<SharedState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.list_available_books().await))
}

pub async fn create_book(
    State(state): State<SharedState>,
    identity: Identity,
    ApiJson(req): ApiJson<NewBook>,
) -> Result<impl IntoResponse> {
    let book = state.store.create_book(req).await?;
    tracing::info!("Admin {} created book {}", identity.user_id, book.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(book))))
}

pub async fn update_book(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BookUpdate>,
) -> Result<impl IntoResponse> {
    let book = state.store.update_book(&id, req).await?;
    Ok(Json(ApiResponse::ok(book)))
}

pub async fn delete_book(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.store.delete_book(&id).await?;
    tracing::info!("Admin {} deleted book {}", identity.user_id, id);
    Ok(Json(ApiResponse::ok("deleted")))
}

// Order routes

pub async fn create_order(
    State(state): State<SharedState>,
    identity: Identity,
    ApiJson(req): ApiJson<NewOrder>,
) -> Result<impl IntoResponse> {
    let order = state.store.create_order(&identity.user_id, req).await?;
    tracing::info!("User {} placed order {}", identity.user_id, order.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}

pub async fn list_my_orders(
    State(state): State<SharedState>,
    identity: Identity,
) -> impl IntoResponse {
    Json(ApiResponse::ok(
        state.store.list_orders(Some(&identity.user_id)).await,
    ))
}

pub async fn list_orders(State(state): State<SharedState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.store.list_orders(None).await))
}

pub async fn update_order_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<OrderStatusUpdate>,
) -> Result<impl IntoResponse> {
    let order = state.store.update_order_status(&id, req.status).await?;
    tracing::info!("Order {} is now {}", order.id, order.status);
    Ok(Json(ApiResponse::ok(order)))
}
