use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AccountError,
    state::AppState,
    users::{
        dto::{
            AuthenticatedAccount, LoginRequest, MessageResponse, NewAccount, PublicAccount,
            RegisteredAccount, UpdateAccountRequest, UserEnvelope,
        },
        extractors::{AccountJson, AccountPath},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/login", post(login))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicAccount>>, AccountError> {
    Ok(Json(state.accounts.get_all().await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AccountPath(id): AccountPath<i64>,
) -> Result<Json<PublicAccount>, AccountError> {
    Ok(Json(state.accounts.get_by_id(id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AccountJson(payload): AccountJson<NewAccount>,
) -> Result<(StatusCode, Json<UserEnvelope<RegisteredAccount>>), AccountError> {
    let user = state.accounts.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User created successfully",
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AccountJson(payload): AccountJson<LoginRequest>,
) -> Result<Json<UserEnvelope<AuthenticatedAccount>>, AccountError> {
    let user = state
        .accounts
        .authenticate(&payload.identifier, &payload.password)
        .await?;
    Ok(Json(UserEnvelope {
        message: "Login successful",
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AccountPath(id): AccountPath<i64>,
    AccountJson(payload): AccountJson<UpdateAccountRequest>,
) -> Result<Json<MessageResponse>, AccountError> {
    state
        .accounts
        .update(id, &payload.username, &payload.email)
        .await?;
    Ok(Json(MessageResponse {
        message: "User updated successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AccountPath(id): AccountPath<i64>,
) -> Result<Json<MessageResponse>, AccountError> {
    state.accounts.remove(id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
