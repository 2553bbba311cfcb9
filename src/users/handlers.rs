use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, MessageBody},
    state::AppState,
    users::{
        dto::{PublicUser, RegisterRequest, RegisterResponse},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/user/:email", get(get_user))
        .route("/user", delete(delete_me))
        .route("/register", post(register))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = services::list_users(state.users.as_ref()).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::find_by_email(state.users.as_ref(), &email).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Json(payload) = payload?;
    let id = services::register(state.users.as_ref(), payload).await?;
    Ok(Json(RegisterResponse {
        message: "User created successfully".into(),
        id,
    }))
}

/// Deletes the account named by the caller's token.
#[instrument(skip(state, email))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<MessageBody>, AppError> {
    services::delete_by_email(state.users.as_ref(), &email).await?;
    info!(email = %email, "user deleted");
    Ok(Json(MessageBody {
        message: "User has been deleted".into(),
    }))
}
