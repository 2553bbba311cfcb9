use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{internal, AppError, MessageBody},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

lazy_static! {
    // Unknown emails still pay for one argon2 verification.
    static ref DUMMY_HASH: String = hash_password("accountd-dummy-password").unwrap_or_default();
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(payload) = payload?;
    let Some((email, password)) = payload.credentials() else {
        warn!("login without credentials");
        return Err(AppError::Validation(
            "Please provide an email address and password".into(),
        ));
    };
    let user = state
        .users
        .find_by_email(email)
        .await
        .map_err(internal("An error occurred during login"))?;

    let Some(user) = user else {
        let _ = verify_password(password, &DUMMY_HASH);
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password(password, &user.password_hash)
        .map_err(internal("An error occurred during login"))?;
    if !ok {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys
        .sign(&user.email)
        .map_err(internal("An error occurred during login"))?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token }))
}

/// Tokens are stateless, so logging out only proves the caller held a valid one.
#[instrument(skip_all)]
pub async fn logout(AuthUser(email): AuthUser) -> Json<MessageBody> {
    info!(email = %email, "user logged out");
    Json(MessageBody {
        message: "Logged out successfully".into(),
    })
}
