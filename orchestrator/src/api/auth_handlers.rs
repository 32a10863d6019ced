use axum::{extract::State, response::Json};
use chrono::Utc;
use sea_orm::EntityTrait;

use crate::entity::service_user;

use super::dto::{LoginRequest, LoginResponse, UserResponse};
use super::jwt::{AuthClaims, Claims, encode_jwt};
use super::{ApiErr, AppState};

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiErr> {
    let user = state
        .auth
        .authenticate(&body.username, &body.password)
        .await
        .map_err(|_| ApiErr::bad_request("Invalid credentials"))?;

    let exp = (Utc::now().timestamp() as u64) + state.jwt_expiry_hours * 3600;
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        exp,
    };

    let token = encode_jwt(&claims, &state.jwt_secret).map_err(ApiErr::internal)?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

pub async fn me(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiErr> {
    let user = service_user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await
        .map_err(ApiErr::internal)?
        .ok_or_else(|| ApiErr::bad_request("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}
