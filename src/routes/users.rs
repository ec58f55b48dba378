use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};

use crate::{
    dto::users::AddAddressRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::{AppJson, IdPath},
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/addresses", post(add_address))
        .route("/addresses/{id}", delete(remove_address))
        .route("/addresses/default/{id}", put(set_default_address))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current user with address book", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/addresses",
    request_body = AddAddressRequest,
    responses(
        (status = 200, description = "Address added", body = ApiResponse<User>),
        (status = 400, description = "Invalid address or coordinates"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn add_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddAddressRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::add_address(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address id")),
    responses(
        (status = 200, description = "Address removed", body = ApiResponse<User>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn remove_address(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::remove_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/addresses/default/{id}",
    params(("id" = Uuid, Path, description = "Address id")),
    responses(
        (status = 200, description = "Default address set", body = ApiResponse<User>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::set_default_address(&state, &user, id).await?;
    Ok(Json(resp))
}
