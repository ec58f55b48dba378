use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::dishes::{DishList, UpdateDishRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Dish, DishWithRestaurant},
    query::QueryParams,
    response::ApiResponse,
    routes::params::{AppJson, AppQuery, IdPath},
    services::dish_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dishes))
        .route("/{id}", get(get_dish).put(update_dish).delete(delete_dish))
}

#[utoipa::path(
    get,
    path = "/api/v1/dishes",
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive match on name"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("price[lte]" = Option<i64>, Query, description = "Any field filter: field=value or field[gt|gte|lt|lte]=value")
    ),
    responses(
        (status = 200, description = "Dishes with their restaurant", body = ApiResponse<DishList>),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Dishes"
)]
pub async fn list_dishes(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<QueryParams>,
) -> AppResult<Json<ApiResponse<DishList>>> {
    let resp = dish_service::list_dishes(&state, params).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/dishes/{id}",
    params(("id" = Uuid, Path, description = "Dish id")),
    responses(
        (status = 200, description = "Dish", body = ApiResponse<DishWithRestaurant>),
        (status = 404, description = "Dish not found")
    ),
    tag = "Dishes"
)]
pub async fn get_dish(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<DishWithRestaurant>>> {
    let resp = dish_service::get_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/dishes/{id}",
    params(("id" = Uuid, Path, description = "Dish id")),
    request_body = UpdateDishRequest,
    responses(
        (status = 200, description = "Dish updated", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dish not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn update_dish(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateDishRequest>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let resp = dish_service::update_dish(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dishes/{id}",
    params(("id" = Uuid, Path, description = "Dish id")),
    responses(
        (status = 200, description = "Dish removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dish not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_dish(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = dish_service::delete_dish(&state, &user, id).await?;
    Ok(Json(resp))
}
