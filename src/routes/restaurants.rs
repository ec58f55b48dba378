use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::{
        dishes::{CreateDishRequest, DishList},
        restaurants::{
            CreateRestaurantRequest, NearbyRestaurantList, RestaurantList, UpdateRestaurantRequest,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{DishWithRestaurant, Restaurant},
    query::QueryParams,
    response::ApiResponse,
    routes::params::{AppJson, AppQuery, IdPath},
    services::{dish_service, restaurant_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restaurants).post(create_restaurant))
        .route("/nearby", get(nearby_restaurants))
        .route(
            "/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/{id}/dishes", get(list_restaurant_dishes).post(create_dish))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants",
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive match on name"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("rating[gte]" = Option<f64>, Query, description = "Any field filter: field=value or field[gt|gte|lt|lte]=value")
    ),
    responses(
        (status = 200, description = "Restaurants", body = ApiResponse<RestaurantList>),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Restaurants"
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<QueryParams>,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::list_restaurants(&state, params).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/nearby",
    responses(
        (status = 200, description = "Restaurants near the default address, closest first", body = ApiResponse<NearbyRestaurantList>),
        (status = 400, description = "Default address not set")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn nearby_restaurants(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NearbyRestaurantList>>> {
    let resp = restaurant_service::nearby_restaurants(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant", body = ApiResponse<Restaurant>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "Restaurants"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::get_restaurant(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = ApiResponse<Restaurant>),
        (status = 400, description = "Invalid restaurant data"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Restaurant>>)> {
    let resp = restaurant_service::create_restaurant(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_restaurant(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = restaurant_service::delete_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}/dishes",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Dishes of one restaurant", body = ApiResponse<DishList>)
    ),
    tag = "Dishes"
)]
pub async fn list_restaurant_dishes(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<DishList>>> {
    let resp = dish_service::list_restaurant_dishes(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{id}/dishes",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish created", body = ApiResponse<DishWithRestaurant>),
        (status = 400, description = "Dish name and price is required"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Restaurant not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn create_dish(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<CreateDishRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DishWithRestaurant>>)> {
    let resp = dish_service::create_dish(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
