use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::restaurants::{
        CreateRestaurantRequest, NearbyRestaurantList, RestaurantList, UpdateRestaurantRequest,
    },
    entity::{
        restaurants::{ActiveModel, Column, Entity as Restaurants},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, authorize},
    models::{Capability, GeoPoint, NearbyRestaurant, Restaurant, default_address_of},
    query::{ListQuery, QueryParams},
    response::{ApiResponse, Meta},
    services::user_service::validate_address,
    state::AppState,
};

pub const RESULT_PER_PAGE: u64 = 10;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub fn validate_rating(rating: f64) -> AppResult<f64> {
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err(AppError::bad_request("Rating must be between 0 and 5"));
    }
    Ok(rating)
}

pub async fn list_restaurants(
    state: &AppState,
    params: QueryParams,
) -> AppResult<ApiResponse<RestaurantList>> {
    let query = ListQuery::new()
        .search(&params)
        .filter(&params)?
        .paginate(&params, RESULT_PER_PAGE);

    let total = Restaurants::find()
        .filter(query.condition::<Restaurants>()?)
        .count(&state.orm)
        .await? as i64;

    let items = query
        .apply(Restaurants::find().order_by_desc(Column::AddedOn))?
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Restaurant::from)
        .collect();

    let page = query.page.map(|p| p.number as i64).unwrap_or(1);
    let meta = Meta::new(page, RESULT_PER_PAGE as i64, total);
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(meta),
    ))
}

pub async fn get_restaurant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Restaurant::from)
        .ok_or_else(|| AppError::not_found("Restaurant not found!!"))?;
    Ok(ApiResponse::success("Restaurant", restaurant, None))
}

#[derive(Debug, sqlx::FromRow)]
struct NearbyRow {
    id: Uuid,
    name: String,
    address: String,
    longitude: f64,
    latitude: f64,
    rating: f64,
    added_on: DateTime<Utc>,
    distance: f64,
}

/// Restaurants within the configured radius of the caller's default
/// address, closest first.
pub async fn nearby_restaurants(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NearbyRestaurantList>> {
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let origin = default_address_of(&account)
        .ok_or_else(|| AppError::bad_request("Default address not set for the user"))?
        .location;

    let rows = sqlx::query_as::<_, NearbyRow>(
        r#"
        SELECT * FROM (
            SELECT r.id, r.name, r.address, r.longitude, r.latitude, r.rating, r.added_on,
                $4::float8 * 2 * ASIN(SQRT(
                    POWER(SIN(RADIANS(r.latitude - $2::float8) / 2), 2)
                    + COS(RADIANS($2::float8)) * COS(RADIANS(r.latitude))
                    * POWER(SIN(RADIANS(r.longitude - $1::float8) / 2), 2)
                )) AS distance
            FROM restaurants r
        ) nearby
        WHERE distance <= $3::float8
        ORDER BY distance ASC
        "#,
    )
    .bind(origin.longitude)
    .bind(origin.latitude)
    .bind(state.config.nearby_radius_meters)
    .bind(EARTH_RADIUS_METERS)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<NearbyRestaurant> = rows
        .into_iter()
        .map(|row| NearbyRestaurant {
            restaurant: Restaurant {
                id: row.id,
                name: row.name,
                address: row.address,
                location: GeoPoint {
                    longitude: row.longitude,
                    latitude: row.latitude,
                },
                rating: row.rating,
                added_on: row.added_on,
            },
            distance: row.distance,
        })
        .collect();

    tracing::debug!(count = items.len(), "nearby restaurants resolved");

    Ok(ApiResponse::success(
        "Nearby restaurants",
        NearbyRestaurantList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Capability::ManageCatalog)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("Enter restaurant name."));
    }
    let address = validate_address(&payload.address)?;
    let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) else {
        return Err(AppError::bad_request(
            "Coordinates (latitude and longitude) are required.",
        ));
    };
    let location = GeoPoint::new(longitude, latitude)?;
    let rating = validate_rating(payload.rating.unwrap_or(0.0))?;

    let restaurant = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        address: Set(address),
        longitude: Set(location.longitude),
        latitude: Set(location.latitude),
        rating: Set(rating),
        added_on: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "restaurant_create",
        "restaurants",
        serde_json::json!({ "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Restaurant created",
        Restaurant::from(restaurant),
        Some(Meta::empty()),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    authorize(user, Capability::ManageCatalog)?;
    let existing = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found!!"))?;

    // A move needs both halves of the point, validated together.
    let location = match (payload.latitude, payload.longitude) {
        (None, None) => None,
        (Some(latitude), Some(longitude)) => Some(GeoPoint::new(longitude, latitude)?),
        _ => return Err(AppError::bad_request("Invalid coordinates format")),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Enter restaurant name."));
        }
        active.name = Set(name);
    }
    if let Some(address) = payload.address {
        active.address = Set(validate_address(&address)?);
    }
    if let Some(location) = location {
        active.longitude = Set(location.longitude);
        active.latitude = Set(location.latitude);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(validate_rating(rating)?);
    }

    let restaurant = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "restaurant_update",
        "restaurants",
        serde_json::json!({ "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Restaurant::from(restaurant),
        Some(Meta::empty()),
    ))
}

/// Deletes the restaurant only. Its dishes and past orders keep their ids.
pub async fn delete_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Capability::ManageCatalog)?;
    let result = Restaurants::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Restaurant not found!!"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "restaurant_delete",
        "restaurants",
        serde_json::json!({ "restaurant_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Restaurant removed successfully!!",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
