use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::dishes::{CreateDishRequest, DishList, UpdateDishRequest},
    entity::{
        dishes::{ActiveModel, Column, Entity as Dishes},
        restaurants::Entity as Restaurants,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, authorize},
    models::{Capability, Dish, DishImage, DishWithRestaurant, Restaurant},
    query::{ListQuery, QueryParams},
    response::{ApiResponse, Meta},
    services::restaurant_service::{RESULT_PER_PAGE, validate_rating},
    state::AppState,
};

fn validate_price(price: i64) -> AppResult<i64> {
    if price < 0 {
        return Err(AppError::bad_request("Price cannot be negative"));
    }
    Ok(price)
}

fn images_json(images: &[DishImage]) -> AppResult<serde_json::Value> {
    if images.iter().any(|image| image.url.trim().is_empty()) {
        return Err(AppError::bad_request("Every dish image needs a url"));
    }
    serde_json::to_value(images).map_err(|e| AppError::Internal(e.into()))
}

fn with_restaurant(
    (dish, restaurant): (crate::entity::dishes::Model, Option<crate::entity::restaurants::Model>),
) -> DishWithRestaurant {
    DishWithRestaurant {
        dish: Dish::from(dish),
        restaurant: restaurant.map(Restaurant::from),
    }
}

pub async fn list_dishes(
    state: &AppState,
    params: QueryParams,
) -> AppResult<ApiResponse<DishList>> {
    let query = ListQuery::new()
        .search(&params)
        .filter(&params)?
        .paginate(&params, RESULT_PER_PAGE);

    let total = Dishes::find()
        .filter(query.condition::<Dishes>()?)
        .count(&state.orm)
        .await? as i64;

    let items = query
        .apply(Dishes::find().order_by_desc(Column::CreatedAt))?
        .find_also_related(Restaurants)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(with_restaurant)
        .collect();

    let page = query.page.map(|p| p.number as i64).unwrap_or(1);
    Ok(ApiResponse::success(
        "Dishes",
        DishList { items },
        Some(Meta::new(page, RESULT_PER_PAGE as i64, total)),
    ))
}

pub async fn get_dish(state: &AppState, id: Uuid) -> AppResult<ApiResponse<DishWithRestaurant>> {
    let dish = Dishes::find_by_id(id)
        .find_also_related(Restaurants)
        .one(&state.orm)
        .await?
        .map(with_restaurant)
        .ok_or_else(|| AppError::not_found("Dish not found"))?;
    Ok(ApiResponse::success("Dish", dish, None))
}

pub async fn list_restaurant_dishes(
    state: &AppState,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<DishList>> {
    let items: Vec<DishWithRestaurant> = Dishes::find()
        .filter(Column::RestaurantId.eq(restaurant_id))
        .order_by_desc(Column::CreatedAt)
        .find_also_related(Restaurants)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(with_restaurant)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Dishes",
        DishList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_dish(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateDishRequest,
) -> AppResult<ApiResponse<DishWithRestaurant>> {
    authorize(user, Capability::ManageCatalog)?;

    let restaurant = Restaurants::find_by_id(restaurant_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found."))?;

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let price = match payload.price {
        Some(price) if !name.is_empty() => price,
        _ => return Err(AppError::bad_request("Dish name and price is required.")),
    };
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::bad_request("Enter description of dish"))?;

    let dish = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        rating: Set(validate_rating(payload.rating.unwrap_or(0.0))?),
        price: Set(validate_price(price)?),
        images: Set(images_json(&payload.images)?),
        restaurant_id: Set(restaurant.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "dish_create",
        "dishes",
        serde_json::json!({ "dish_id": dish.id, "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Dish added succesfully!!",
        with_restaurant((dish, Some(restaurant))),
        Some(Meta::empty()),
    ))
}

pub async fn update_dish(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDishRequest,
) -> AppResult<ApiResponse<Dish>> {
    authorize(user, Capability::ManageCatalog)?;
    let existing = Dishes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Dish not found."))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Enter dish name"));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::bad_request("Enter description of dish"));
        }
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(validate_price(price)?);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(validate_rating(rating)?);
    }
    if let Some(images) = payload.images {
        active.images = Set(images_json(&images)?);
    }

    let dish = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "dish_update",
        "dishes",
        serde_json::json!({ "dish_id": dish.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Dish Updated successfully!!",
        Dish::from(dish),
        Some(Meta::empty()),
    ))
}

pub async fn delete_dish(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Capability::ManageCatalog)?;
    let result = Dishes::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Dish not found"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "dish_delete",
        "dishes",
        serde_json::json!({ "dish_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Dish removed successfully!!",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
