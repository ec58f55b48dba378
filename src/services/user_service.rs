use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{AddAddressRequest, UserList},
    entity::{
        user_addresses::{
            ActiveModel as AddressActive, Column as AddressCol, Entity as UserAddresses,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, authorize},
    models::{Capability, GeoPoint, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

const MIN_ADDRESS_LEN: usize = 8;

/// Loads a user together with its address book.
pub async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let addresses = UserAddresses::find()
        .filter(AddressCol::UserId.eq(user_id))
        .order_by_asc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?;

    Ok(User::from_entity(user, addresses))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = load_user(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", user, Some(Meta::empty())))
}

pub fn validate_address(address: &str) -> AppResult<String> {
    let address = address.trim();
    if address.chars().count() < MIN_ADDRESS_LEN {
        return Err(AppError::bad_request(
            "Address should contain at least 8 characters",
        ));
    }
    Ok(address.to_string())
}

pub async fn add_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddAddressRequest,
) -> AppResult<ApiResponse<User>> {
    let address = validate_address(&payload.address)?;
    let location = GeoPoint::new(payload.longitude, payload.latitude)?;

    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::not_found("User not found!"));
    }

    let saved = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        address: Set(address),
        longitude: Set(location.longitude),
        latitude: Set(location.latitude),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_add",
        "user_addresses",
        serde_json::json!({ "address_id": saved.id }),
    )
    .await;

    let user = load_user(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "Address updated successfully!",
        user,
        Some(Meta::empty()),
    ))
}

/// Removes one of the caller's addresses. The default-address snapshot is kept.
pub async fn remove_address(
    state: &AppState,
    user: &AuthUser,
    address_id: Uuid,
) -> AppResult<ApiResponse<User>> {
    let result = UserAddresses::delete_many()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(address_id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Address not found"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_remove",
        "user_addresses",
        serde_json::json!({ "address_id": address_id }),
    )
    .await;

    let user = load_user(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "Address removed successfully!",
        user,
        Some(Meta::empty()),
    ))
}

/// Copies one of the caller's addresses into the default-address snapshot.
pub async fn set_default_address(
    state: &AppState,
    user: &AuthUser,
    address_id: Uuid,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found!"))?;

    let address = UserAddresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(address_id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Address not found"))?;

    let mut active: UserActive = existing.into();
    active.default_address = Set(Some(address.address));
    active.default_longitude = Set(Some(address.longitude));
    active.default_latitude = Set(Some(address.latitude));
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_set_default",
        "users",
        serde_json::json!({ "address_id": address_id }),
    )
    .await;

    let user = load_user(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "Default address set successfully!",
        user,
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Capability::ManageUsers)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let mut addresses: HashMap<Uuid, Vec<_>> = HashMap::new();
    if !ids.is_empty() {
        for address in UserAddresses::find()
            .filter(AddressCol::UserId.is_in(ids))
            .order_by_asc(AddressCol::CreatedAt)
            .all(&state.orm)
            .await?
        {
            addresses.entry(address.user_id).or_default().push(address);
        }
    }

    let items = users
        .into_iter()
        .map(|u| {
            let own = addresses.remove(&u.id).unwrap_or_default();
            User::from_entity(u, own)
        })
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn remove_user(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Capability::ManageUsers)?;
    let result = Users::delete_by_id(user_id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("User not found"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_remove",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User removed successfully!",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
