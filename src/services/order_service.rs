use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, LineItemRequest, OrderList, UpdateOrderStatusRequest},
    entity::{
        dishes::{Column as DishCol, Entity as Dishes},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        restaurants::{Column as RestaurantCol, Entity as Restaurants},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, authorize},
    models::{
        Capability, Dish, Order, OrderDetail, OrderLineDetail, OrderStatus, PaymentMethod,
        Restaurant, default_address_of,
    },
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Rejects empty orders and non-positive quantities.
pub fn validate_line_items(items: &[LineItemRequest]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::bad_request("All fields are required."));
    }
    if let Some(item) = items.iter().find(|item| item.quantity < 1) {
        return Err(AppError::bad_request(format!(
            "Quantity must be at least 1 (dish {})",
            item.dish
        )));
    }
    Ok(())
}

/// Σ price × quantity over the catalog prices in `prices`.
///
/// Line items are priced in request order; the first dish missing from the
/// catalog aborts the computation.
pub fn total_price(items: &[LineItemRequest], prices: &HashMap<Uuid, i64>) -> AppResult<i64> {
    let overflow = || AppError::bad_request("Order total is too large");
    items.iter().try_fold(0_i64, |total, item| {
        let price = prices
            .get(&item.dish)
            .ok_or_else(|| AppError::not_found(format!("Dish with ID {} not found.", item.dish)))?;
        let line = price
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(overflow)?;
        total.checked_add(line).ok_or_else(overflow)
    })
}

/// Decides whether `caller` may move an order from `current` to `requested`.
pub fn check_status_change(
    current: OrderStatus,
    requested: &str,
    caller: &AuthUser,
) -> AppResult<OrderStatus> {
    authorize(caller, Capability::ManageOrders)?;
    let next: OrderStatus = requested.parse()?;
    if !current.can_become(next) {
        return Err(AppError::bad_request(format!(
            "Cannot change order status from {current} to {next}."
        )));
    }
    Ok(next)
}

/// Status read back from the store. A value outside the enum is a corrupt
/// row, not a client mistake.
pub fn stored_status(order: &OrderModel) -> AppResult<OrderStatus> {
    order.status.parse().map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "order {} has unknown status {}",
            order.id,
            order.status
        ))
    })
}

/// Only the owner may cancel, and only while the order is still pending.
pub fn check_cancellation(owner: Uuid, status: OrderStatus, caller: Uuid) -> AppResult<OrderStatus> {
    if owner != caller {
        return Err(AppError::forbidden("You cannot cancel someone else's order."));
    }
    if status != OrderStatus::Pending {
        return Err(AppError::bad_request("Only pending orders can be cancelled."));
    }
    Ok(OrderStatus::Cancelled)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let (Some(restaurant_id), Some(items), Some(payment_method)) =
        (payload.restaurant, payload.dishes, payload.payment_method)
    else {
        return Err(AppError::bad_request("All fields are required."));
    };
    let payment_method: PaymentMethod = payment_method.parse()?;
    validate_line_items(&items)?;

    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let delivery_address = default_address_of(&account)
        .ok_or_else(|| AppError::not_found("Delivery address not found for the user."))?;

    if Restaurants::find_by_id(restaurant_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Restaurant not found."));
    }

    let dish_ids: Vec<Uuid> = items
        .iter()
        .map(|item| item.dish)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let prices: HashMap<Uuid, i64> = Dishes::find()
        .filter(DishCol::Id.is_in(dish_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|dish| (dish.id, dish.price))
        .collect();
    let total = total_price(&items, &prices)?;

    // The order row and its lines land together or not at all.
    let txn = state.orm.begin().await?;
    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        restaurant_id: Set(restaurant_id),
        total_price: Set(total),
        delivery_address: Set(delivery_address.address.clone()),
        delivery_longitude: Set(delivery_address.location.longitude),
        delivery_latitude: Set(delivery_address.location.latitude),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_method: Set(payment_method.as_str().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let lines = items.iter().zip(0_i32..).map(|(item, position)| OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        dish_id: Set(item.dish),
        quantity: Set(item.quantity),
        position: Set(position),
        created_at: NotSet,
    });
    OrderItems::insert_many(lines)
    .exec(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, total, "order placed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": total }),
    )
    .await;

    let detail = resolve_one(state, order).await?;
    Ok(ApiResponse::success(
        "Order placed successfully!",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = resolve_orders(state, orders).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_order(state, id).await?;
    if order.user_id != user.user_id {
        authorize(user, Capability::ManageOrders)?;
    }
    let detail = resolve_one(state, order).await?;
    Ok(ApiResponse::success("OK", detail, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    authorize(user, Capability::ManageOrders)?;
    let existing = find_order(state, id).await?;
    let current = stored_status(&existing)?;
    let next = check_status_change(current, payload.status.trim(), user)?;

    let order = transition(state, existing, current, next).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": current.as_str(), "to": next.as_str() }),
    )
    .await;

    let detail = resolve_one(state, order).await?;
    Ok(ApiResponse::success(
        "Order status updated.",
        detail,
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let existing = find_order(state, id).await?;
    let current = stored_status(&existing)?;
    let next = check_cancellation(existing.user_id, current, user.user_id)?;

    let order = transition(state, existing, current, next).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    let detail = resolve_one(state, order).await?;
    Ok(ApiResponse::success(
        "Order cancelled successfully.",
        detail,
        Some(Meta::empty()),
    ))
}

async fn find_order(state: &AppState, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found."))
}

/// Writes `next` only if the row still holds `current`, so two racing
/// updates cannot both pass their checks against the same old status.
async fn transition(
    state: &AppState,
    existing: OrderModel,
    current: OrderStatus,
    next: OrderStatus,
) -> AppResult<OrderModel> {
    if current == next {
        return Ok(existing);
    }

    let result = Orders::update_many()
        .set(OrderActive {
            status: Set(next.as_str().to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(existing.id))
                .add(OrderCol::Status.eq(current.as_str())),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::bad_request(
            "Order status changed in the meantime, try again.",
        ));
    }

    find_order(state, existing.id).await
}

async fn resolve_one(state: &AppState, order: OrderModel) -> AppResult<OrderDetail> {
    resolve_orders(state, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order resolution returned nothing")))
}

/// Replaces restaurant and dish ids with their catalog entries.
///
/// References to removed catalog entries resolve to `None`.
async fn resolve_orders(state: &AppState, orders: Vec<OrderModel>) -> AppResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut lines: HashMap<Uuid, Vec<_>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::OrderId)
        .order_by_asc(OrderItemCol::Position)
        .all(&state.orm)
        .await?
    {
        lines.entry(item.order_id).or_default().push(item);
    }

    let restaurant_ids: HashSet<Uuid> = orders.iter().map(|o| o.restaurant_id).collect();
    let restaurants: HashMap<Uuid, Restaurant> = Restaurants::find()
        .filter(RestaurantCol::Id.is_in(restaurant_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| (r.id, Restaurant::from(r)))
        .collect();

    let dish_ids: HashSet<Uuid> = lines.values().flatten().map(|item| item.dish_id).collect();
    let dishes: HashMap<Uuid, Dish> = if dish_ids.is_empty() {
        HashMap::new()
    } else {
        Dishes::find()
            .filter(DishCol::Id.is_in(dish_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|d| (d.id, Dish::from(d)))
            .collect()
    };

    orders
        .into_iter()
        .map(|model| {
            let restaurant = restaurants.get(&model.restaurant_id).cloned();
            let resolved = lines
                .remove(&model.id)
                .unwrap_or_default()
                .into_iter()
                .map(|item| OrderLineDetail {
                    dish_id: item.dish_id,
                    dish: dishes.get(&item.dish_id).cloned(),
                    quantity: item.quantity,
                })
                .collect();
            Ok(OrderDetail {
                order: Order::try_from(model)?,
                restaurant,
                dishes: resolved,
            })
        })
        .collect()
}
