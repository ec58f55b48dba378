use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;
use zing_bites_api::{
    dto::orders::LineItemRequest,
    entity::orders,
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentMethod, Role},
    services::order_service::{
        check_cancellation, check_status_change, stored_status, total_price,
        validate_line_items,
    },
};

fn line(dish: Uuid, quantity: i32) -> LineItemRequest {
    LineItemRequest { dish, quantity }
}

fn caller(role: Role) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role,
    }
}

#[test]
fn total_uses_catalog_prices() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let prices = HashMap::from([(a, 5), (b, 3)]);

    let total = total_price(&[line(a, 2), line(b, 1)], &prices).unwrap();
    assert_eq!(total, 13);
}

#[test]
fn client_price_fields_are_not_part_of_a_line() {
    let dish = Uuid::new_v4();
    let body = serde_json::json!({ "dish": dish, "quantity": 2, "price": 1 });
    let item: LineItemRequest = serde_json::from_value(body).unwrap();

    let total = total_price(&[item], &HashMap::from([(dish, 40)])).unwrap();
    assert_eq!(total, 80);
}

#[test]
fn first_unknown_dish_is_reported() {
    let known = Uuid::new_v4();
    let missing = Uuid::new_v4();
    let prices = HashMap::from([(known, 10)]);

    match total_price(&[line(known, 1), line(missing, 1)], &prices) {
        Err(AppError::NotFound(message)) => {
            assert_eq!(message, format!("Dish with ID {missing} not found."))
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn total_overflow_is_a_bad_request() {
    let dish = Uuid::new_v4();
    let prices = HashMap::from([(dish, i64::MAX)]);
    assert!(matches!(
        total_price(&[line(dish, 2)], &prices),
        Err(AppError::BadRequest(_))
    ));
}

#[test]
fn empty_orders_and_non_positive_quantities_are_rejected() {
    assert!(matches!(
        validate_line_items(&[]),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        validate_line_items(&[line(Uuid::new_v4(), 0)]),
        Err(AppError::BadRequest(_))
    ));
    assert!(validate_line_items(&[line(Uuid::new_v4(), 1)]).is_ok());
}

#[test]
fn only_the_owner_cancels_a_pending_order() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    assert!(matches!(
        check_cancellation(owner, OrderStatus::Preparing, owner),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        check_cancellation(owner, OrderStatus::Pending, stranger),
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(
        check_cancellation(owner, OrderStatus::Pending, owner).unwrap(),
        OrderStatus::Cancelled
    );
}

#[test]
fn only_admins_change_status() {
    let result = check_status_change(OrderStatus::Pending, "Delivered", &caller(Role::User));
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = check_status_change(OrderStatus::Pending, "Delivered", &caller(Role::Admin));
    assert_eq!(result.unwrap(), OrderStatus::Delivered);
}

#[test]
fn unknown_status_values_are_rejected() {
    let admin = caller(Role::Admin);
    for raw in ["Shipped", "pending", ""] {
        match check_status_change(OrderStatus::Pending, raw, &admin) {
            Err(AppError::BadRequest(message)) => assert_eq!(message, "Invalid status."),
            other => panic!("{raw:?}: expected BadRequest, got {other:?}"),
        }
    }
}

#[test]
fn status_chain_moves_forward_only() {
    use OrderStatus::*;

    assert!(Pending.can_become(Preparing));
    assert!(Pending.can_become(OutForDelivery));
    assert!(Preparing.can_become(Delivered));
    assert!(Pending.can_become(Cancelled));
    assert!(Preparing.can_become(Preparing));

    assert!(!Preparing.can_become(Pending));
    assert!(!OutForDelivery.can_become(Preparing));
    assert!(!Preparing.can_become(Cancelled));
    assert!(!Delivered.can_become(Pending));
    assert!(!Cancelled.can_become(Preparing));
}

#[test]
fn backwards_move_is_a_bad_request_for_admins() {
    let admin = caller(Role::Admin);
    assert!(matches!(
        check_status_change(OrderStatus::Delivered, "Preparing", &admin),
        Err(AppError::BadRequest(_))
    ));
}

#[test]
fn wire_names_match_stored_names() {
    for status in OrderStatus::ALL {
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json, serde_json::Value::from(status.as_str()));
        assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
    for method in PaymentMethod::ALL {
        let json = serde_json::to_value(method).unwrap();
        assert_eq!(json, serde_json::Value::from(method.as_str()));
    }
    assert!("Cash".parse::<PaymentMethod>().is_err());
}

fn stored_order(status: &str) -> orders::Model {
    let now = Utc::now().into();
    orders::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        restaurant_id: Uuid::new_v4(),
        total_price: 13,
        delivery_address: "42 Flow Avenue, Testville".into(),
        delivery_longitude: 77.595,
        delivery_latitude: 12.972,
        status: status.into(),
        payment_method: "UPI".into(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn stored_status_reads_known_values() {
    assert_eq!(
        stored_status(&stored_order("Out for Delivery")).unwrap(),
        OrderStatus::OutForDelivery
    );
}

#[test]
fn corrupt_stored_status_is_an_internal_error() {
    let result = stored_status(&stored_order("Shipped"));
    assert!(
        matches!(result, Err(AppError::Internal(_))),
        "got {result:?}"
    );
}
