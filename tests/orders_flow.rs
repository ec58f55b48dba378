use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;
use zing_bites_api::{
    config::AppConfig,
    db::{create_pool, migrate, orm_from_pool},
    dto::{
        auth::{GoogleProfile, LoginRequest, RegisterRequest},
        dishes::CreateDishRequest,
        orders::{CreateOrderRequest, LineItemRequest, UpdateOrderStatusRequest},
        restaurants::CreateRestaurantRequest,
        users::AddAddressRequest,
    },
    entity::{
        Orders,
        orders::Column as OrderCol,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderDetail, OrderStatus, Role},
    query::QueryParams,
    routes::params::OrderListQuery,
    services::{auth_service, dish_service, order_service, restaurant_service, user_service},
    state::AppState,
};

// Skips itself when no database is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    migrate(&pool).await?;
    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_expire_hours: 1,
        nearby_radius_meters: 5000.0,
    };
    Ok(Some(AppState::new(pool.clone(), orm_from_pool(pool), config)))
}

async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{} tester", role.as_str())),
        email: Set(format!("{}@flow.test", Uuid::new_v4())),
        password_hash: Set(None),
        avatar_public_id: Set(None),
        avatar_url: Set(None),
        google_id: Set(None),
        role: Set(role.as_str().to_string()),
        default_address: Set(None),
        default_longitude: Set(None),
        default_latitude: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

async fn order_count(state: &AppState, user: &AuthUser) -> anyhow::Result<u64> {
    Ok(Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?)
}

#[tokio::test]
async fn order_lifecycle_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin = create_user(&state, Role::Admin).await?;
    let customer = create_user(&state, Role::User).await?;
    let stranger = create_user(&state, Role::User).await?;

    // Catalog: one restaurant with two dishes priced 5 and 3.
    let restaurant = restaurant_service::create_restaurant(
        &state,
        &admin,
        CreateRestaurantRequest {
            name: format!("Flow Kitchen {}", Uuid::new_v4()),
            address: "1 Test Street, Testville".into(),
            latitude: Some(12.9716),
            longitude: Some(77.5946),
            rating: Some(4.0),
        },
    )
    .await?
    .data
    .expect("restaurant");

    let mut dish_ids = Vec::new();
    for (name, price) in [("Samosa", 5), ("Chai", 3)] {
        let dish = dish_service::create_dish(
            &state,
            &admin,
            restaurant.id,
            CreateDishRequest {
                name: Some(name.into()),
                description: Some(format!("{name} for the flow test")),
                price: Some(price),
                rating: None,
                images: Vec::new(),
            },
        )
        .await?
        .data
        .expect("dish");
        dish_ids.push(dish.dish.id);
    }

    let order_request = || CreateOrderRequest {
        restaurant: Some(restaurant.id),
        dishes: Some(vec![
            LineItemRequest {
                dish: dish_ids[0],
                quantity: 2,
            },
            LineItemRequest {
                dish: dish_ids[1],
                quantity: 1,
            },
        ]),
        payment_method: Some("Cash on Delivery".into()),
    };

    // No default address yet: rejected and nothing written.
    let result = order_service::create_order(&state, &customer, order_request()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(order_count(&state, &customer).await?, 0);

    // Add an address and make it the default.
    let profile = user_service::add_address(
        &state,
        &customer,
        AddAddressRequest {
            address: "42 Flow Avenue, Testville".into(),
            latitude: 12.9720,
            longitude: 77.5950,
        },
    )
    .await?
    .data
    .expect("profile");
    let address_id = profile.addresses[0].id;
    user_service::set_default_address(&state, &customer, address_id).await?;

    // Nearby search from the default address finds the restaurant.
    let nearby = restaurant_service::nearby_restaurants(&state, &customer)
        .await?
        .data
        .expect("nearby");
    assert!(nearby.items.iter().any(|r| r.restaurant.id == restaurant.id));

    // Place the order: totals come from catalog prices.
    let placed = order_service::create_order(&state, &customer, order_request())
        .await?
        .data
        .expect("order");
    assert_eq!(placed.order.total_price, 13);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.delivery_address.address, "42 Flow Avenue, Testville");
    assert_eq!(placed.dishes.len(), 2);
    let line_dishes = |detail: &OrderDetail| -> Vec<Uuid> {
        detail.dishes.iter().map(|line| line.dish_id).collect()
    };
    assert_eq!(line_dishes(&placed), dish_ids);

    // Lines come back in request order, not in insertion-time order.
    let reversed = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            dishes: Some(vec![
                LineItemRequest {
                    dish: dish_ids[1],
                    quantity: 3,
                },
                LineItemRequest {
                    dish: dish_ids[0],
                    quantity: 1,
                },
            ]),
            ..order_request()
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(reversed.order.total_price, 14);
    let reread = order_service::get_order(&state, &customer, reversed.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(line_dishes(&reread), vec![dish_ids[1], dish_ids[0]]);

    // The delivery address is a snapshot.
    user_service::remove_address(&state, &customer, address_id).await?;
    let reread = order_service::get_order(&state, &customer, placed.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(reread.order.delivery_address, placed.order.delivery_address);

    // Strangers can neither read nor cancel it.
    assert!(matches!(
        order_service::get_order(&state, &stranger, placed.order.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        order_service::cancel_order(&state, &stranger, placed.order.id).await,
        Err(AppError::Forbidden(_))
    ));

    // Only an admin moves the order along.
    let to_delivered = || UpdateOrderStatusRequest {
        status: "Delivered".into(),
    };
    assert!(matches!(
        order_service::update_order_status(&state, &customer, placed.order.id, to_delivered())
            .await,
        Err(AppError::Forbidden(_))
    ));
    order_service::update_order_status(&state, &admin, placed.order.id, to_delivered()).await?;
    let delivered = order_service::get_order(&state, &customer, placed.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(delivered.order.status, OrderStatus::Delivered);

    // Too late to cancel.
    assert!(matches!(
        order_service::cancel_order(&state, &customer, placed.order.id).await,
        Err(AppError::BadRequest(_))
    ));

    // A fresh order can be cancelled while pending.
    let second = order_service::create_order(&state, &customer, order_request())
        .await?
        .data
        .expect("order");
    let cancelled = order_service::cancel_order(&state, &customer, second.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

    // Listing filters by status.
    let listed = order_service::list_orders(
        &state,
        &customer,
        OrderListQuery {
            status: Some("Cancelled".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].order.id, second.order.id);

    // Deleting a dish leaves past orders readable.
    dish_service::delete_dish(&state, &admin, dish_ids[1]).await?;
    let after_delete = order_service::get_order(&state, &admin, placed.order.id)
        .await?
        .data
        .expect("order");
    assert!(after_delete
        .dishes
        .iter()
        .any(|line| line.dish_id == dish_ids[1] && line.dish.is_none()));

    // The catalog list sees the remaining dish through the query builder.
    let params: QueryParams = [("restaurant".to_string(), restaurant.id.to_string())]
        .into_iter()
        .collect();
    let dishes = dish_service::list_dishes(&state, params)
        .await?
        .data
        .expect("dishes");
    assert_eq!(dishes.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn register_login_and_google_linking() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let email = format!("{}@flow.test", Uuid::new_v4());
    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Flow Person".into(),
            email: email.clone(),
            password: "correct horse".into(),
            avatar_url: None,
        },
    )
    .await?
    .data
    .expect("auth");
    assert!(!registered.token.is_empty());

    let duplicate = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Flow Person".into(),
            email: email.clone(),
            password: "correct horse".into(),
            avatar_url: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let wrong = auth_service::login_user(
        &state,
        LoginRequest {
            email: email.clone(),
            password: "wrong horse".into(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    auth_service::login_user(
        &state,
        LoginRequest {
            email: email.clone(),
            password: "correct horse".into(),
        },
    )
    .await?;

    // Google sign-in with the same email links the existing account.
    let google_id = Uuid::new_v4().to_string();
    let linked = auth_service::sign_in_with_google(
        &state,
        GoogleProfile {
            google_id: google_id.clone(),
            name: "Flow Person".into(),
            email: email.clone(),
            photo_url: None,
        },
    )
    .await?
    .data
    .expect("auth");
    assert_eq!(linked.user.id, registered.user.id);
    assert_eq!(linked.user.google_id.as_deref(), Some(google_id.as_str()));

    // A new Google identity creates a password-less account.
    let fresh = auth_service::sign_in_with_google(
        &state,
        GoogleProfile {
            google_id: Uuid::new_v4().to_string(),
            name: String::new(),
            email: format!("{}@flow.test", Uuid::new_v4()),
            photo_url: Some("https://img.test/a.png".into()),
        },
    )
    .await?
    .data
    .expect("auth");
    assert_ne!(fresh.user.id, registered.user.id);
    assert_eq!(fresh.user.role, Role::User);

    Ok(())
}
