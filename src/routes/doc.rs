use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        dishes::{CreateDishRequest, DishList, UpdateDishRequest},
        orders::{CreateOrderRequest, LineItemRequest, OrderList, UpdateOrderStatusRequest},
        restaurants::{
            CreateRestaurantRequest, NearbyRestaurantList, RestaurantList, UpdateRestaurantRequest,
        },
        users::{AddAddressRequest, UserList},
    },
    error::ErrorBody,
    models::{
        Address, AddressSnapshot, Avatar, Dish, DishImage, DishWithRestaurant, GeoPoint,
        NearbyRestaurant, Order, OrderDetail, OrderLineDetail, OrderStatus, PaymentMethod,
        Restaurant, Role, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, dishes, health, orders, params, restaurants, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::profile,
        users::add_address,
        users::remove_address,
        users::set_default_address,
        admin::list_users,
        admin::remove_user,
        restaurants::list_restaurants,
        restaurants::nearby_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        restaurants::list_restaurant_dishes,
        restaurants::create_dish,
        dishes::list_dishes,
        dishes::get_dish,
        dishes::update_dish,
        dishes::delete_dish,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::cancel_order
    ),
    components(
        schemas(
            ErrorBody,
            Meta,
            Role,
            GeoPoint,
            Avatar,
            Address,
            AddressSnapshot,
            User,
            Restaurant,
            NearbyRestaurant,
            DishImage,
            Dish,
            DishWithRestaurant,
            OrderStatus,
            PaymentMethod,
            Order,
            OrderLineDetail,
            OrderDetail,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            AddAddressRequest,
            UserList,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            RestaurantList,
            NearbyRestaurantList,
            CreateDishRequest,
            UpdateDishRequest,
            DishList,
            LineItemRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            params::Pagination,
            params::OrderListQuery,
            params::SortOrder,
            health::HealthData,
            ApiResponse<User>,
            ApiResponse<AuthResponse>,
            ApiResponse<Restaurant>,
            ApiResponse<RestaurantList>,
            ApiResponse<DishList>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profile and address book"),
        (name = "Admin", description = "User management (admin only)"),
        (name = "Restaurants", description = "Restaurant catalog"),
        (name = "Dishes", description = "Dish catalog"),
        (name = "Orders", description = "Order lifecycle"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
