pub mod auth_service;
pub mod dish_service;
pub mod order_service;
pub mod restaurant_service;
pub mod user_service;
