pub mod auth;
pub mod dishes;
pub mod orders;
pub mod restaurants;
pub mod users;
