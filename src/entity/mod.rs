pub mod dishes;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod user_addresses;
pub mod users;

pub use dishes::Entity as Dishes;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurants::Entity as Restaurants;
pub use user_addresses::Entity as UserAddresses;
pub use users::Entity as Users;
