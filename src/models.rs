use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{dishes, orders, restaurants, user_addresses, users},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// Actions that are gated on the caller's role rather than on ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageCatalog,
    ManageOrders,
    ManageUsers,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Admin, _) => true,
            (Role::User, Capability::ManageCatalog)
            | (Role::User, Capability::ManageOrders)
            | (Role::User, Capability::ManageUsers) => false,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::bad_request(format!("Unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    // Position on the delivery chain; Cancelled sits off the chain.
    fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Preparing => Some(1),
            OrderStatus::OutForDelivery => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    /// Whether an order currently in `self` may be moved to `next`.
    ///
    /// The delivery chain only moves forward (steps may be skipped), a
    /// cancellation is only possible from `Pending`, and terminal states are
    /// final. Re-applying the current status is accepted as a no-op.
    pub fn can_become(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => *self == OrderStatus::Pending,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::bad_request("Invalid status."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "UPI")]
    Upi,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CashOnDelivery,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Upi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| AppError::bad_request(format!("Invalid payment method: {s}")))
    }
}

/// A WGS84 point. Stored and serialized as longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, AppError> {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        if !valid {
            return Err(AppError::bad_request("Invalid coordinates format"));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Avatar {
    pub public_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub address: String,
    pub location: GeoPoint,
}

/// A copied address: the user's default and every order's delivery address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddressSnapshot {
    pub address: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Avatar,
    pub addresses: Vec<Address>,
    pub default_address: Option<AddressSnapshot>,
    pub google_id: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_entity(model: users::Model, addresses: Vec<user_addresses::Model>) -> Self {
        let default_address = default_address_of(&model);
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            avatar: Avatar {
                public_id: model.avatar_public_id,
                url: model.avatar_url,
            },
            addresses: addresses.into_iter().map(Address::from).collect(),
            default_address,
            google_id: model.google_id,
            role: model.role.parse().unwrap_or(Role::User),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Reads the default-address snapshot columns; all three must be present.
pub fn default_address_of(model: &users::Model) -> Option<AddressSnapshot> {
    match (
        model.default_address.as_ref(),
        model.default_longitude,
        model.default_latitude,
    ) {
        (Some(address), Some(longitude), Some(latitude)) if !address.is_empty() => {
            Some(AddressSnapshot {
                address: address.clone(),
                location: GeoPoint {
                    longitude,
                    latitude,
                },
            })
        }
        _ => None,
    }
}

impl From<user_addresses::Model> for Address {
    fn from(model: user_addresses::Model) -> Self {
        Self {
            id: model.id,
            address: model.address,
            location: GeoPoint {
                longitude: model.longitude,
                latitude: model.latitude,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub rating: f64,
    pub added_on: DateTime<Utc>,
}

impl From<restaurants::Model> for Restaurant {
    fn from(model: restaurants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            location: GeoPoint {
                longitude: model.longitude,
                latitude: model.latitude,
            },
            rating: model.rating,
            added_on: model.added_on.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    /// Metres from the caller's default address.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DishImage {
    pub public_id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub rating: f64,
    pub price: i64,
    pub images: Vec<DishImage>,
    pub restaurant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<dishes::Model> for Dish {
    fn from(model: dishes::Model) -> Self {
        // Rows are only ever written from Vec<DishImage>; anything else reads as empty.
        let images = serde_json::from_value(model.images).unwrap_or_default();
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            rating: model.rating,
            price: model.price,
            images,
            restaurant_id: model.restaurant_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishWithRestaurant {
    #[serde(flatten)]
    pub dish: Dish,
    /// `None` when the owning restaurant has been removed.
    pub restaurant: Option<Restaurant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub total_price: i64,
    pub delivery_address: AddressSnapshot,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<orders::Model> for Order {
    type Error = AppError;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "order {} has unknown status {}",
                model.id,
                model.status
            ))
        })?;
        let payment_method = model.payment_method.parse().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "order {} has unknown payment method {}",
                model.id,
                model.payment_method
            ))
        })?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            restaurant_id: model.restaurant_id,
            total_price: model.total_price,
            delivery_address: AddressSnapshot {
                address: model.delivery_address,
                location: GeoPoint {
                    longitude: model.delivery_longitude,
                    latitude: model.delivery_latitude,
                },
            },
            status,
            payment_method,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLineDetail {
    pub dish_id: Uuid,
    /// `None` when the dish has been removed from the catalog since.
    pub dish: Option<Dish>,
    pub quantity: i32,
}

/// An order with its restaurant and dishes resolved from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub restaurant: Option<Restaurant>,
    pub dishes: Vec<OrderLineDetail>,
}
