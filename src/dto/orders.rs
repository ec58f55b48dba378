use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::OrderDetail;

/// One requested line. Any price sent by the client is ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LineItemRequest {
    pub dish: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub restaurant: Option<Uuid>,
    pub dishes: Option<Vec<LineItemRequest>>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderDetail>)]
    pub items: Vec<OrderDetail>,
}
