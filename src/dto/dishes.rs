use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DishImage, DishWithRestaurant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDishRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub images: Vec<DishImage>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDishRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub rating: Option<f64>,
    pub images: Option<Vec<DishImage>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DishList {
    #[schema(value_type = Vec<DishWithRestaurant>)]
    pub items: Vec<DishWithRestaurant>,
}
