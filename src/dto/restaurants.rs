use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{NearbyRestaurant, Restaurant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RestaurantList {
    #[schema(value_type = Vec<Restaurant>)]
    pub items: Vec<Restaurant>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct NearbyRestaurantList {
    #[schema(value_type = Vec<NearbyRestaurant>)]
    pub items: Vec<NearbyRestaurant>,
}
