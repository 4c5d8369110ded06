//! Request body types

use serde::{Deserialize, Serialize};

/// Body of POST /api/resturants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurant {
    pub name: String,
    pub location: String,
    pub cuisines: Vec<String>,
}

/// Body of POST /api/resturants/{id}/details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDetails {
    pub links: Vec<Link>,
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

/// Body of POST /api/resturants/{id}/reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub review: String,
    pub rating: f64,
}
