//! Key naming for the embedded store
//!
//! All keys live under the `bites:` prefix. Every key family used by the
//! service is built here so the layout stays in one place.

/// Joins key parts under the service prefix.
pub fn key_name(parts: &[&str]) -> String {
    format!("bites:{}", parts.join(":"))
}

/// Hash holding one restaurant's fields.
pub fn restaurant(id: &str) -> String {
    key_name(&["restaurants", id])
}

/// Prefix shared by all restaurant hashes, used by the search index.
pub fn restaurant_prefix() -> String {
    key_name(&["restaurants"])
}

/// Set of cuisine names served by one restaurant.
pub fn restaurant_cuisines(id: &str) -> String {
    key_name(&["restaurant_cuisines", id])
}

/// JSON document with one restaurant's links and contact info.
pub fn restaurant_details(id: &str) -> String {
    key_name(&["restaurant_details", id])
}

/// Sorted set ranking restaurant ids by average rating.
pub fn restaurants_by_rating() -> String {
    key_name(&["restaurants_by_rating"])
}

/// Set of every cuisine name ever registered.
pub fn cuisines() -> String {
    key_name(&["cuisines"])
}

/// Set of restaurant ids serving one cuisine.
pub fn cuisine(name: &str) -> String {
    key_name(&["cuisine", name])
}

/// List of review ids for one restaurant, newest first.
pub fn reviews(restaurant_id: &str) -> String {
    key_name(&["reviews", restaurant_id])
}

/// Hash holding one review's fields.
pub fn review_details(review_id: &str) -> String {
    key_name(&["review_details", review_id])
}

/// Cached weather blob for one restaurant.
pub fn weather(restaurant_id: &str) -> String {
    key_name(&["weather", restaurant_id])
}

/// Full-text index over restaurant hashes.
pub fn restaurant_index() -> String {
    key_name(&["idx", "restaurants"])
}

/// Bloom filter over "name:location" strings.
pub fn restaurant_bloom() -> String {
    key_name(&["bloom_restaurants"])
}
